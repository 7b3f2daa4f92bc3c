use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Errors from design document mutations and their persistence cycle.
///
/// Parse failures are not represented here: the tolerant parser absorbs them.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Design name is required")]
    InvalidDesignName,

    #[error("Design with this name already exists: {0}")]
    DuplicateDesign(String),

    #[error("Invalid rename: {0}")]
    InvalidRename(String),

    #[error("Design not found: {0}")]
    DesignNotFound(String),

    #[error("Design '{0}' does not hold a list of line items")]
    NotItemList(String),

    #[error("Invalid edit index {index} for design '{design}' ({len} items)")]
    InvalidIndex { design: String, index: i64, len: usize },

    #[error("Item not found for deletion: index {index} in design '{design}'")]
    ItemNotFound { design: String, index: i64 },

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product {product_id} was modified concurrently; gave up after {attempts} attempts")]
    WriteConflict { product_id: i64, attempts: u32 },

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
