//! Wire views of product rows. Document columns are parsed leniently here so
//! every response carries normalized JSON, never the stored text.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::ProductRow;
use crate::document::{CustomizableData, DesignDocument, TabSettings};

/// Entry of the product list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub sq: String,
    pub store_hash: Option<String>,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub customizer_image: Option<String>,
    pub model_file: Option<String>,
    pub product_type: String,
    pub tab_settings: TabSettings,
    pub customizable_data: CustomizableData,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ProductRow> for ProductSummary {
    fn from(row: &ProductRow) -> Self {
        Self {
            id: row.id,
            sq: row.product_sku.clone(),
            store_hash: row.store_hash.clone(),
            product_name: row.product_name.clone(),
            product_image: row.product_image.clone(),
            customizer_image: row.customizer_image.clone(),
            model_file: row.model_file.clone(),
            product_type: row.product_type().to_string(),
            tab_settings: row.tab_settings(),
            customizable_data: row.customizable_data(),
            visible: row.visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A single product with its design document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub id: i64,
    pub sq: String,
    pub store_hash: Option<String>,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub customizer_image: Option<String>,
    pub model_file: Option<String>,
    pub product_type: String,
    pub tab_settings: TabSettings,
    pub layer_design: DesignDocument,
    pub visible: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ProductRow> for ProductDetail {
    fn from(row: &ProductRow) -> Self {
        Self {
            id: row.id,
            sq: row.product_sku.clone(),
            store_hash: row.store_hash.clone(),
            product_name: row.product_name.clone(),
            product_image: row.product_image.clone(),
            customizer_image: row.customizer_image.clone(),
            model_file: row.model_file.clone(),
            product_type: row.product_type().to_string(),
            tab_settings: row.tab_settings(),
            layer_design: row.layer_design(),
            visible: row.visible,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// What storefront integrations see through the developer API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeveloperProduct {
    pub product_type: String,
    pub tab_settings: TabSettings,
    pub customizable_data: CustomizableData,
    pub customizer_image: Option<String>,
    pub model_file: Option<String>,
    pub design_name: Option<String>,
    pub layer_design: DesignDocument,
}

impl From<&ProductRow> for DeveloperProduct {
    fn from(row: &ProductRow) -> Self {
        Self {
            product_type: row.product_type().to_string(),
            tab_settings: row.tab_settings(),
            customizable_data: row.customizable_data(),
            customizer_image: row.customizer_image.clone(),
            model_file: row.model_file.clone(),
            design_name: row.design_name.clone(),
            layer_design: row.layer_design(),
        }
    }
}
