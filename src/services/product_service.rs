use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::database::models::product::PRODUCT_TYPES;
use crate::database::models::{MediaColumn, NewProduct, ProductKey, ProductRow, SettingsUpdate};
use crate::database::{DatabaseError, ProductStore};
use crate::document::{try_parse_document, ParseOutcome, RawColumn, TabSettings};

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("Product is not visible")]
    NotVisible,

    #[error("No valid fields to update")]
    NoFieldsToUpdate,

    #[error("Invalid tabSettings: {0}")]
    InvalidTabSettings(String),

    #[error("Invalid productType '{0}', expected one of: 2d, 3d")]
    InvalidProductType(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Settings change as received from a client, before validation
#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    /// Either a JSON object or a string holding one
    pub tab_settings: Option<Value>,
    pub product_type: Option<String>,
    pub visible: Option<bool>,
}

/// Product reads, creation and settings updates
#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<ProductRow>, ProductError> {
        Ok(self.store.list_products().await?)
    }

    pub async fn get(&self, id: i64) -> Result<ProductRow, ProductError> {
        self.store.find_by_id(id).await?.ok_or(ProductError::NotFound)
    }

    pub async fn get_by_sku(&self, sku: &str) -> Result<ProductRow, ProductError> {
        self.store.find_by_sku(sku).await?.ok_or(ProductError::NotFound)
    }

    pub async fn create(&self, product: NewProduct) -> Result<ProductRow, ProductError> {
        let sku = product.product_sku.trim().to_string();
        if sku.is_empty() {
            return Err(ProductError::MissingField("sq"));
        }
        if let Some(product_type) = &product.product_type {
            validate_product_type(product_type)?;
        }

        let product = NewProduct {
            product_sku: sku,
            ..product
        };
        let row = self.store.insert_product(&product).await?;
        info!(product_id = row.id, sku = %row.product_sku, "Created product");
        Ok(row)
    }

    /// Apply a settings patch and return the updated product
    pub async fn update_settings(
        &self,
        id: i64,
        patch: SettingsPatch,
    ) -> Result<ProductRow, ProductError> {
        let update = SettingsUpdate {
            tab_settings: patch.tab_settings.as_ref().map(parse_tab_settings).transpose()?,
            product_type: patch
                .product_type
                .map(|t| validate_product_type(&t).map(|_| t))
                .transpose()?,
            visible: patch.visible,
        };
        if update.is_empty() {
            return Err(ProductError::NoFieldsToUpdate);
        }

        if self.store.update_settings(id, &update).await? == 0 {
            return Err(ProductError::NotFound);
        }
        info!(product_id = id, "Updated product settings");
        self.get(id).await
    }

    /// Point or unpoint a product at an uploaded asset. A blank URL clears
    /// the column; the stored value is returned.
    pub async fn set_media_url(
        &self,
        id: i64,
        column: MediaColumn,
        url: Option<&str>,
    ) -> Result<Option<String>, ProductError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        if self.store.set_media_url(id, column, url).await? == 0 {
            return Err(ProductError::NotFound);
        }
        info!(
            product_id = id,
            column = column.column_name(),
            cleared = url.is_none(),
            "Updated media URL"
        );
        Ok(url.map(str::to_string))
    }

    /// Move products from one SKU to another; the output is the row count
    pub async fn rename_sku(
        &self,
        old_sku: &str,
        new_sku: &str,
        store_hash: Option<&str>,
    ) -> Result<u64, ProductError> {
        let (old_sku, new_sku) = (old_sku.trim(), new_sku.trim());
        if old_sku.is_empty() {
            return Err(ProductError::MissingField("oldSq"));
        }
        if new_sku.is_empty() {
            return Err(ProductError::MissingField("newSq"));
        }

        let modified = self.store.rename_sku(old_sku, new_sku, store_hash).await?;
        info!(old_sku, new_sku, modified, "Renamed SKU");
        Ok(modified)
    }

    /// A visible product for the public developer API
    pub async fn find_visible(
        &self,
        key: ProductKey<'_>,
        store_hash: &str,
    ) -> Result<ProductRow, ProductError> {
        let product = self
            .store
            .find_for_store(key, store_hash)
            .await?
            .ok_or(ProductError::NotFound)?;
        if !product.visible {
            return Err(ProductError::NotVisible);
        }
        Ok(product)
    }
}

fn validate_product_type(product_type: &str) -> Result<(), ProductError> {
    if PRODUCT_TYPES.contains(&product_type) {
        Ok(())
    } else {
        Err(ProductError::InvalidProductType(product_type.to_string()))
    }
}

/// Tab settings from a request must be a map; unlike stored columns a bad
/// value is rejected instead of defaulted.
fn parse_tab_settings(raw: &Value) -> Result<TabSettings, ProductError> {
    match try_parse_document::<TabSettings>(Some(RawColumn::from(raw))) {
        ParseOutcome::Parsed(settings) => Ok(settings),
        ParseOutcome::Fallback(reason) => Err(ProductError::InvalidTabSettings(reason.to_string())),
    }
}
