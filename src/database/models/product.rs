use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::document::{
    parse_document, ColumnContext, CustomizableData, DesignDocument, DocumentColumn, RawColumn,
    TabSettings,
};

pub const DEFAULT_PRODUCT_TYPE: &str = "2d";
pub const PRODUCT_TYPES: &[&str] = &["2d", "3d"];

/// A row of the `products` table. Document columns stay as raw text; use the
/// accessor methods to get normalized values.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub product_sku: String,
    pub store_hash: Option<String>,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub customizer_image: Option<String>,
    pub model_file: Option<String>,
    pub design_name: Option<String>,
    pub product_type: Option<String>,
    pub visible: bool,
    pub tab_settings: Option<String>,
    pub customizable_data: Option<String>,
    pub layer_design: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    pub fn product_type(&self) -> &str {
        self.product_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_PRODUCT_TYPE)
    }

    pub fn tab_settings(&self) -> TabSettings {
        parse_document(
            self.tab_settings.as_ref().map(RawColumn::from),
            TabSettings::default(),
            ColumnContext::new(self.id, DocumentColumn::TabSettings),
        )
    }

    pub fn layer_design(&self) -> DesignDocument {
        parse_document(
            self.layer_design.as_ref().map(RawColumn::from),
            DesignDocument::new(),
            ColumnContext::new(self.id, DocumentColumn::LayerDesign),
        )
    }

    pub fn customizable_data(&self) -> CustomizableData {
        parse_document(
            self.customizable_data.as_ref().map(RawColumn::from),
            Vec::new(),
            ColumnContext::new(self.id, DocumentColumn::CustomizableData),
        )
    }

    /// Raw text of a document column
    pub fn column(&self, column: DocumentColumn) -> Option<&str> {
        match column {
            DocumentColumn::LayerDesign => self.layer_design.as_deref(),
            DocumentColumn::TabSettings => self.tab_settings.as_deref(),
            DocumentColumn::CustomizableData => self.customizable_data.as_deref(),
        }
    }
}

/// Fields for inserting a product. Document columns start out normalized.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub product_sku: String,
    pub store_hash: Option<String>,
    pub product_name: Option<String>,
    pub product_image: Option<String>,
    pub product_type: Option<String>,
    pub visible: bool,
}

/// Partial update of product settings; `None` leaves a column unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub tab_settings: Option<TabSettings>,
    pub product_type: Option<String>,
    pub visible: Option<bool>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.tab_settings.is_none() && self.product_type.is_none() && self.visible.is_none()
    }
}

/// Document column value with the row version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSnapshot {
    pub raw: Option<String>,
    pub version: i64,
}

/// Product columns that hold a media URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaColumn {
    CustomizerImage,
    ModelFile,
}

impl MediaColumn {
    pub fn column_name(self) -> &'static str {
        match self {
            MediaColumn::CustomizerImage => "customizer_image",
            MediaColumn::ModelFile => "model_file",
        }
    }
}

/// How the developer API addresses a product
#[derive(Debug, Clone, Copy)]
pub enum ProductKey<'a> {
    Id(i64),
    Sku(&'a str),
}
