pub mod error;
pub mod mutator;
pub mod parser;
pub mod types;

pub use error::DocumentError;
pub use parser::{
    parse_document, try_parse_document, ColumnContext, ColumnDocument, FallbackReason,
    ParseOutcome, RawColumn, Shape,
};
pub use types::{CustomizableData, DesignDocument, DesignEntry, LineItem, TabSettings, DEFAULT_DESIGN};

use std::fmt;

/// Product columns that hold JSON documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentColumn {
    LayerDesign,
    TabSettings,
    CustomizableData,
}

impl DocumentColumn {
    /// Physical column name in the `products` table
    pub fn column_name(&self) -> &'static str {
        match self {
            DocumentColumn::LayerDesign => "layer_design",
            DocumentColumn::TabSettings => "tab_settings",
            DocumentColumn::CustomizableData => "customizable_data",
        }
    }
}

impl fmt::Display for DocumentColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
