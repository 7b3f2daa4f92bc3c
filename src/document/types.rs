use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Design key used when a caller does not name one
pub const DEFAULT_DESIGN: &str = "default";

/// One customizable unit within a design.
///
/// Stored items were written by several client versions, so every field reads
/// leniently: `null` or missing becomes the default, numeric strings are
/// accepted for `price`, and unknown keys ride along in `extra` so a
/// read-modify-write cycle does not drop them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub short_description: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub files: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LineItem {
    pub fn new(
        title: impl Into<String>,
        short_description: impl Into<String>,
        price: f64,
        files: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            short_description: short_description.into(),
            price,
            files,
            extra: Map::new(),
        }
    }
}

/// One value in a `layerDesign` document.
///
/// Older editors stored canvas state and other shapes under design keys.
/// Anything that is not an array of item objects is kept verbatim so a
/// mutation of a sibling design writes it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DesignEntry {
    Items(Vec<LineItem>),
    Opaque(Value),
}

impl DesignEntry {
    pub fn items(&self) -> Option<&[LineItem]> {
        match self {
            DesignEntry::Items(items) => Some(items),
            DesignEntry::Opaque(_) => None,
        }
    }
}

/// Per-product `layerDesign` document: design name to ordered line items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignDocument {
    pub(crate) designs: BTreeMap<String, DesignEntry>,
}

impl DesignDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of a design; `None` when missing or not an item list
    pub fn get(&self, name: &str) -> Option<&[LineItem]> {
        self.designs.get(name).and_then(DesignEntry::items)
    }

    pub fn entry(&self, name: &str) -> Option<&DesignEntry> {
        self.designs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.designs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.designs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.designs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }
}

impl From<BTreeMap<String, Vec<LineItem>>> for DesignDocument {
    fn from(designs: BTreeMap<String, Vec<LineItem>>) -> Self {
        Self {
            designs: designs
                .into_iter()
                .map(|(name, items)| (name, DesignEntry::Items(items)))
                .collect(),
        }
    }
}

/// Editor tab feature flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabSettings(pub BTreeMap<String, bool>);

impl TabSettings {
    pub fn is_enabled(&self, flag: &str) -> bool {
        self.0.get(flag).copied().unwrap_or(false)
    }
}

impl Default for TabSettings {
    fn default() -> Self {
        let flags = ["aiEditor", "imageEdit", "textEdit", "colors", "clipart"];
        Self(flags.iter().map(|f| (f.to_string(), true)).collect())
    }
}

/// Legacy flat line-item column
pub type CustomizableData = Vec<LineItem>;

pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        })
    }

    pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        })
    }

    pub fn strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Value::String(s) => vec![s],
            _ => Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn line_item_reads_nulls_and_string_prices() {
        let item: LineItem = serde_json::from_value(json!({
            "title": null,
            "shortDescription": "front print",
            "price": "12.50",
        }))
        .unwrap();

        assert_eq!(item.title, "");
        assert_eq!(item.short_description, "front print");
        assert_eq!(item.price, 12.5);
        assert!(item.files.is_empty());
    }

    #[test]
    fn line_item_keeps_unknown_fields() {
        let raw = json!({"title": "T", "price": 1, "files": [], "layerId": 7});
        let item: LineItem = serde_json::from_value(raw).unwrap();
        assert_eq!(item.extra.get("layerId"), Some(&json!(7)));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["layerId"], json!(7));
        assert_eq!(back["shortDescription"], json!(""));
    }

    #[test]
    fn design_entries_that_are_not_item_lists_are_kept_verbatim() {
        let raw = json!({
            "Keep": [{"title": "a"}],
            "Legacy": {"canvas": 1},
            "Tags": ["x"],
            "Holes": [null],
        });
        let doc: DesignDocument = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(doc.get("Keep").map(<[LineItem]>::len), Some(1));
        assert_eq!(doc.entry("Legacy"), Some(&DesignEntry::Opaque(json!({"canvas": 1}))));
        assert_eq!(doc.entry("Tags"), Some(&DesignEntry::Opaque(json!(["x"]))));
        assert!(doc.get("Holes").is_none());
        assert_eq!(doc.len(), 4);

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["Legacy"], raw["Legacy"]);
        assert_eq!(back["Tags"], raw["Tags"]);
        assert_eq!(back["Holes"], raw["Holes"]);
        assert_eq!(back["Keep"][0]["title"], "a");
    }

    #[test]
    fn tab_settings_default_enables_every_tab() {
        let settings = TabSettings::default();
        for flag in ["aiEditor", "imageEdit", "textEdit", "colors", "clipart"] {
            assert!(settings.is_enabled(flag), "{flag} should default to true");
        }
        assert_eq!(settings.0.len(), 5);
    }
}
