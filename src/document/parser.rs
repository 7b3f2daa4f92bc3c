use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::types::{CustomizableData, DesignDocument, TabSettings};
use super::DocumentColumn;

/// JSON shape a column document must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Map,
    Sequence,
}

/// A document type stored in a JSON column
pub trait ColumnDocument: DeserializeOwned + Serialize {
    const SHAPE: Shape;
}

impl ColumnDocument for DesignDocument {
    const SHAPE: Shape = Shape::Map;
}

impl ColumnDocument for TabSettings {
    const SHAPE: Shape = Shape::Map;
}

impl ColumnDocument for CustomizableData {
    const SHAPE: Shape = Shape::Sequence;
}

impl ColumnDocument for serde_json::Map<String, Value> {
    const SHAPE: Shape = Shape::Map;
}

/// Raw value handed over by the persistence layer or a request body
#[derive(Debug, Clone, Copy)]
pub enum RawColumn<'a> {
    Text(&'a str),
    Json(&'a Value),
}

impl<'a> From<&'a str> for RawColumn<'a> {
    fn from(text: &'a str) -> Self {
        RawColumn::Text(text)
    }
}

impl<'a> From<&'a String> for RawColumn<'a> {
    fn from(text: &'a String) -> Self {
        RawColumn::Text(text.as_str())
    }
}

impl<'a> From<&'a Value> for RawColumn<'a> {
    fn from(value: &'a Value) -> Self {
        RawColumn::Json(value)
    }
}

/// Why a parse produced no value
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// Null, blank, or the JSON literal `null`
    Absent,
    /// Not valid JSON, or JSON that does not fit the document type
    Malformed(String),
    /// Valid JSON of the wrong top-level kind (e.g. an array where a map belongs)
    WrongShape(&'static str),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Absent => f.write_str("value is empty"),
            FallbackReason::Malformed(error) => write!(f, "malformed JSON: {}", error),
            FallbackReason::WrongShape(found) => write!(f, "unexpected {}", found),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Fallback(FallbackReason),
}

impl<T> ParseOutcome<T> {
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            ParseOutcome::Parsed(value) => value,
            ParseOutcome::Fallback(_) => default,
        }
    }

    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.unwrap_or(T::default())
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseOutcome::Fallback(_))
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Fallback(reason) => Some(reason),
        }
    }
}

/// Identifies the column being parsed, for logging
#[derive(Debug, Clone, Copy)]
pub struct ColumnContext {
    pub product_id: Option<i64>,
    pub column: DocumentColumn,
}

impl ColumnContext {
    pub fn new(product_id: i64, column: DocumentColumn) -> Self {
        Self { product_id: Some(product_id), column }
    }

    /// Context for values that did not come from a stored row
    pub fn detached(column: DocumentColumn) -> Self {
        Self { product_id: None, column }
    }
}

/// Parse a stored JSON column without ever failing.
///
/// Text is trimmed and one outer pair of literal single quotes is stripped
/// before parsing. A native JSON string is treated as text.
pub fn try_parse_document<T: ColumnDocument>(raw: Option<RawColumn<'_>>) -> ParseOutcome<T> {
    let value = match raw {
        None => return ParseOutcome::Fallback(FallbackReason::Absent),
        Some(RawColumn::Json(Value::String(text))) => parse_text(text),
        Some(RawColumn::Json(value)) => Ok(value.clone()),
        Some(RawColumn::Text(text)) => parse_text(text),
    };

    let value = match value {
        Ok(Value::Null) => return ParseOutcome::Fallback(FallbackReason::Absent),
        Ok(value) => value,
        Err(reason) => return ParseOutcome::Fallback(reason),
    };

    match (T::SHAPE, &value) {
        (Shape::Map, Value::Array(_)) => {
            return ParseOutcome::Fallback(FallbackReason::WrongShape("array"))
        }
        (Shape::Sequence, Value::Object(_)) => {
            return ParseOutcome::Fallback(FallbackReason::WrongShape("object"))
        }
        _ => {}
    }

    match serde_json::from_value(value) {
        Ok(document) => ParseOutcome::Parsed(document),
        Err(e) => ParseOutcome::Fallback(FallbackReason::Malformed(e.to_string())),
    }
}

/// Parse a stored JSON column, substituting `default` on any failure.
///
/// Corrupt values are logged with the product id and column name; absent
/// values are not.
pub fn parse_document<T: ColumnDocument>(
    raw: Option<RawColumn<'_>>,
    default: T,
    context: ColumnContext,
) -> T {
    match try_parse_document(raw) {
        ParseOutcome::Parsed(document) => document,
        ParseOutcome::Fallback(FallbackReason::Absent) => default,
        ParseOutcome::Fallback(FallbackReason::Malformed(error)) => {
            tracing::warn!(
                product_id = ?context.product_id,
                column = %context.column,
                error = %error,
                "Error parsing stored document, using default"
            );
            default
        }
        ParseOutcome::Fallback(FallbackReason::WrongShape(found)) => {
            tracing::warn!(
                product_id = ?context.product_id,
                column = %context.column,
                found,
                "Stored document has the wrong shape, using default"
            );
            default
        }
    }
}

fn parse_text(text: &str) -> Result<Value, FallbackReason> {
    let mut clean = text.trim();
    if clean.is_empty() {
        return Ok(Value::Null);
    }
    if clean.len() >= 2 && clean.starts_with('\'') && clean.ends_with('\'') {
        clean = &clean[1..clean.len() - 1];
    }
    serde_json::from_str(clean).map_err(|e| FallbackReason::Malformed(e.to_string()))
}
