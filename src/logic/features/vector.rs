//! Attribute Row - one output row per sample
//!
//! **Versioned row with layout validation**
//!
//! Uses the centralized layout from `layout.rs` for:
//! - Consistent column ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use super::layout::{self, validate_layout, LayoutMismatchError, LAYOUT_VERSION};
use crate::logic::config::AttributeSchema;

// ============================================================================
// CELL VALUE
// ============================================================================

/// One scalar cell. `Blank` renders as an empty cell, never as null.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Float(f64),
    Text(String),
    Blank,
}

impl AttributeValue {
    pub fn flag(value: bool) -> Self {
        AttributeValue::Int(i64::from(value))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, AttributeValue::Blank)
    }

    /// Cell text with CSV quoting where needed
    pub fn to_csv_field(&self) -> String {
        let text = self.to_string();
        if text.contains(|c: char| c == ',' || c == '"' || c == '\n' || c == '\r') {
            format!("\"{}\"", text.replace('"', "\"\""))
        } else {
            text
        }
    }
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{}", v),
            AttributeValue::Float(v) => write!(f, "{}", v),
            AttributeValue::Text(v) => f.write_str(v),
            AttributeValue::Blank => Ok(()),
        }
    }
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AttributeValue::Int(v) => serializer.serialize_i64(*v),
            AttributeValue::Float(v) => serializer.serialize_f64(*v),
            AttributeValue::Text(v) => serializer.serialize_str(v),
            AttributeValue::Blank => serializer.serialize_str(""),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<usize> for AttributeValue {
    fn from(value: usize) -> Self {
        AttributeValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u8> for AttributeValue {
    fn from(value: u8) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttributeValue::Blank, Into::into)
    }
}

// ============================================================================
// VERSIONED ATTRIBUTE ROW
// ============================================================================

/// Versioned row with layout metadata.
///
/// Always holds exactly `layout::column_count(schema)` cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRow {
    /// Layout version
    pub version: u8,
    /// CRC32 hash of the schema's column layout
    pub layout_hash: u32,
    pub schema: AttributeSchema,
    /// Cells in the order defined by the schema's layout
    pub values: Vec<AttributeValue>,
}

impl AttributeRow {
    /// Create a row of blank cells
    pub fn new(schema: AttributeSchema) -> Self {
        Self {
            version: LAYOUT_VERSION,
            layout_hash: layout::layout_hash(schema),
            schema,
            values: vec![AttributeValue::Blank; layout::column_count(schema)],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[AttributeValue] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&AttributeValue> {
        layout::column_index(self.schema, name).and_then(|i| self.get(i))
    }

    /// Out-of-range indices are ignored
    pub fn set(&mut self, index: usize, value: AttributeValue) {
        if let Some(cell) = self.values.get_mut(index) {
            *cell = value;
        }
    }

    /// Set cell by column name
    pub fn set_by_name(&mut self, name: &str, value: AttributeValue) -> bool {
        if let Some(index) = layout::column_index(self.schema, name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Validate that this row is compatible with the current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.schema, self.version, self.layout_hash)
    }

    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok() && self.values.len() == layout::column_count(self.schema)
    }

    pub fn column_names(&self) -> &'static [String] {
        layout::columns(self.schema)
    }

    /// One CSV line, without the trailing newline
    pub fn to_csv_line(&self) -> String {
        self.values
            .iter()
            .map(AttributeValue::to_csv_field)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Column name -> value object
    pub fn to_named_json(&self) -> Value {
        let named: Map<String, Value> = self
            .column_names()
            .iter()
            .zip(&self.values)
            .map(|(name, value)| {
                (name.clone(), serde_json::to_value(value).unwrap_or(Value::Null))
            })
            .collect();
        Value::Object(named)
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for an AttributeRow with named setters
pub struct AttributeRowBuilder {
    row: AttributeRow,
}

impl AttributeRowBuilder {
    pub fn new(schema: AttributeSchema) -> Self {
        Self { row: AttributeRow::new(schema) }
    }

    /// Set column by name; names outside the schema are skipped
    pub fn set(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.row.set_by_name(name, value.into());
        self
    }

    pub fn schema(&self) -> AttributeSchema {
        self.row.schema
    }

    pub fn build(self) -> AttributeRow {
        self.row
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{EXTENDED_COLUMN_COUNT, HIGHWAY_COLUMN_COUNT};

    #[test]
    fn test_row_new() {
        let row = AttributeRow::new(AttributeSchema::Highway);
        assert_eq!(row.version, LAYOUT_VERSION);
        assert_eq!(row.len(), HIGHWAY_COLUMN_COUNT);
        assert!(row.values.iter().all(AttributeValue::is_blank));
        assert!(row.is_compatible());

        assert_eq!(AttributeRow::new(AttributeSchema::Extended).len(), EXTENDED_COLUMN_COUNT);
    }

    #[test]
    fn test_builder_and_lookup() {
        let row = AttributeRowBuilder::new(AttributeSchema::Highway)
            .set("changeset_id", "4711")
            .set("old_number_of_tags", 3usize)
            .set("ratio_number_of_tags", 0.5)
            .set("name_touched", 1u8)
            .build();

        assert_eq!(row.get_by_name("changeset_id"), Some(&AttributeValue::Text("4711".into())));
        assert_eq!(row.get_by_name("old_number_of_tags"), Some(&AttributeValue::Int(3)));
        assert_eq!(row.get(26).and_then(AttributeValue::as_f64), Some(0.5));
        assert_eq!(row.get_by_name("name_touched"), None);
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut row = AttributeRow::new(AttributeSchema::Highway);
        row.set(1000, AttributeValue::Int(1));
        assert!(!row.set_by_name("nonexistent", AttributeValue::Int(1)));
        assert_eq!(row.len(), HIGHWAY_COLUMN_COUNT);
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(AttributeValue::Float(10.0).to_string(), "10");
        assert_eq!(AttributeValue::Float(0.25).to_string(), "0.25");
        assert_eq!(AttributeValue::Blank.to_string(), "");
        assert_eq!(AttributeValue::from(None::<i64>), AttributeValue::Blank);
        assert_eq!(AttributeValue::from(Some(2i64)), AttributeValue::Int(2));
        assert_eq!(AttributeValue::Text("a,b".into()).to_csv_field(), "\"a,b\"");
        assert_eq!(AttributeValue::Text("say \"hi\"".into()).to_csv_field(), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_validation_detects_foreign_layout() {
        let mut row = AttributeRow::new(AttributeSchema::Highway);
        row.layout_hash = layout::layout_hash(AttributeSchema::Extended);
        assert!(row.validate().is_err());
    }

    #[test]
    fn test_named_json() {
        let row = AttributeRowBuilder::new(AttributeSchema::Highway)
            .set("feature_id", "12")
            .build();

        let json = row.to_named_json();
        assert_eq!(json["feature_id"], "12");
        assert_eq!(json["changeset_harmful"], "");
        assert_eq!(json.as_object().map(|o| o.len()), Some(HIGHWAY_COLUMN_COUNT));
    }
}
