//! Attribute Table - header plus rows of one schema

use serde::Serialize;

use crate::logic::config::AttributeSchema;
use crate::logic::features::layout;
use crate::logic::features::{AttributeRow, LayoutMismatchError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeTable {
    schema: AttributeSchema,
    rows: Vec<AttributeRow>,
}

impl AttributeTable {
    pub fn new(schema: AttributeSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> AttributeSchema {
        self.schema
    }

    pub fn header(&self) -> &'static [String] {
        layout::columns(self.schema)
    }

    /// Append a row; rows built for another layout are rejected
    pub fn push(&mut self, row: AttributeRow) -> Result<(), LayoutMismatchError> {
        layout::validate_layout(self.schema, row.version, row.layout_hash)?;
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[AttributeRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header line followed by one line per row, each ending in `\n`
    pub fn to_csv(&self) -> String {
        let mut out = self.header().join(",");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.to_csv_line());
            out.push('\n');
        }
        out
    }
}
