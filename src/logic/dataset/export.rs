//! Table Export
//!
//! Writes an `AttributeTable` as CSV, JSONL (one object of named values per
//! row) or a pretty JSON array.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::table::AttributeTable;
use crate::logic::error::ExtractResult;

// ============================================================================
// EXPORT FORMATS
// ============================================================================

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// CSV with header row (default)
    #[default]
    Csv,
    /// One JSON object per line
    Jsonl,
    /// Pretty JSON array of objects
    JsonArray,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "jsonl" | "ndjson" => Some(ExportFormat::Jsonl),
            "json" | "jsonarray" | "json-array" => Some(ExportFormat::JsonArray),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Jsonl => "jsonl",
            ExportFormat::JsonArray => "json",
        }
    }
}

// ============================================================================
// EXPORT FUNCTIONS
// ============================================================================

/// Write the table to any sink. Returns the number of rows written.
pub fn write_table<W: Write>(table: &AttributeTable, format: ExportFormat, mut out: W) -> ExtractResult<usize> {
    for row in table.rows() {
        row.validate()?;
    }

    match format {
        ExportFormat::Csv => {
            out.write_all(table.to_csv().as_bytes())?;
        }
        ExportFormat::Jsonl => {
            for row in table.rows() {
                writeln!(out, "{}", serde_json::to_string(&row.to_named_json())?)?;
            }
        }
        ExportFormat::JsonArray => {
            let rows: Vec<Value> = table.rows().iter().map(|row| row.to_named_json()).collect();
            serde_json::to_writer_pretty(&mut out, &rows)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(table.len())
}

/// Export the table to a file (truncated if it exists)
pub fn export_table(table: &AttributeTable, destination: &Path, format: ExportFormat) -> ExtractResult<usize> {
    let file = File::create(destination)?;
    let count = write_table(table, format, BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", count, destination.display());
    Ok(count)
}
