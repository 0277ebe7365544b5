//! Dataset Module - labelled input list and the output attribute table
//!
//! Rows are collected into an `AttributeTable` and written once, after all
//! changesets are processed.

pub mod record;
pub mod table;
pub mod export;
pub mod writer;


use std::path::PathBuf;

use crate::constants;

pub use export::{export_table, write_table, ExportFormat};
pub use record::{parse_changeset_list, read_changeset_list, Harmful, LabelledChangeset};
pub use table::AttributeTable;
pub use writer::DatasetWriter;

/// Get the base directory for dataset storage
pub fn get_dataset_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::APP_NAME)
        .join("datasets")
}
