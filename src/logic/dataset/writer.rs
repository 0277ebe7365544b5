use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::export::{export_table, ExportFormat};
use super::get_dataset_dir;
use super::table::AttributeTable;
use crate::logic::error::ExtractResult;

/// Writes each table to its own timestamped file under `base_dir`
pub struct DatasetWriter {
    base_dir: PathBuf,
}

impl DatasetWriter {
    pub fn new() -> ExtractResult<Self> {
        Self::from_path(get_dataset_dir())
    }

    pub fn from_path(base_dir: PathBuf) -> ExtractResult<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write `table` as `attributes-<schema>-<timestamp>.<ext>` and return its path
    pub fn write(&self, table: &AttributeTable, format: ExportFormat) -> ExtractResult<PathBuf> {
        let path = self.next_path(table, format);
        export_table(table, &path, format)?;
        Ok(path)
    }

    /// Dataset files in this directory, oldest first
    pub fn list(&self) -> ExtractResult<Vec<PathBuf>> {
        let mut paths = fs::read_dir(&self.base_dir)?
            .filter_map(|res| res.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map_or(false, |n| n.starts_with("attributes-"))
            })
            .collect::<Vec<_>>();

        // Sort by filename (timestamp ensures order)
        paths.sort();
        Ok(paths)
    }

    fn next_path(&self, table: &AttributeTable, format: ExportFormat) -> PathBuf {
        // timestamp format: YYYY-MM-DD-HHMMSS-mmm
        let stamp = Utc::now().format("%Y-%m-%d-%H%M%S-%3f");
        let stem = format!("attributes-{}-{}", table.schema().as_str(), stamp);

        let mut path = self.base_dir.join(format!("{}.{}", stem, format.extension()));
        let mut suffix = 1;
        while path.exists() {
            path = self
                .base_dir
                .join(format!("{}-{}.{}", stem, suffix, format.extension()));
            suffix += 1;
        }
        path
    }
}
