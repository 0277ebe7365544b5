//! Error handling
//!
//! Extraction itself never fails; these errors only come from the I/O edges
//! (reading the changeset list, writing the table).

use crate::logic::features::layout::LayoutMismatchError;

pub type ExtractResult<T> = Result<T, ExtractError>;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),

    #[error("Malformed changeset list at line {line}: {reason}")]
    ChangesetList { line: usize, reason: String },
}
