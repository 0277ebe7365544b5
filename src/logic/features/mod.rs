//! Features Module - Attribute Extraction Engine
//!
//! Readers, metrics and diffs over feature versions, plus the column layout
//! and the row type they fill.

pub mod accessor;
pub mod geometry;
pub mod diff;
pub mod primary_tags;
pub mod tag_string;
pub mod layout;
pub mod vector;


// Re-export common types
pub use layout::{LayoutInfo, LayoutMismatchError, LAYOUT_VERSION};
pub use primary_tags::{PRIMARY_TAGS, PRIMARY_TAG_COUNT};
pub use tag_string::{ChangedTagsEncoder, TagEncoder};
pub use vector::{AttributeRow, AttributeRowBuilder, AttributeValue};
