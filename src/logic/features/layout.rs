//! Attribute Layout - Centralized Column Definition
//!
//! **CRITICAL: This file controls the output schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add column → increment LAYOUT_VERSION
//! 2. Change order → increment LAYOUT_VERSION
//! 3. Remove column → increment LAYOUT_VERSION
//!
//! ## Why versioning matters:
//! - Trained classifiers index columns by position
//! - Datasets from different runs must be concatenable

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::primary_tags::{primary_tag_column, PRIMARY_TAGS, PRIMARY_TAG_COUNT};
use crate::logic::config::AttributeSchema;

// ============================================================================
// LAYOUT VERSION
// ============================================================================

/// Current layout version
/// MUST be incremented when any layout changes
pub const LAYOUT_VERSION: u8 = 1;

// ============================================================================
// COLUMN LAYOUT (Authoritative source)
// ============================================================================

/// Highway dataset columns, in output order
pub const HIGHWAY_LAYOUT: &[&str] = &[
    // === Identity (0-3) ===
    "changeset_id",
    "changeset_harmful",
    "feature_id",
    "feature_version",

    // === One-hot action / kind (4-9) ===
    "action_create",
    "action_modify",
    "action_delete",
    "geometry_type_node",
    "geometry_type_way",
    "geometry_type_relation",

    // === Geometry (10-18) ===
    "geometry_distance_between_versions",
    "old_geometry_line_distance",
    "old_geometry_number_of_nodes",
    "old_geometry_kinks",
    "old_geometry_area",
    "new_geometry_line_distance",
    "new_geometry_number_of_nodes",
    "new_geometry_kinks",
    "new_geometry_area",

    // === User (19-22) ===
    "old_user_mapping_days",
    "new_user_mapping_days",
    "difference_user_mapping_days",
    "ratio_user_mapping_days",

    // === Tags (23-28) ===
    "old_number_of_tags",
    "new_number_of_tags",
    "difference_number_of_tags",
    "ratio_number_of_tags",
    "old_tags",
    "new_tags",
];

/// IMPORTANT: Must match HIGHWAY_LAYOUT.len()!
pub const HIGHWAY_COLUMN_COUNT: usize = 29;

/// Columns the extended schema appends after the highway columns,
/// followed by one `primary_tag_<key>` column per vocabulary key
pub const EXTENDED_LAYOUT: &[&str] = &[
    "old_geometry_bbox_area",
    "new_geometry_bbox_area",
    "old_geometry_longest_segment",
    "new_geometry_longest_segment",
    "name_modified",
    "name_touched",
    "new_primary_tag_count",
];

pub const EXTENDED_COLUMN_COUNT: usize = 29 + 7 + PRIMARY_TAG_COUNT;

static HIGHWAY_COLUMNS: Lazy<Vec<String>> =
    Lazy::new(|| HIGHWAY_LAYOUT.iter().map(|s| s.to_string()).collect());

static EXTENDED_COLUMNS: Lazy<Vec<String>> = Lazy::new(|| {
    HIGHWAY_LAYOUT
        .iter()
        .chain(EXTENDED_LAYOUT)
        .map(|s| s.to_string())
        .chain(PRIMARY_TAGS.iter().map(|key| primary_tag_column(key)))
        .collect()
});

static HIGHWAY_HASH: Lazy<u32> = Lazy::new(|| compute_layout_hash(AttributeSchema::Highway));
static EXTENDED_HASH: Lazy<u32> = Lazy::new(|| compute_layout_hash(AttributeSchema::Extended));

/// Column names of a schema, in output order
pub fn columns(schema: AttributeSchema) -> &'static [String] {
    match schema {
        AttributeSchema::Highway => HIGHWAY_COLUMNS.as_slice(),
        AttributeSchema::Extended => EXTENDED_COLUMNS.as_slice(),
    }
}

pub fn column_count(schema: AttributeSchema) -> usize {
    columns(schema).len()
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of a schema's layout
/// Used to detect layout mismatches when rows are merged or replayed
pub fn compute_layout_hash(schema: AttributeSchema) -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[LAYOUT_VERSION]);

    // Hash all column names in order
    for name in columns(schema) {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (cached)
pub fn layout_hash(schema: AttributeSchema) -> u32 {
    match schema {
        AttributeSchema::Highway => *HIGHWAY_HASH,
        AttributeSchema::Extended => *EXTENDED_HASH,
    }
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub schema: AttributeSchema,
    pub hash: u32,
    pub column_count: usize,
    pub column_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current(schema: AttributeSchema) -> Self {
        Self {
            version: LAYOUT_VERSION,
            schema,
            hash: layout_hash(schema),
            column_count: column_count(schema),
            column_names: columns(schema).to_vec(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a row's layout doesn't match the expected one
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Attribute layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches the schema's current layout
pub fn validate_layout(
    schema: AttributeSchema,
    incoming_version: u8,
    incoming_hash: u32,
) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash(schema);

    if incoming_version != LAYOUT_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: LAYOUT_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// COLUMN INDEX LOOKUP
// ============================================================================

/// Get column index by name (O(n) but columns are few)
pub fn column_index(schema: AttributeSchema, name: &str) -> Option<usize> {
    columns(schema).iter().position(|n| n == name)
}

/// Get column name by index
pub fn column_name(schema: AttributeSchema, index: usize) -> Option<&'static str> {
    columns(schema).get(index).map(String::as_str)
}

// ============================================================================
// TESTS
// ============================================================================
