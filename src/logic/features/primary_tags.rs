//! Primary-Tag Encoder
//!
//! One-hot flags over a fixed vocabulary of top-level category keys.
//! Vocabulary order defines column order and never changes at runtime.

use crate::logic::changeset::FeatureVersion;

use super::accessor;

pub const PRIMARY_TAG_COUNT: usize = 26;

/// Category keys, in column order
pub const PRIMARY_TAGS: [&str; PRIMARY_TAG_COUNT] = [
    "aerialway",
    "aeroway",
    "amenity",
    "barrier",
    "boundary",
    "building",
    "craft",
    "emergency",
    "geological",
    "highway",
    "historic",
    "landuse",
    "leisure",
    "man_made",
    "military",
    "natural",
    "office",
    "place",
    "power",
    "public_transport",
    "railway",
    "route",
    "shop",
    "sport",
    "tourism",
    "waterway",
];

/// 1 per vocabulary key present on `v`, 0 otherwise; all zeros without tags
pub fn primary_tag_vector(v: Option<&FeatureVersion>) -> [u8; PRIMARY_TAG_COUNT] {
    let mut flags = [0u8; PRIMARY_TAG_COUNT];
    if let Some(tags) = accessor::tags(v) {
        for (flag, key) in flags.iter_mut().zip(PRIMARY_TAGS) {
            *flag = u8::from(tags.contains_key(key));
        }
    }
    flags
}

/// How many vocabulary keys `v` carries
pub fn primary_tag_count(v: Option<&FeatureVersion>) -> usize {
    primary_tag_vector(v).iter().filter(|&&flag| flag == 1).count()
}

/// Column name for a vocabulary key
pub fn primary_tag_column(key: &str) -> String {
    format!("primary_tag_{}", key)
}
