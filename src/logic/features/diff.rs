//! Pairwise Diff Engine
//!
//! Attributes that compare a new version with the version it replaced.
//! Either side may be absent; every function then falls back to 0.

use crate::logic::changeset::{FeatureVersion, Tags};
use crate::logic::config::MetricSpace;
use crate::logic::users::UserDetails;

use super::accessor;
use super::geometry::{self, round_to, AREA_DIGITS};

/// Key of the primary name tag
pub const NAME_KEY: &str = "name";
/// Prefix of localized name tags (`name:en`, `name:de`, ...)
pub const LOCALIZED_NAME_PREFIX: &str = "name:";

// ============================================================================
// GEOMETRY / COUNT DIFFS
// ============================================================================

/// Distance between the two versions' centroids, 0 if either is missing
pub fn centroid_distance(new: Option<&FeatureVersion>, old: Option<&FeatureVersion>, metric: MetricSpace) -> f64 {
    match (geometry::centroid(new), geometry::centroid(old)) {
        (Some(a), Some(b)) => round_to(geometry::distance(metric, a, b), AREA_DIGITS),
        _ => 0.0,
    }
}

/// `numerator / denominator`, 0 when the denominator is 0
pub fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

pub fn tag_count_delta(new: Option<&FeatureVersion>, old: Option<&FeatureVersion>) -> i64 {
    accessor::number_of_tags(new) as i64 - accessor::number_of_tags(old) as i64
}

pub fn tag_count_ratio(new: Option<&FeatureVersion>, old: Option<&FeatureVersion>) -> f64 {
    guarded_ratio(
        accessor::number_of_tags(new) as f64,
        accessor::number_of_tags(old) as f64,
    )
}

pub fn mapping_days_delta(new: &UserDetails, old: &UserDetails) -> i64 {
    new.mapping_days() - old.mapping_days()
}

pub fn mapping_days_ratio(new: &UserDetails, old: &UserDetails) -> f64 {
    guarded_ratio(new.mapping_days() as f64, old.mapping_days() as f64)
}

// ============================================================================
// NAME CHANGES
// ============================================================================

/// The two situations a name comparison can be in
#[derive(Debug, Clone, Copy)]
pub enum NameHistory<'a> {
    /// First version of the feature
    NoPriorVersion { new: &'a Tags },
    HasPriorVersion { new: &'a Tags, old: &'a Tags },
}

impl<'a> NameHistory<'a> {
    /// `None` when a present version has no readable tag mapping
    pub fn resolve(new: Option<&'a FeatureVersion>, old: Option<&'a FeatureVersion>) -> Option<Self> {
        let new_tags = accessor::tags(new)?;
        match old {
            None => Some(NameHistory::NoPriorVersion { new: new_tags }),
            Some(old) => Some(NameHistory::HasPriorVersion {
                new: new_tags,
                old: accessor::tags(Some(old))?,
            }),
        }
    }

    /// The `name` value differs; a missing name is a value of its own.
    /// A first version has nothing to differ from.
    pub fn name_modified(&self) -> bool {
        match self {
            NameHistory::NoPriorVersion { .. } => false,
            NameHistory::HasPriorVersion { new, old } => new.get(NAME_KEY) != old.get(NAME_KEY),
        }
    }

    /// Like `name_modified`, but also counts `name:*` tags, and a first
    /// version counts when it carries any name at all.
    pub fn name_touched(&self) -> bool {
        match self {
            NameHistory::NoPriorVersion { new } => new.keys().any(|key| is_name_key(key)),
            NameHistory::HasPriorVersion { new, old } => {
                self.name_modified()
                    || new
                        .keys()
                        .chain(old.keys())
                        .filter(|key| key.starts_with(LOCALIZED_NAME_PREFIX))
                        .any(|key| new.get(key) != old.get(key))
            }
        }
    }
}

fn is_name_key(key: &str) -> bool {
    key == NAME_KEY || key.starts_with(LOCALIZED_NAME_PREFIX)
}

/// 1 if the `name` tag differs between versions, else 0
pub fn name_changed(new: Option<&FeatureVersion>, old: Option<&FeatureVersion>) -> u8 {
    NameHistory::resolve(new, old).map_or(0, |h| u8::from(h.name_modified()))
}

/// 1 if `name` or any `name:*` tag was added, removed or changed, else 0
pub fn name_touched(new: Option<&FeatureVersion>, old: Option<&FeatureVersion>) -> u8 {
    NameHistory::resolve(new, old).map_or(0, |h| u8::from(h.name_touched()))
}
