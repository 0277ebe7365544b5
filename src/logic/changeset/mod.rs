//! Changeset Module - Version histories and sample pairs
//!
//! A `Changeset` groups every version it references by feature, ordered by
//! version number. Samplers turn it into `(new, old)` pairs for extraction.

pub mod version;
pub mod source;
pub mod sampler;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::logic::features::accessor;

pub use sampler::{Sampler, TagSampler};
pub use source::{ChangesetSource, DirectoryChangesetSource, InMemoryChangesets};
pub use version::{Action, FeatureVersion, GeometryKind, Tags};

// ============================================================================
// CHANGESET
// ============================================================================

/// Normalized changeset: per-feature version histories keyed by `kind!id`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub id: String,
    histories: BTreeMap<String, Vec<FeatureVersion>>,
}

impl Changeset {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            histories: BTreeMap::new(),
        }
    }

    /// Group versions by feature and sort each history by version number
    pub fn from_versions<I>(id: impl Into<String>, versions: I) -> Self
    where
        I: IntoIterator<Item = FeatureVersion>,
    {
        let mut changeset = Self::new(id);
        for version in versions {
            changeset.push(version);
        }
        changeset
    }

    /// Read a FeatureCollection (or a bare array) of feature versions.
    /// Anything else yields an empty changeset.
    pub fn from_json(id: impl Into<String>, value: &Value) -> Self {
        let features = match value {
            Value::Array(items) => Some(items),
            Value::Object(object) => object.get("features").and_then(Value::as_array),
            _ => None,
        };

        let versions = features
            .into_iter()
            .flatten()
            .map(FeatureVersion::from_json);
        Self::from_versions(id, versions)
    }

    pub fn push(&mut self, version: FeatureVersion) {
        let key = history_key(&version);
        let history = self.histories.entry(key).or_default();
        history.push(version);
        // Stable: equal versions keep insertion order
        history.sort_by_key(|v| accessor::feature_version(Some(v)));
    }

    /// Histories in key order, each sorted oldest -> newest
    pub fn histories(&self) -> impl Iterator<Item = &[FeatureVersion]> {
        self.histories.values().map(Vec::as_slice)
    }

    pub fn feature_count(&self) -> usize {
        self.histories.len()
    }

    pub fn version_count(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

fn history_key(version: &FeatureVersion) -> String {
    format!(
        "{}!{}",
        accessor::geometry_kind(Some(version)),
        accessor::feature_id(Some(version))
    )
}

// ============================================================================
// SAMPLE
// ============================================================================

/// A `(new, old)` pair of versions of the same feature; `old` is `None` for a
/// feature's first version.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub new: FeatureVersion,
    pub old: Option<FeatureVersion>,
}

impl Sample {
    pub fn new(new: FeatureVersion, old: Option<FeatureVersion>) -> Self {
        Self { new, old }
    }

    pub fn new_version(&self) -> &FeatureVersion {
        &self.new
    }

    pub fn old_version(&self) -> Option<&FeatureVersion> {
        self.old.as_ref()
    }
}
