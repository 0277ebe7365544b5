//! Samplers - pick which version pairs of a changeset become rows

use super::{Changeset, FeatureVersion, Sample};
use crate::constants;
use crate::logic::features::accessor;

/// Produces the `(new, old)` pairs to extract from one changeset
pub trait Sampler {
    fn samples(&self, changeset: &Changeset) -> Vec<Sample>;
}

/// Emits the newest version of every feature carrying `tag_key`, paired with
/// the version before it. Deleted features are matched on their previous
/// version's tags, since a deletion usually carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSampler {
    tag_key: String,
}

impl TagSampler {
    pub fn new(tag_key: impl Into<String>) -> Self {
        Self { tag_key: tag_key.into() }
    }

    pub fn highway() -> Self {
        Self::new(constants::DEFAULT_SAMPLE_TAG)
    }

    pub fn tag_key(&self) -> &str {
        &self.tag_key
    }

    fn carries_tag(&self, version: Option<&FeatureVersion>) -> bool {
        accessor::tag(version, &self.tag_key).is_some()
    }
}

impl Default for TagSampler {
    fn default() -> Self {
        Self::highway()
    }
}

impl Sampler for TagSampler {
    fn samples(&self, changeset: &Changeset) -> Vec<Sample> {
        changeset
            .histories()
            .filter_map(|history| {
                let (newest, earlier) = history.split_last()?;
                let previous = earlier.last();

                let deleted = accessor::action(Some(newest)) == "delete";
                let matches = self.carries_tag(Some(newest)) || (deleted && self.carries_tag(previous));

                matches.then(|| Sample::new(newest.clone(), previous.cloned()))
            })
            .collect()
    }
}
