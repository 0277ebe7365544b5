//! Tag Encoder - tags of one version rendered as text

use crate::logic::changeset::FeatureVersion;

use super::accessor;

/// Renders the tags of `version` relative to `other`
pub trait TagEncoder {
    fn encode(&self, version: Option<&FeatureVersion>, other: Option<&FeatureVersion>) -> String;
}

/// Tags of `version` that `other` lacks or holds with a different value,
/// sorted by key, as `key=value` joined by `;`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangedTagsEncoder;

impl ChangedTagsEncoder {
    pub const SEPARATOR: &'static str = ";";
}

impl TagEncoder for ChangedTagsEncoder {
    fn encode(&self, version: Option<&FeatureVersion>, other: Option<&FeatureVersion>) -> String {
        let Some(tags) = accessor::tags(version) else {
            return String::new();
        };

        tags.iter()
            .filter(|(key, value)| accessor::tag(other, key) != Some(value.as_str()))
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(Self::SEPARATOR)
    }
}
