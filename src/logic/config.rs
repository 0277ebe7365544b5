//! Extraction Configuration
//!
//! Run-scoped settings: distance model, output schema, excluded users.

use serde::{Deserialize, Serialize};

use crate::constants;

/// How distances and areas are measured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricSpace {
    /// Haversine distances in kilometres, spherical areas in square metres
    #[default]
    Geodesic,
    /// Euclidean distances and shoelace areas in coordinate units
    Planar,
}

impl MetricSpace {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "geodesic" => Some(MetricSpace::Geodesic),
            "planar" => Some(MetricSpace::Planar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricSpace::Geodesic => "geodesic",
            MetricSpace::Planar => "planar",
        }
    }
}

/// Which column layout the output table uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeSchema {
    /// The 29 highway dataset columns
    #[default]
    Highway,
    /// Highway columns plus bbox, longest segment, name and primary tag columns
    Extended,
}

impl AttributeSchema {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "highway" => Some(AttributeSchema::Highway),
            "extended" => Some(AttributeSchema::Extended),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeSchema::Highway => "highway",
            AttributeSchema::Extended => "extended",
        }
    }
}

/// Settings for one extraction run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub metric: MetricSpace,
    pub schema: AttributeSchema,
    /// Samples touched by any of these usernames are dropped
    pub blocked_users: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            metric: MetricSpace::default(),
            schema: AttributeSchema::default(),
            blocked_users: constants::DEFAULT_BLOCKED_USERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let metric_name = constants::get_metric();
        let metric = MetricSpace::parse(&metric_name).unwrap_or_else(|| {
            log::warn!("Unknown metric '{}', using {}", metric_name, constants::DEFAULT_METRIC);
            MetricSpace::default()
        });

        let schema_name = constants::get_schema();
        let schema = AttributeSchema::parse(&schema_name).unwrap_or_else(|| {
            log::warn!("Unknown schema '{}', using {}", schema_name, constants::DEFAULT_SCHEMA);
            AttributeSchema::default()
        });

        Self {
            metric,
            schema,
            blocked_users: constants::get_blocked_users(),
        }
    }

    pub fn with_metric(mut self, metric: MetricSpace) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_schema(mut self, schema: AttributeSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_blocked_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Exact, case-sensitive match against the blocklist
    pub fn is_blocked(&self, username: &str) -> bool {
        self.blocked_users.iter().any(|blocked| blocked == username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.metric, MetricSpace::Geodesic);
        assert_eq!(config.schema, AttributeSchema::Highway);
        assert!(config.is_blocked("chinakz"));
        assert!(!config.is_blocked("ChinaKZ"));
        assert!(!config.is_blocked(""));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(MetricSpace::parse(" Planar "), Some(MetricSpace::Planar));
        assert_eq!(MetricSpace::parse("mercator"), None);
        assert_eq!(AttributeSchema::parse("EXTENDED"), Some(AttributeSchema::Extended));
        assert_eq!(AttributeSchema::parse(""), None);
    }

    #[test]
    fn test_builder_setters() {
        let config = ExtractorConfig::default()
            .with_metric(MetricSpace::Planar)
            .with_schema(AttributeSchema::Extended)
            .with_blocked_users(["alice", "bob"]);

        assert_eq!(config.metric.as_str(), "planar");
        assert_eq!(config.schema.as_str(), "extended");
        assert!(config.is_blocked("bob"));
        assert!(!config.is_blocked("chinakz"));
    }
}
