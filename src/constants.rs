//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every default can be overridden through an environment variable.

/// Users whose edits never produce a row (labelled through a user block)
pub const DEFAULT_BLOCKED_USERS: &[&str] = &["chinakz"];

/// Default distance/area model: `geodesic` or `planar`
pub const DEFAULT_METRIC: &str = "geodesic";

/// Default output schema: `highway` or `extended`
pub const DEFAULT_SCHEMA: &str = "highway";

/// Tag key the default sampler filters on
pub const DEFAULT_SAMPLE_TAG: &str = "highway";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "changeset-attributes";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get blocked usernames from `CHANGESET_BLOCKED_USERS` (comma separated) or use default
pub fn get_blocked_users() -> Vec<String> {
    match std::env::var("CHANGESET_BLOCKED_USERS") {
        Ok(raw) => parse_user_list(&raw),
        Err(_) => DEFAULT_BLOCKED_USERS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Get metric name from environment or use default
pub fn get_metric() -> String {
    std::env::var("CHANGESET_METRIC").unwrap_or_else(|_| DEFAULT_METRIC.to_string())
}

/// Get schema name from environment or use default
pub fn get_schema() -> String {
    std::env::var("CHANGESET_SCHEMA").unwrap_or_else(|_| DEFAULT_SCHEMA.to_string())
}

/// Get the sampler tag key from environment or use default
pub fn get_sample_tag() -> String {
    std::env::var("CHANGESET_SAMPLE_TAG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SAMPLE_TAG.to_string())
}

/// Split a comma separated user list, dropping empty entries
pub fn parse_user_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_list() {
        assert_eq!(parse_user_list("a, b,,c "), vec!["a", "b", "c"]);
        assert!(parse_user_list(" , ").is_empty());
    }
}
