//! Feature Accessor - default-safe readers on one feature version
//!
//! Every reader takes `Option<&FeatureVersion>` and returns a plain value.
//! Absent versions and absent fields map to a documented default; nothing
//! here can fail.

use crate::logic::changeset::{Action, FeatureVersion, GeometryKind, Tags};

/// Separator used by `feature_hash`
pub const HASH_SEPARATOR: &str = "!";

fn text(field: Option<&String>) -> String {
    field.cloned().unwrap_or_default()
}

/// Feature id, or `""`
pub fn feature_id(v: Option<&FeatureVersion>) -> String {
    text(v.and_then(|v| v.id.as_ref()))
}

/// Version number read like an integer prefix (`"3"`, `" 3"`, `"3.0"` -> 3).
/// `None` when no leading integer exists; rendered as a blank cell.
pub fn feature_version(v: Option<&FeatureVersion>) -> Option<i64> {
    v.and_then(|v| v.version.as_deref()).and_then(parse_leading_int)
}

/// Edit action text, or `""`
pub fn action(v: Option<&FeatureVersion>) -> String {
    text(v.and_then(|v| v.action.as_ref()))
}

pub fn action_kind(v: Option<&FeatureVersion>) -> Option<Action> {
    v.and_then(|v| v.action.as_deref()).and_then(Action::parse)
}

/// `node` / `way` / `relation`, or `""`
pub fn geometry_kind(v: Option<&FeatureVersion>) -> String {
    text(v.and_then(|v| v.kind.as_ref()))
}

pub fn geometry_kind_of(v: Option<&FeatureVersion>) -> Option<GeometryKind> {
    v.and_then(|v| v.kind.as_deref()).and_then(GeometryKind::parse)
}

pub fn username(v: Option<&FeatureVersion>) -> String {
    text(v.and_then(|v| v.user.as_ref()))
}

pub fn user_id(v: Option<&FeatureVersion>) -> String {
    text(v.and_then(|v| v.uid.as_ref()))
}

/// `kind!id!version` identity key across versions; `""` if any part is missing
pub fn feature_hash(v: Option<&FeatureVersion>) -> String {
    let parts = v.and_then(|v| Some([v.kind.as_deref()?, v.id.as_deref()?, v.version.as_deref()?]));
    parts.map(|p| p.join(HASH_SEPARATOR)).unwrap_or_default()
}

pub fn tags(v: Option<&FeatureVersion>) -> Option<&Tags> {
    v.and_then(|v| v.tags.as_ref())
}

pub fn tag<'a>(v: Option<&'a FeatureVersion>, key: &str) -> Option<&'a str> {
    tags(v).and_then(|t| t.get(key)).map(String::as_str)
}

/// Count of tags, 0 if absent
pub fn number_of_tags(v: Option<&FeatureVersion>) -> usize {
    tags(v).map_or(0, Tags::len)
}

/// Optional sign followed by digits at the start of the (trimmed) text
pub(crate) fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let sign_len = usize::from(trimmed.starts_with(|c: char| c == '+' || c == '-'));
    let digits = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> FeatureVersion {
        FeatureVersion::from_json(&json!({
            "properties": {
                "id": 99, "version": 4, "type": "node", "action": "create",
                "user": "mapper", "uid": "123", "tags": { "amenity": "cafe", "name": "Kiosk" }
            }
        }))
    }

    #[test]
    fn test_accessors_on_complete_version() {
        let v = sample();
        assert_eq!(feature_id(Some(&v)), "99");
        assert_eq!(feature_version(Some(&v)), Some(4));
        assert_eq!(action(Some(&v)), "create");
        assert_eq!(action_kind(Some(&v)), Some(Action::Create));
        assert_eq!(geometry_kind(Some(&v)), "node");
        assert_eq!(geometry_kind_of(Some(&v)), Some(GeometryKind::Node));
        assert_eq!(username(Some(&v)), "mapper");
        assert_eq!(user_id(Some(&v)), "123");
        assert_eq!(feature_hash(Some(&v)), "node!99!4");
        assert_eq!(number_of_tags(Some(&v)), 2);
        assert_eq!(tag(Some(&v), "name"), Some("Kiosk"));
    }

    #[test]
    fn test_accessors_on_absent_version() {
        assert_eq!(feature_id(None), "");
        assert_eq!(feature_version(None), None);
        assert_eq!(action(None), "");
        assert_eq!(geometry_kind(None), "");
        assert_eq!(username(None), "");
        assert_eq!(user_id(None), "");
        assert_eq!(feature_hash(None), "");
        assert_eq!(number_of_tags(None), 0);
        assert_eq!(tag(None, "name"), None);
    }

    #[test]
    fn test_hash_requires_all_parts() {
        let mut v = sample();
        v.version = None;
        assert_eq!(feature_hash(Some(&v)), "");
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int("  7abc"), Some(7));
        assert_eq!(parse_leading_int("3.0"), Some(3));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("v2"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
    }
}
