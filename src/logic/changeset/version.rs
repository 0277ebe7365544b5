//! Feature Version - one snapshot of a map feature
//!
//! Parsing is lenient: crowd-sourced history routinely omits or mangles
//! fields, so every field that cannot be read becomes `None` instead of
//! rejecting the whole version.

use std::collections::BTreeMap;

use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::Value;

/// Tag key -> tag value
pub type Tags = BTreeMap<String, String>;

// ============================================================================
// EDIT ACTION / GEOMETRY KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Modify,
    Delete,
}

impl Action {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(Action::Create),
            "modify" => Some(Action::Modify),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Modify => "modify",
            Action::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Node,
    Way,
    Relation,
}

impl GeometryKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "node" => Some(GeometryKind::Node),
            "way" => Some(GeometryKind::Way),
            "relation" => Some(GeometryKind::Relation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Node => "node",
            GeometryKind::Way => "way",
            GeometryKind::Relation => "relation",
        }
    }
}

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// One version of one map feature, as produced by the changeset normalizer.
///
/// Scalar fields keep their raw text; accessors in `features::accessor`
/// decide how to interpret them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVersion {
    pub id: Option<String>,
    pub version: Option<String>,
    /// `node`, `way` or `relation`
    pub kind: Option<String>,
    /// `create`, `modify` or `delete`
    pub action: Option<String>,
    pub user: Option<String>,
    pub uid: Option<String>,
    pub tags: Option<Tags>,
    pub geometry: Option<Geometry<f64>>,
}

impl FeatureVersion {
    /// Read a GeoJSON-shaped feature:
    /// `{ "geometry": {..}, "properties": { "id", "version", "type", "action", "user", "uid", "tags" } }`
    pub fn from_json(value: &Value) -> Self {
        let properties = value.get("properties").and_then(Value::as_object);
        let field = |key: &str| {
            properties
                .and_then(|p| p.get(key))
                .and_then(scalar_to_string)
        };

        Self {
            id: field("id"),
            version: field("version"),
            kind: field("type"),
            action: field("action"),
            user: field("user"),
            uid: field("uid"),
            tags: properties.and_then(|p| p.get("tags")).and_then(parse_tags),
            geometry: value.get("geometry").and_then(parse_geometry),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Non-scalar tag values are dropped; a non-object tag container is absent
fn parse_tags(value: &Value) -> Option<Tags> {
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
            .collect(),
    )
}

// ============================================================================
// GEOMETRY PARSING
// ============================================================================

fn parse_geometry(value: &Value) -> Option<Geometry<f64>> {
    let coordinates = value.get("coordinates")?;

    match value.get("type")?.as_str()? {
        "Point" => parse_coord(coordinates).map(|c| Geometry::Point(Point::from(c))),
        "MultiPoint" => parse_coords(coordinates)
            .map(|cs| Geometry::MultiPoint(MultiPoint::new(cs.into_iter().map(Point::from).collect()))),
        "LineString" => parse_coords(coordinates).map(|cs| Geometry::LineString(LineString::new(cs))),
        "MultiLineString" => parse_rings(coordinates)
            .map(|lines| Geometry::MultiLineString(MultiLineString::new(lines))),
        "Polygon" => parse_polygon(coordinates).map(Geometry::Polygon),
        "MultiPolygon" => coordinates
            .as_array()?
            .iter()
            .map(parse_polygon)
            .collect::<Option<Vec<_>>>()
            .map(|polygons| Geometry::MultiPolygon(MultiPolygon::new(polygons))),
        _ => None,
    }
}

fn parse_coord(value: &Value) -> Option<Coord<f64>> {
    let pair = value.as_array()?;
    let x = pair.first()?.as_f64()?;
    let y = pair.get(1)?.as_f64()?;

    if x.is_finite() && y.is_finite() {
        Some(Coord { x, y })
    } else {
        None
    }
}

fn parse_coords(value: &Value) -> Option<Vec<Coord<f64>>> {
    value.as_array()?.iter().map(parse_coord).collect()
}

fn parse_rings(value: &Value) -> Option<Vec<LineString<f64>>> {
    value
        .as_array()?
        .iter()
        .map(|ring| parse_coords(ring).map(LineString::new))
        .collect()
}

fn parse_polygon(value: &Value) -> Option<Polygon<f64>> {
    let mut rings = parse_rings(value)?.into_iter();
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}
