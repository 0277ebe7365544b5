//! Geometric Metrics
//!
//! Pure functions over one feature version's geometry. Absent or unusable
//! geometry yields 0 (or an empty set); one bad feature never aborts a row.
//!
//! Units follow `MetricSpace`:
//! - `Geodesic`: lengths in kilometres (haversine), areas in square metres
//! - `Planar`: coordinate units and coordinate units squared

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BoundingRect, ChamberlainDuquetteArea, Coord, CoordsIter, Distance, Euclidean,
    Geometry, Haversine, Line, LineString, Point, Polygon,
};

use crate::logic::changeset::FeatureVersion;
use crate::logic::config::MetricSpace;

const METRES_PER_KILOMETRE: f64 = 1000.0;

/// Digits kept by `line_length`
pub const LENGTH_DIGITS: i32 = 3;
/// Digits kept by areas, segment lengths and centroid distances
pub const AREA_DIGITS: i32 = 4;

fn geometry(v: Option<&FeatureVersion>) -> Option<&Geometry<f64>> {
    v.and_then(|v| v.geometry.as_ref())
}

// ============================================================================
// METRICS
// ============================================================================

/// Sum of segment lengths along every line / ring. Points have no length.
pub fn line_length(v: Option<&FeatureVersion>, metric: MetricSpace) -> f64 {
    let total = geometry(v).map_or(0.0, |g| {
        paths(g)
            .into_iter()
            .flat_map(|path| path.lines())
            .map(|line| segment_length(metric, line))
            .sum()
    });
    round_to(total, LENGTH_DIGITS)
}

/// Number of vertices. A version without geometry counts as one node.
pub fn node_count(v: Option<&FeatureVersion>) -> usize {
    geometry(v).map_or(1, |g| g.coords_count())
}

/// Points where a line or ring crosses itself or another ring of the same
/// feature. Segments sharing a vertex (neighbours, and the first/last
/// segment of a closed ring) are not compared.
pub fn self_intersections(v: Option<&FeatureVersion>) -> Vec<Point<f64>> {
    let Some(geometry) = geometry(v) else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    for (path_index, path) in paths(geometry).into_iter().enumerate() {
        let path_segments = path.0.len().saturating_sub(1);
        let closed = path.is_closed();
        for (index, line) in path.lines().enumerate() {
            segments.push(Segment { path: path_index, index, path_segments, closed, line });
        }
    }

    let mut kinks = Vec::new();
    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            if a.shares_vertex_with(b) {
                continue;
            }
            // Collinear overlaps are not crossings
            if let Some(LineIntersection::SinglePoint { intersection, .. }) = line_intersection(a.line, b.line) {
                kinks.push(Point::from(intersection));
            }
        }
    }
    kinks
}

/// Enclosed area of polygonal geometry, 0 for everything else
pub fn area(v: Option<&FeatureVersion>, metric: MetricSpace) -> f64 {
    let value = match geometry(v) {
        Some(Geometry::Polygon(p)) => polygon_area(metric, p),
        Some(Geometry::MultiPolygon(mp)) => mp.0.iter().map(|p| polygon_area(metric, p)).sum(),
        _ => 0.0,
    };
    round_to(value, AREA_DIGITS)
}

/// Area of the axis-aligned bounding rectangle
pub fn bbox_area(v: Option<&FeatureVersion>, metric: MetricSpace) -> f64 {
    let value = geometry(v)
        .and_then(|g| g.bounding_rect())
        .map_or(0.0, |rect| match metric {
            MetricSpace::Planar => rect.width() * rect.height(),
            MetricSpace::Geodesic => rect.to_polygon().chamberlain_duquette_unsigned_area(),
        });
    round_to(value, AREA_DIGITS)
}

/// Longest distance between consecutive vertices, 0 with fewer than two
pub fn longest_segment_length(v: Option<&FeatureVersion>, metric: MetricSpace) -> f64 {
    let longest = geometry(v).map_or(0.0, |g| {
        paths(g)
            .into_iter()
            .flat_map(|path| path.lines())
            .map(|line| segment_length(metric, line))
            .fold(0.0, f64::max)
    });
    round_to(longest, AREA_DIGITS)
}

/// Mean of all vertices, each ring's repeated closing vertex left out.
/// Unweighted: adding a vertex along a line moves it.
pub fn centroid(v: Option<&FeatureVersion>) -> Option<Point<f64>> {
    let vertices = vertices(geometry(v)?);
    if vertices.is_empty() {
        return None;
    }

    let count = vertices.len() as f64;
    let (sum_x, sum_y) = vertices
        .iter()
        .fold((0.0, 0.0), |(x, y), c| (x + c.x, y + c.y));
    Some(Point::new(sum_x / count, sum_y / count))
}

/// Distance between two points in the given metric
pub fn distance(metric: MetricSpace, a: Point<f64>, b: Point<f64>) -> f64 {
    match metric {
        MetricSpace::Geodesic => Haversine::distance(a, b) / METRES_PER_KILOMETRE,
        MetricSpace::Planar => Euclidean::distance(a, b),
    }
}

/// Round half away from zero; non-finite values collapse to 0
pub(crate) fn round_to(value: f64, digits: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(digits);
    let rounded = (value * factor).round() / factor;
    // no negative zero in the output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ============================================================================
// HELPERS
// ============================================================================

struct Segment {
    path: usize,
    index: usize,
    path_segments: usize,
    closed: bool,
    line: Line<f64>,
}

impl Segment {
    /// `other` must come after `self` in iteration order
    fn shares_vertex_with(&self, other: &Segment) -> bool {
        if self.path != other.path {
            return false;
        }
        other.index == self.index + 1
            || (self.closed && self.index == 0 && other.index + 1 == self.path_segments)
    }
}

/// Every line and ring of the geometry; points contribute none
fn paths(geometry: &Geometry<f64>) -> Vec<&LineString<f64>> {
    match geometry {
        Geometry::LineString(ls) => vec![ls],
        Geometry::MultiLineString(mls) => mls.0.iter().collect(),
        Geometry::Polygon(p) => rings(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().flat_map(rings).collect(),
        _ => Vec::new(),
    }
}

fn vertices(geometry: &Geometry<f64>) -> Vec<Coord<f64>> {
    match geometry {
        Geometry::Polygon(p) => open_ring_vertices(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().flat_map(open_ring_vertices).collect(),
        other => other.coords_iter().collect(),
    }
}

fn open_ring_vertices(polygon: &Polygon<f64>) -> Vec<Coord<f64>> {
    rings(polygon)
        .into_iter()
        .flat_map(|ring| {
            let len = ring.0.len();
            let keep = if ring.is_closed() && len > 1 { len - 1 } else { len };
            ring.0[..keep].iter().copied()
        })
        .collect()
}

fn rings(polygon: &Polygon<f64>) -> Vec<&LineString<f64>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .collect()
}

fn segment_length(metric: MetricSpace, line: Line<f64>) -> f64 {
    let (a, b) = line.points();
    distance(metric, a, b)
}

fn polygon_area(metric: MetricSpace, polygon: &Polygon<f64>) -> f64 {
    match metric {
        MetricSpace::Geodesic => polygon.chamberlain_duquette_unsigned_area(),
        MetricSpace::Planar => polygon.unsigned_area(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn with_geometry(geometry: Value) -> FeatureVersion {
        FeatureVersion::from_json(&json!({ "geometry": geometry, "properties": {} }))
    }

    fn line(coords: Value) -> FeatureVersion {
        with_geometry(json!({ "type": "LineString", "coordinates": coords }))
    }

    fn polygon(ring: Value) -> FeatureVersion {
        with_geometry(json!({ "type": "Polygon", "coordinates": [ring] }))
    }

    #[test]
    fn test_planar_line_length() {
        let v = line(json!([[0, 0], [3, 4], [6, 8]]));
        assert_eq!(line_length(Some(&v), MetricSpace::Planar), 10.0);
        assert_eq!(longest_segment_length(Some(&v), MetricSpace::Planar), 5.0);
        assert_eq!(node_count(Some(&v)), 3);
    }

    #[test]
    fn test_geodesic_line_length_in_kilometres() {
        // One degree of longitude on the equator
        let v = line(json!([[0, 0], [1, 0]]));
        let length = line_length(Some(&v), MetricSpace::Geodesic);
        assert!((length - 111.195).abs() < 0.01, "got {}", length);
    }

    #[test]
    fn test_degenerate_line() {
        let v = line(json!([[0, 0], [0, 0]]));
        assert_eq!(line_length(Some(&v), MetricSpace::Geodesic), 0.0);
        assert_eq!(longest_segment_length(Some(&v), MetricSpace::Geodesic), 0.0);
        assert!(self_intersections(Some(&v)).is_empty());
    }

    #[test]
    fn test_point_geometry() {
        let v = with_geometry(json!({ "type": "Point", "coordinates": [13.4, 52.5] }));
        assert_eq!(line_length(Some(&v), MetricSpace::Geodesic), 0.0);
        assert_eq!(area(Some(&v), MetricSpace::Geodesic), 0.0);
        assert_eq!(bbox_area(Some(&v), MetricSpace::Geodesic), 0.0);
        assert_eq!(node_count(Some(&v)), 1);
        assert!(self_intersections(Some(&v)).is_empty());
    }

    #[test]
    fn test_missing_geometry_defaults() {
        let v = FeatureVersion::default();
        for version in [None, Some(&v)] {
            assert_eq!(line_length(version, MetricSpace::Geodesic), 0.0);
            assert_eq!(node_count(version), 1);
            assert!(self_intersections(version).is_empty());
            assert_eq!(area(version, MetricSpace::Geodesic), 0.0);
            assert_eq!(bbox_area(version, MetricSpace::Geodesic), 0.0);
            assert_eq!(longest_segment_length(version, MetricSpace::Geodesic), 0.0);
            assert!(centroid(version).is_none());
        }
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        let bent = with_geometry(json!({ "type": "LineString", "coordinates": [[0, 0], [10, 0], [10, 1]] }));
        let c = centroid(Some(&bent)).unwrap();
        assert!((c.x() - 20.0 / 3.0).abs() < 1e-9);
        assert!((c.y() - 1.0 / 3.0).abs() < 1e-9);

        // Closing vertex of the ring is not counted twice
        let square = polygon(json!([[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]));
        assert_eq!(centroid(Some(&square)), Some(Point::new(1.0, 1.0)));

        let node = with_geometry(json!({ "type": "Point", "coordinates": [3, 4] }));
        assert_eq!(centroid(Some(&node)), Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_planar_area_and_bbox() {
        let square = polygon(json!([[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]));
        assert_eq!(area(Some(&square), MetricSpace::Planar), 4.0);
        assert_eq!(bbox_area(Some(&square), MetricSpace::Planar), 4.0);

        let triangle = polygon(json!([[0, 0], [4, 0], [0, 2], [0, 0]]));
        assert_eq!(area(Some(&triangle), MetricSpace::Planar), 4.0);
        assert_eq!(bbox_area(Some(&triangle), MetricSpace::Planar), 8.0);
    }

    #[test]
    fn test_geodesic_area_in_square_metres() {
        // ~12,391 km² for a one degree cell on the equator
        let cell = polygon(json!([[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]));
        let value = area(Some(&cell), MetricSpace::Geodesic);
        assert!(value > 1.2e10 && value < 1.3e10, "got {}", value);
    }

    #[test]
    fn test_line_has_no_area_but_has_bbox() {
        let v = line(json!([[0, 0], [2, 3]]));
        assert_eq!(area(Some(&v), MetricSpace::Planar), 0.0);
        assert_eq!(bbox_area(Some(&v), MetricSpace::Planar), 6.0);
    }

    #[test]
    fn test_self_intersections() {
        let bowtie = line(json!([[0, 0], [2, 2], [2, 0], [0, 2]]));
        let kinks = self_intersections(Some(&bowtie));
        assert_eq!(kinks.len(), 1);
        assert!((kinks[0].x() - 1.0).abs() < 1e-9 && (kinks[0].y() - 1.0).abs() < 1e-9);

        let closed_bowtie = polygon(json!([[0, 0], [2, 2], [2, 0], [0, 2], [0, 0]]));
        assert_eq!(self_intersections(Some(&closed_bowtie)).len(), 1);

        let square = polygon(json!([[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]));
        assert!(self_intersections(Some(&square)).is_empty());

        let open = line(json!([[0, 0], [1, 0], [2, 1]]));
        assert!(self_intersections(Some(&open)).is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(f64::NAN, 3), 0.0);
        assert_eq!(round_to(-0.00001, 3).to_string(), "0");
    }
}
