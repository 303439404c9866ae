//! Geometry primitives shared by every part of the engine.
//!
//! Coordinates are `f64` so that values read from an import file survive an
//! export unchanged.

use serde::{Deserialize, Serialize};

/// Minimum number of vertices for a line string.
pub const MIN_LINE_POINTS: usize = 2;

/// Minimum number of vertices for a polygon ring.
pub const MIN_RING_POINTS: usize = 3;

/// A 2D point.
///
/// The same type is used in screen space and in image space; the
/// [`Viewport`](crate::Viewport) is the only place that converts between
/// the two. Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Multiply both components by `factor`.
    pub fn scaled(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle, used for the background image placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle anchored at the origin.
    pub fn from_extent(extent: Extent) -> Self {
        Self::new(0.0, 0.0, extent.width, extent.height)
    }
}

/// Annotation geometry, serialized the way GeoJSON does it:
/// `{"type": "LineString", "coordinates": [[x, y], ...]}` or
/// `{"type": "Polygon", "coordinates": [[[x, y], ...]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// An open polyline with at least two vertices.
    LineString(Vec<Point>),
    /// A polygon with exactly one implicitly closed ring of at least three
    /// vertices.
    Polygon(Vec<Vec<Point>>),
}

impl Geometry {
    /// Build a polygon from a single ring.
    pub fn polygon(ring: Vec<Point>) -> Self {
        Geometry::Polygon(vec![ring])
    }

    /// The GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
        }
    }

    /// The vertices that get drawn and hit-tested: the line itself, or the
    /// outer ring of a polygon.
    pub fn outline(&self) -> &[Point] {
        match self {
            Geometry::LineString(points) => points,
            Geometry::Polygon(rings) => rings.first().map_or(&[][..], Vec::as_slice),
        }
    }

    /// Whether the outline is a closed ring.
    pub fn is_closed(&self) -> bool {
        matches!(self, Geometry::Polygon(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(1.5, -2.0)).unwrap();
        assert_eq!(json, "[1.5,-2.0]");
    }

    #[test]
    fn test_geometry_wire_shape() {
        let line = Geometry::LineString(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]})
        );

        let poly = Geometry::polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        let value = serde_json::to_value(&poly).unwrap();
        assert_eq!(value["type"], "Polygon");
        assert_eq!(value["coordinates"][0][2], serde_json::json!([0.0, 1.0]));
    }

    #[test]
    fn test_outline() {
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(0.0, 4.0),
        ];
        let poly = Geometry::polygon(ring.clone());
        assert_eq!(poly.outline(), ring.as_slice());
        assert!(poly.is_closed());
        assert!(!Geometry::LineString(ring).is_closed());
    }
}
