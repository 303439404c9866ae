//! Finding the annotation under the pointer.
//!
//! All comparisons happen in screen space so the line tolerance stays the
//! same number of on-screen pixels whatever the display scale is.

use crate::model::{Annotation, Geometry, Point};
use crate::viewport::Viewport;

/// Default distance (screen px) within which a click selects a line.
pub const DEFAULT_LINE_TOLERANCE: f64 = 5.0;

/// Return the index of the topmost annotation under `screen`.
///
/// Annotations are checked from the last inserted to the first, matching
/// the order they are drawn in.
pub fn hit_test(
    screen: Point,
    annotations: &[Annotation],
    viewport: &Viewport,
    tolerance: f64,
) -> Option<usize> {
    annotations
        .iter()
        .enumerate()
        .rev()
        .find(|(_, ann)| hits(&ann.geometry, screen, viewport, tolerance))
        .map(|(index, _)| index)
}

/// Whether `screen` lies on (line) or inside (polygon) a geometry.
pub fn hits(geometry: &Geometry, screen: Point, viewport: &Viewport, tolerance: f64) -> bool {
    let outline = viewport.path_to_screen(geometry.outline());
    match geometry {
        Geometry::LineString(_) => outline
            .windows(2)
            .any(|seg| distance_to_segment(screen, seg[0], seg[1]) < tolerance),
        Geometry::Polygon(_) => point_in_ring(screen, &outline),
    }
}

/// Distance from `p` to the segment `a`–`b`, projecting onto the segment and
/// clamping to its endpoints.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx * dx + dy * dy;

    if length_sq == 0.0 {
        return p.distance_to(&a);
    }

    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    let closest = Point::new(a.x + t * dx, a.y + t * dy);
    p.distance_to(&closest)
}

/// Even-odd point-in-polygon test (ray casting towards +x).
///
/// The half-open `y` comparison counts a vertex lying exactly on the ray
/// once, not twice.
pub fn point_in_ring(p: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let vi = ring[i];
        let vj = ring[j];

        if (vi.y > p.y) != (vj.y > p.y) && p.x < (vj.x - vi.x) * (p.y - vi.y) / (vj.y - vi.y) + vi.x {
            inside = !inside;
        }
        j = i;
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Extent;
    use crate::viewport::ImageSize;

    fn viewport(width: u32, height: u32) -> Viewport {
        Viewport::fit(
            ImageSize::new(width, height),
            Extent::new(800.0, 600.0),
            Extent::new(800.0, 600.0),
        )
        .unwrap()
    }

    fn square(x0: f64, y0: f64, size: f64) -> Annotation {
        Annotation::new(Geometry::polygon(vec![
            Point::new(x0, y0),
            Point::new(x0 + size, y0),
            Point::new(x0 + size, y0 + size),
            Point::new(x0, y0 + size),
        ]))
    }

    fn line(points: &[(f64, f64)]) -> Annotation {
        Annotation::new(Geometry::LineString(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        ))
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        // Perpendicular projection inside the segment.
        assert_eq!(distance_to_segment(Point::new(5.0, 3.0), a, b), 3.0);
        // Clamped to the endpoints.
        assert_eq!(distance_to_segment(Point::new(-3.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Point::new(13.0, 4.0), a, b), 5.0);
        // Zero-length segment.
        assert_eq!(distance_to_segment(Point::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_point_in_ring() {
        let ring = square(0.0, 0.0, 100.0).geometry.outline().to_vec();
        assert!(point_in_ring(Point::new(50.0, 50.0), &ring));
        assert!(!point_in_ring(Point::new(150.0, 50.0), &ring));
        assert!(!point_in_ring(Point::new(50.0, -1.0), &ring));
    }

    #[test]
    fn test_point_in_concave_ring() {
        // A "U" shape: the notch between the arms is outside.
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ];
        assert!(point_in_ring(Point::new(5.0, 20.0), &ring));
        assert!(point_in_ring(Point::new(25.0, 20.0), &ring));
        assert!(!point_in_ring(Point::new(15.0, 20.0), &ring));
    }

    #[test]
    fn test_ray_through_vertex_counts_once() {
        // The ray from (0, 5) to the right passes exactly through the
        // vertex (10, 5) of this diamond.
        let ring = vec![
            Point::new(5.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(5.0, 10.0),
            Point::new(0.0, 5.0),
        ];
        assert!(point_in_ring(Point::new(5.0, 5.0), &ring));
        assert!(!point_in_ring(Point::new(-1.0, 5.0), &ring));
        assert!(!point_in_ring(Point::new(11.0, 5.0), &ring));
    }

    #[test]
    fn test_degenerate_ring() {
        assert!(!point_in_ring(
            Point::new(0.0, 0.0),
            &[Point::new(-1.0, -1.0), Point::new(1.0, 1.0)]
        ));
    }

    #[test]
    fn test_line_tolerance() {
        let vp = viewport(400, 300);
        let anns = vec![line(&[(10.0, 10.0), (100.0, 10.0), (100.0, 100.0)])];
        assert_eq!(hit_test(Point::new(50.0, 14.0), &anns, &vp, 5.0), Some(0));
        assert_eq!(hit_test(Point::new(104.0, 60.0), &anns, &vp, 5.0), Some(0));
        assert_eq!(hit_test(Point::new(50.0, 16.0), &anns, &vp, 5.0), None);
        // Interior of an open line is not a hit.
        assert_eq!(hit_test(Point::new(60.0, 50.0), &anns, &vp, 5.0), None);
    }

    #[test]
    fn test_tolerance_is_in_screen_pixels() {
        // Image is shown at half size; the line sits at image y=100, which
        // is screen y=50.
        let vp = viewport(1600, 1200);
        assert_eq!(vp.scale(), 0.5);
        let anns = vec![line(&[(0.0, 100.0), (1000.0, 100.0)])];

        // 4 screen px away is a hit even though it is 8 image px away.
        assert_eq!(hit_test(Point::new(100.0, 54.0), &anns, &vp, 5.0), Some(0));
        // 6 screen px away misses.
        assert_eq!(hit_test(Point::new(100.0, 56.0), &anns, &vp, 5.0), None);
    }

    #[test]
    fn test_topmost_wins() {
        let vp = viewport(400, 300);
        let anns = vec![square(0.0, 0.0, 100.0), square(50.0, 50.0, 100.0)];
        assert_eq!(hit_test(Point::new(75.0, 75.0), &anns, &vp, 5.0), Some(1));
        assert_eq!(hit_test(Point::new(25.0, 25.0), &anns, &vp, 5.0), Some(0));
        assert_eq!(hit_test(Point::new(300.0, 250.0), &anns, &vp, 5.0), None);
    }

    #[test]
    fn test_line_over_polygon() {
        let vp = viewport(400, 300);
        let anns = vec![square(0.0, 0.0, 100.0), line(&[(0.0, 50.0), (100.0, 50.0)])];
        assert_eq!(hit_test(Point::new(50.0, 52.0), &anns, &vp, 5.0), Some(1));
        assert_eq!(hit_test(Point::new(50.0, 80.0), &anns, &vp, 5.0), Some(0));
    }

    #[test]
    fn test_empty() {
        let vp = viewport(400, 300);
        assert_eq!(hit_test(Point::new(1.0, 1.0), &[], &vp, 5.0), None);
    }
}
