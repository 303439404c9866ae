//! Click-by-click construction of lines and polygons.
//!
//! A path is either idle or accumulating points. Points arrive in screen
//! space and are converted to image space immediately, so nothing stored
//! here depends on the display scale at the time of the click.

use crate::model::{Geometry, MIN_LINE_POINTS, MIN_RING_POINTS, Point, Properties, Tool};
use crate::store::AnnotationStore;
use crate::viewport::Viewport;

/// Distance (image px) under which a click repeats the previous vertex.
pub const DUPLICATE_POINT_EPSILON: f64 = 1e-9;

/// What kind of shape a path turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Line,
    Polygon,
}

impl PathKind {
    /// The path kind a tool draws, if it draws at all.
    pub fn for_tool(tool: Tool) -> Option<PathKind> {
        match tool {
            Tool::Select => None,
            Tool::Line => Some(PathKind::Line),
            Tool::Polygon => Some(PathKind::Polygon),
        }
    }

    /// Vertices needed before the path can be committed.
    pub fn min_points(&self) -> usize {
        match self {
            PathKind::Line => MIN_LINE_POINTS,
            PathKind::Polygon => MIN_RING_POINTS,
        }
    }

    fn into_geometry(self, points: Vec<Point>) -> Geometry {
        match self {
            PathKind::Line => Geometry::LineString(points),
            PathKind::Polygon => Geometry::polygon(points),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Accumulating {
    kind: PathKind,
    points: Vec<Point>,
}

/// State of the path being drawn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathBuilder {
    active: Option<Accumulating>,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a path is mid-construction.
    pub fn is_accumulating(&self) -> bool {
        self.active.is_some()
    }

    /// Kind of the path being drawn.
    pub fn kind(&self) -> Option<PathKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Accumulated vertices in image space (empty when idle).
    pub fn points(&self) -> &[Point] {
        self.active.as_ref().map_or(&[][..], |a| a.points.as_slice())
    }

    /// Begin a new path at `screen`. Returns `false` (and does nothing) if a
    /// path is already being drawn.
    pub fn start(&mut self, kind: PathKind, screen: Point, viewport: &Viewport) -> bool {
        if self.active.is_some() {
            log::debug!("Ignoring start: a {:?} path is already in progress", self.kind());
            return false;
        }
        if !screen.is_finite() {
            log::debug!("Ignoring start at non-finite point {:?}", screen);
            return false;
        }
        self.active = Some(Accumulating {
            kind,
            points: vec![viewport.to_image(screen)],
        });
        true
    }

    /// Append a vertex. Returns `false` when idle, when the point is not
    /// finite, or when it repeats the previous vertex (the second press of a
    /// double-click).
    pub fn add_point(&mut self, screen: Point, viewport: &Viewport) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };
        if !screen.is_finite() {
            log::debug!("Ignoring non-finite point {:?}", screen);
            return false;
        }
        let point = viewport.to_image(screen);
        if let Some(last) = active.points.last() {
            if last.distance_to(&point) <= DUPLICATE_POINT_EPSILON {
                return false;
            }
        }
        active.points.push(point);
        true
    }

    /// Start a path of `kind` or extend the current one, whichever applies.
    pub fn click(&mut self, kind: PathKind, screen: Point, viewport: &Viewport) -> bool {
        if self.active.is_some() {
            self.add_point(screen, viewport)
        } else {
            self.start(kind, screen, viewport)
        }
    }

    /// The path as it would look with the pointer at `screen` appended, in
    /// image space. Nothing is stored.
    pub fn preview(&self, screen: Point, viewport: &Viewport) -> Option<Vec<Point>> {
        let active = self.active.as_ref()?;
        let mut points = active.points.clone();
        points.push(viewport.to_image(screen));
        Some(points)
    }

    /// Whether [`commit`](Self::commit) would succeed right now.
    pub fn can_commit(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.points.len() >= a.kind.min_points())
    }

    /// Finish the path into a new annotation with no properties and return
    /// its index. With too few points nothing happens and the path stays
    /// open.
    pub fn commit(&mut self, store: &mut AnnotationStore) -> Option<usize> {
        if !self.can_commit() {
            log::debug!(
                "Not enough points to commit: have {}, need {}",
                self.points().len(),
                self.kind().map_or(0, |k| k.min_points())
            );
            return None;
        }
        let Accumulating { kind, points } = self.active.take()?;
        let count = points.len();
        let index = store.add(kind.into_geometry(points), Properties::new());
        log::debug!("Committed {:?} with {} points as annotation {}", kind, count, index);
        Some(index)
    }

    /// Discard the path. Returns whether anything was discarded.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Extent;
    use crate::viewport::ImageSize;

    fn viewport(scale_down: u32) -> Viewport {
        // An 800x600 canvas showing an image `scale_down` times larger.
        Viewport::fit(
            ImageSize::new(800 * scale_down, 600 * scale_down),
            Extent::new(800.0, 600.0),
            Extent::new(800.0, 600.0),
        )
        .unwrap()
    }

    #[test]
    fn test_points_are_stored_in_image_space() {
        let vp = viewport(2);
        let mut path = PathBuilder::new();
        assert!(path.start(PathKind::Line, Point::new(10.0, 20.0), &vp));
        assert!(path.add_point(Point::new(30.0, 40.0), &vp));
        assert_eq!(path.points(), &[Point::new(20.0, 40.0), Point::new(60.0, 80.0)]);
    }

    #[test]
    fn test_add_point_requires_accumulating() {
        let vp = viewport(1);
        let mut path = PathBuilder::new();
        assert!(!path.add_point(Point::new(1.0, 1.0), &vp));
        assert!(!path.is_accumulating());
    }

    #[test]
    fn test_start_while_accumulating_is_ignored() {
        let vp = viewport(1);
        let mut path = PathBuilder::new();
        path.start(PathKind::Polygon, Point::new(1.0, 1.0), &vp);
        assert!(!path.start(PathKind::Line, Point::new(5.0, 5.0), &vp));
        assert_eq!(path.kind(), Some(PathKind::Polygon));
        assert_eq!(path.points().len(), 1);
    }

    #[test]
    fn test_duplicate_click_is_ignored() {
        let vp = viewport(1);
        let mut path = PathBuilder::new();
        path.click(PathKind::Line, Point::new(1.0, 1.0), &vp);
        path.click(PathKind::Line, Point::new(4.0, 5.0), &vp);
        assert!(!path.click(PathKind::Line, Point::new(4.0, 5.0), &vp));
        assert_eq!(path.points().len(), 2);
    }

    #[test]
    fn test_non_finite_points_are_rejected() {
        let vp = viewport(1);
        let mut path = PathBuilder::new();
        assert!(!path.start(PathKind::Polygon, Point::new(f64::NAN, 0.0), &vp));
        assert!(!path.is_accumulating());

        path.start(PathKind::Polygon, Point::new(1.0, 1.0), &vp);
        assert!(!path.add_point(Point::new(2.0, f64::INFINITY), &vp));
        assert!(!path.click(PathKind::Polygon, Point::new(f64::NAN, f64::NAN), &vp));
        assert_eq!(path.points(), &[Point::new(1.0, 1.0)]);
    }

    #[test]
    fn test_line_commit_threshold() {
        let vp = viewport(1);
        let mut store = AnnotationStore::new();
        let mut path = PathBuilder::new();

        path.start(PathKind::Line, Point::new(0.0, 0.0), &vp);
        assert_eq!(path.commit(&mut store), None);
        assert!(path.is_accumulating());
        assert!(store.is_empty());

        path.add_point(Point::new(10.0, 0.0), &vp);
        assert_eq!(path.commit(&mut store), Some(0));
        assert!(!path.is_accumulating());
        assert_eq!(
            store.get(0).unwrap().geometry,
            Geometry::LineString(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)])
        );
        assert!(store.get(0).unwrap().properties.is_empty());
    }

    #[test]
    fn test_polygon_commit_threshold() {
        let vp = viewport(1);
        let mut store = AnnotationStore::new();
        let mut path = PathBuilder::new();

        path.start(PathKind::Polygon, Point::new(0.0, 0.0), &vp);
        path.add_point(Point::new(10.0, 0.0), &vp);
        assert_eq!(path.commit(&mut store), None);
        assert_eq!(path.points().len(), 2);

        path.add_point(Point::new(5.0, 8.0), &vp);
        assert_eq!(path.commit(&mut store), Some(0));
        match &store.get(0).unwrap().geometry {
            Geometry::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 3);
            }
            other => panic!("Expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_commit_when_idle() {
        let mut store = AnnotationStore::new();
        let mut path = PathBuilder::new();
        assert_eq!(path.commit(&mut store), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let vp = viewport(2);
        let mut path = PathBuilder::new();
        assert_eq!(path.preview(Point::new(1.0, 1.0), &vp), None);

        path.start(PathKind::Line, Point::new(0.0, 0.0), &vp);
        let preview = path.preview(Point::new(5.0, 5.0), &vp).unwrap();
        assert_eq!(preview, vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)]);
        assert_eq!(path.points().len(), 1);
    }

    #[test]
    fn test_cancel() {
        let vp = viewport(1);
        let mut path = PathBuilder::new();
        assert!(!path.cancel());
        path.start(PathKind::Polygon, Point::new(0.0, 0.0), &vp);
        assert!(path.cancel());
        assert!(!path.is_accumulating());
        assert!(path.points().is_empty());
    }

    #[test]
    fn test_kind_for_tool() {
        assert_eq!(PathKind::for_tool(Tool::Select), None);
        assert_eq!(PathKind::for_tool(Tool::Line), Some(PathKind::Line));
        assert_eq!(PathKind::for_tool(Tool::Polygon), Some(PathKind::Polygon));
    }
}
