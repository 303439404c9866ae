//! Data model: geometry primitives and annotation records.

mod annotation;
mod geometry;

pub use annotation::{
    Annotation, AnnotationSummary, NO_PROPERTIES_LABEL, Properties, Tool, normalize_properties,
};
pub use geometry::{Extent, Geometry, MIN_LINE_POINTS, MIN_RING_POINTS, Point, Rect};
