//! TIA - Tiny Image Annotation
//!
//! The engine behind a browser tool for drawing line and polygon annotations
//! over an image, attaching key/value properties to them and exchanging them
//! as GeoJSON-like files.
//!
//! Annotations are kept in image pixel coordinates. The [`Viewport`] maps
//! between those and the scaled canvas, so resizing never changes stored
//! geometry. Hosts drive a [`Session`] with pointer events, draw it through
//! a [`Surface`] and listen for [`SessionEvent`]s.

mod config;
mod drawing;
mod error;
pub mod format;
mod hit_test;
mod model;
mod observer;
mod render;
mod session;
mod store;
mod viewport;

pub use config::{CONFIG_VERSION, ConfigError, DEFAULT_MAX_CANVAS, EngineConfig, LogLevel};
pub use drawing::{DUPLICATE_POINT_EPSILON, PathBuilder, PathKind};
pub use error::SessionError;
pub use format::{FormatError, ImportReport, LoadMode, SkippedRecord, ValidationError};
pub use hit_test::{DEFAULT_LINE_TOLERANCE, distance_to_segment, hit_test, point_in_ring};
pub use model::{
    Annotation, AnnotationSummary, Extent, Geometry, MIN_LINE_POINTS, MIN_RING_POINTS,
    NO_PROPERTIES_LABEL, Point, Properties, Rect, Tool, normalize_properties,
};
pub use observer::{Observers, SessionEvent, SubscriptionId};
pub use render::{
    Color, DrawCommand, PathStyle, RecordingSurface, RenderStyle, Stroke, Surface, render,
};
pub use session::{ImageTicket, LoadSummary, Session};
pub use store::AnnotationStore;
pub use viewport::{ImageSize, MIN_AVAILABLE_EXTENT, Viewport};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
