//! Error types for annotation import and export.

use thiserror::Error;

/// Errors that abort a whole import or export.
#[derive(Error, Debug)]
pub enum FormatError {
    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is valid JSON but not an array
    #[error("Invalid annotations file: must be an array of annotations")]
    NotAnArray,

    /// Every record failed validation (or there were none)
    #[error("No valid annotations found in file ({skipped} skipped)")]
    NoValidAnnotations {
        /// Number of records that were rejected
        skipped: usize,
    },
}

/// Why a single imported record was rejected. The record is skipped and the
/// rest of the file is still loaded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The record is not a JSON object
    #[error("record is not an object")]
    NotAnObject,

    /// No `geometry` object
    #[error("missing geometry")]
    MissingGeometry,

    /// No string `type` in the geometry
    #[error("geometry has no type")]
    MissingType,

    /// A `type` other than LineString or Polygon
    #[error("unsupported geometry type '{0}'")]
    UnknownType(String),

    /// No `coordinates` in the geometry
    #[error("geometry has no coordinates")]
    MissingCoordinates,

    /// `coordinates` (or a ring) is not an array
    #[error("coordinates must be an array")]
    CoordinatesNotAnArray,

    /// A polygon without rings
    #[error("polygon has no rings")]
    MissingRing,

    /// Fewer vertices than the geometry needs
    #[error("{geometry} needs at least {expected} points, found {found}")]
    TooFewPoints {
        /// Geometry type name
        geometry: &'static str,
        /// Minimum number of points
        expected: usize,
        /// Number of points present
        found: usize,
    },

    /// A vertex that is not a `[number, number]` pair
    #[error("coordinate {position} is not a pair of numbers")]
    MalformedCoordinate {
        /// Zero-based position of the vertex
        position: usize,
    },

    /// `properties` present but not an object
    #[error("properties must be an object")]
    PropertiesNotAnObject,

    /// A property whose value is an array, an object or null
    #[error("property '{key}' must be a string, number or boolean")]
    InvalidProperty {
        /// The offending key
        key: String,
    },
}
