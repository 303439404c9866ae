//! Annotation import and export.
//!
//! The only file format is a GeoJSON-like array of `{properties, geometry}`
//! records (see [`geojson`]). Import is all-or-nothing at the file level and
//! forgiving at the record level: invalid records are skipped and reported.
//!
//! ## Usage
//!
//! ```
//! use tia::format::{export_annotations, parse_annotations};
//!
//! let text = r#"[{"geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}]"#;
//! let report = parse_annotations(text)?;
//! assert_eq!(report.annotations.len(), 1);
//!
//! let out = export_annotations(&report.annotations)?;
//! assert_eq!(parse_annotations(&out)?.annotations, report.annotations);
//! # Ok::<(), tia::format::FormatError>(())
//! ```

mod error;
pub mod geojson;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

pub use error::{FormatError, ValidationError};
pub use geojson::{
    ImportReport, SkippedRecord, export_annotations, export_to_bytes, parse_annotations,
    parse_annotations_bytes, validate_record,
};

/// How imported annotations combine with the ones already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Discard existing annotations first
    #[default]
    Replace,
    /// Add after existing annotations
    Append,
}
