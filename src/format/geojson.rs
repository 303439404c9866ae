//! GeoJSON-like annotation files.
//!
//! A file is a JSON array of records:
//!
//! ```json
//! [
//!   {
//!     "properties": { "name": "fence" },
//!     "geometry": { "type": "LineString", "coordinates": [[0, 0], [10, 5]] }
//!   }
//! ]
//! ```
//!
//! Import validates each record on its own: bad records are skipped and
//! reported, good ones are returned together so the caller can apply them
//! in one step. Export writes the same shape back, pretty-printed with
//! two-space indentation.

use serde_json::{Map, Value};

use crate::format::error::{FormatError, ValidationError};
use crate::model::{
    Annotation, Geometry, MIN_LINE_POINTS, MIN_RING_POINTS, Point, Properties, normalize_properties,
};

/// A record that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the record in the file's array
    pub index: usize,
    /// Why it was rejected
    pub error: ValidationError,
}

/// Outcome of a successful import: at least one valid annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Valid annotations, in file order
    pub annotations: Vec<Annotation>,
    /// Records that were rejected
    pub skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    /// Check if any records were skipped.
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Parse and validate an annotation file.
///
/// Fails when the text is not JSON, is not an array, or contains no valid
/// record. Nothing is returned partially: either a full report or an error.
pub fn parse_annotations(json: &str) -> Result<ImportReport, FormatError> {
    let value: Value = serde_json::from_str(json)?;
    collect_records(value)
}

/// [`parse_annotations`] for raw file bytes.
pub fn parse_annotations_bytes(bytes: &[u8]) -> Result<ImportReport, FormatError> {
    let value: Value = serde_json::from_slice(bytes)?;
    collect_records(value)
}

fn collect_records(value: Value) -> Result<ImportReport, FormatError> {
    let Value::Array(records) = value else {
        return Err(FormatError::NotAnArray);
    };

    let mut annotations = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();
    for (index, record) in records.iter().enumerate() {
        match validate_record(record) {
            Ok(annotation) => annotations.push(annotation),
            Err(error) => {
                log::warn!("Skipping invalid annotation {}: {}", index, error);
                skipped.push(SkippedRecord { index, error });
            }
        }
    }

    if annotations.is_empty() {
        return Err(FormatError::NoValidAnnotations {
            skipped: skipped.len(),
        });
    }

    log::info!(
        "Parsed {} annotations ({} skipped)",
        annotations.len(),
        skipped.len()
    );
    Ok(ImportReport {
        annotations,
        skipped,
    })
}

/// Validate one record and convert it into an [`Annotation`].
pub fn validate_record(record: &Value) -> Result<Annotation, ValidationError> {
    let record = record.as_object().ok_or(ValidationError::NotAnObject)?;

    let geometry = record
        .get("geometry")
        .and_then(Value::as_object)
        .ok_or(ValidationError::MissingGeometry)?;
    let geometry = parse_geometry(geometry)?;

    let properties = match record.get("properties") {
        None | Some(Value::Null) => Properties::new(),
        Some(Value::Object(map)) => parse_properties(map)?,
        Some(_) => return Err(ValidationError::PropertiesNotAnObject),
    };

    Ok(Annotation {
        properties,
        geometry,
    })
}

fn parse_geometry(geometry: &Map<String, Value>) -> Result<Geometry, ValidationError> {
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingType)?;
    let coordinates = match geometry.get("coordinates") {
        None | Some(Value::Null) => return Err(ValidationError::MissingCoordinates),
        Some(value) => value,
    };

    match kind {
        "LineString" => {
            let points = parse_points(coordinates, "LineString", MIN_LINE_POINTS)?;
            Ok(Geometry::LineString(points))
        }
        "Polygon" => {
            let rings = coordinates
                .as_array()
                .ok_or(ValidationError::CoordinatesNotAnArray)?;
            let outer = rings.first().ok_or(ValidationError::MissingRing)?;
            if rings.len() > 1 {
                log::debug!("Ignoring {} inner ring(s) of polygon", rings.len() - 1);
            }
            let ring = parse_points(outer, "Polygon", MIN_RING_POINTS)?;
            Ok(Geometry::polygon(ring))
        }
        other => Err(ValidationError::UnknownType(other.to_string())),
    }
}

fn parse_points(
    value: &Value,
    geometry: &'static str,
    min: usize,
) -> Result<Vec<Point>, ValidationError> {
    let items = value
        .as_array()
        .ok_or(ValidationError::CoordinatesNotAnArray)?;
    if items.len() < min {
        return Err(ValidationError::TooFewPoints {
            geometry,
            expected: min,
            found: items.len(),
        });
    }
    items
        .iter()
        .enumerate()
        .map(|(position, item)| {
            parse_pair(item).ok_or(ValidationError::MalformedCoordinate { position })
        })
        .collect()
}

fn parse_pair(value: &Value) -> Option<Point> {
    match value.as_array()?.as_slice() {
        [x, y] => Some(Point::new(x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

fn parse_properties(map: &Map<String, Value>) -> Result<Properties, ValidationError> {
    let entries = map
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(ValidationError::InvalidProperty { key: key.clone() });
                }
            };
            Ok((key.as_str(), text))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(normalize_properties(entries))
}

/// Serialize annotations as an indented JSON array.
pub fn export_annotations(annotations: &[Annotation]) -> Result<String, FormatError> {
    let json = serde_json::to_string_pretty(annotations)?;
    log::info!("Exported {} annotations", annotations.len());
    Ok(json)
}

/// [`export_annotations`] as UTF-8 bytes, ready to hand to a download.
pub fn export_to_bytes(annotations: &[Annotation]) -> Result<Vec<u8>, FormatError> {
    export_annotations(annotations).map(String::into_bytes)
}
