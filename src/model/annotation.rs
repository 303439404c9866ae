//! Annotation records, their properties and the drawing tools.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::geometry::Geometry;

/// Free-form key/value properties. Keys are unique; insertion order is kept
/// so list views and exports show properties the way they were entered.
pub type Properties = IndexMap<String, String>;

/// Placeholder shown by list views for an annotation without properties.
pub const NO_PROPERTIES_LABEL: &str = "No properties";

/// Tools the user can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Click annotations to select them.
    #[default]
    Select,
    /// Click vertices of an open polyline.
    Line,
    /// Click vertices of a closed polygon.
    Polygon,
}

impl Tool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Select => "Select",
            Tool::Line => "Line",
            Tool::Polygon => "Polygon",
        }
    }

    /// Get all available tools.
    pub fn all() -> &'static [Tool] {
        &[Tool::Select, Tool::Line, Tool::Polygon]
    }

    /// Whether this tool builds paths.
    pub fn is_drawing(&self) -> bool {
        !matches!(self, Tool::Select)
    }

    /// Parse the lowercase identifier used by hosts ("select", "line", "polygon").
    pub fn from_id(id: &str) -> Option<Tool> {
        match id {
            "select" => Some(Tool::Select),
            "line" => Some(Tool::Line),
            "polygon" => Some(Tool::Polygon),
            _ => None,
        }
    }
}

/// A single annotation: a geometry in image space plus its properties.
///
/// Field order matches the export format: `properties` first, then
/// `geometry`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub properties: Properties,
    pub geometry: Geometry,
}

impl Annotation {
    /// Create an annotation with no properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            properties: Properties::new(),
            geometry,
        }
    }

    /// Add a property, builder style.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// List label such as `Polygon #3` (`index` is zero-based).
    pub fn label(&self, index: usize) -> String {
        format!("{} #{}", self.geometry.type_name(), index + 1)
    }

    /// `key: value` lines for display, or the placeholder when there are none.
    pub fn property_lines(&self) -> Vec<String> {
        if self.properties.is_empty() {
            return vec![NO_PROPERTIES_LABEL.to_string()];
        }
        self.properties
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect()
    }
}

/// Normalize a property mapping: keys are trimmed and blank keys dropped.
/// Values are kept verbatim.
pub fn normalize_properties<I, K, V>(entries: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.as_ref().trim();
            (!key.is_empty()).then(|| (key.to_string(), value.into()))
        })
        .collect()
}

/// What a list view needs to show for one annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub index: usize,
    pub label: String,
    pub properties: Vec<String>,
    pub selected: bool,
}
