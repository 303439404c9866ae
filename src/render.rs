//! Drawing the session onto a 2D surface.
//!
//! [`render`] is a pure function of the session: it clears the canvas,
//! draws the background image, every annotation in insertion order (the
//! selected one highlighted) and finally the path being drawn together with
//! a dashed preview towards the pointer. Hosts call it after every change;
//! there is no diffing.

use serde::{Deserialize, Serialize};

use crate::drawing::PathKind;
use crate::model::{Geometry, Point, Rect};
use crate::session::Session;

/// RGBA color with 8-bit channels and a float alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS color string: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

/// How one kind of path is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathStyle {
    pub stroke: Color,
    pub width: f64,
    /// Fill for closed paths.
    pub fill: Color,
}

impl PathStyle {
    fn stroke(&self) -> Stroke {
        Stroke {
            color: self.stroke,
            width: self.width,
            dash: None,
        }
    }
}

/// Styles for every element the render loop draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub normal: PathStyle,
    pub selected: PathStyle,
    /// The path being drawn.
    pub drawing: PathStyle,
    /// Dash pattern (on, off) of the pointer preview.
    pub preview_dash: [f64; 2],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            normal: PathStyle {
                stroke: Color::RED,
                width: 2.0,
                fill: Color::RED.with_alpha(0.3),
            },
            selected: PathStyle {
                stroke: Color::GREEN,
                width: 3.0,
                fill: Color::GREEN.with_alpha(0.5),
            },
            drawing: PathStyle {
                stroke: Color::GREEN,
                width: 2.0,
                fill: Color::GREEN.with_alpha(0.3),
            },
            preview_dash: [5.0, 5.0],
        }
    }
}

/// Stroke parameters for one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Dash pattern (on, off); `None` for a solid line.
    pub dash: Option<[f64; 2]>,
}

/// The drawing primitives the render loop needs.
///
/// All coordinates are in screen space.
pub trait Surface {
    /// Clear the given area.
    fn clear(&mut self, area: Rect);

    /// Draw the background image stretched into `dest`.
    fn draw_image(&mut self, dest: Rect);

    /// Stroke a polyline, closing it back to the first point if `closed`.
    fn stroke_path(&mut self, points: &[Point], closed: bool, stroke: &Stroke);

    /// Fill the closed path through `points`.
    fn fill_path(&mut self, points: &[Point], color: Color);
}

/// Redraw the whole session onto `surface`.
pub fn render<S: Surface + ?Sized>(session: &Session, surface: &mut S) {
    let style = &session.config().style;
    // Without an image everything is drawn at scale 1.
    let to_screen = |points: &[Point]| -> Vec<Point> {
        match session.viewport() {
            Some(viewport) => viewport.path_to_screen(points),
            None => points.to_vec(),
        }
    };

    match session.viewport() {
        Some(viewport) => {
            let rect = viewport.canvas_rect();
            surface.clear(rect);
            surface.draw_image(rect);
        }
        None => surface.clear(Rect::from_extent(session.config().max_canvas)),
    }

    let selected = session.selected();
    for (index, annotation) in session.annotations().iter().enumerate() {
        let path_style = if selected == Some(index) {
            &style.selected
        } else {
            &style.normal
        };
        let points = to_screen(annotation.geometry.outline());
        match annotation.geometry {
            Geometry::LineString(_) => surface.stroke_path(&points, false, &path_style.stroke()),
            Geometry::Polygon(_) => {
                surface.fill_path(&points, path_style.fill);
                surface.stroke_path(&points, true, &path_style.stroke());
            }
        }
    }

    let path = session.path();
    let Some(kind) = path.kind() else {
        return;
    };

    let points = to_screen(path.points());
    if kind == PathKind::Polygon && points.len() >= 3 {
        surface.fill_path(&points, style.drawing.fill);
    }
    surface.stroke_path(&points, false, &style.drawing.stroke());

    let preview = session.pointer().and_then(|pointer| {
        session
            .viewport()
            .and_then(|viewport| path.preview(pointer, viewport))
    });
    if let Some(preview) = preview {
        let preview = to_screen(&preview);
        // A line previews only its next segment; a polygon previews the
        // whole outline through the pointer.
        let shown = match kind {
            PathKind::Line => &preview[preview.len().saturating_sub(2)..],
            PathKind::Polygon => &preview[..],
        };
        let dashed = Stroke {
            dash: Some(style.preview_dash),
            ..style.drawing.stroke()
        };
        surface.stroke_path(shown, false, &dashed);
    }
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rect),
    Image(Rect),
    Stroke {
        points: Vec<Point>,
        closed: bool,
        stroke: Stroke,
    },
    Fill {
        points: Vec<Point>,
        color: Color,
    },
}

/// A [`Surface`] that records calls instead of drawing, for headless hosts
/// and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stroke commands only.
    pub fn strokes(&self) -> impl Iterator<Item = (&[Point], bool, &Stroke)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Stroke {
                points,
                closed,
                stroke,
            } => Some((points.as_slice(), *closed, stroke)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, area: Rect) {
        self.commands.push(DrawCommand::Clear(area));
    }

    fn draw_image(&mut self, dest: Rect) {
        self.commands.push(DrawCommand::Image(dest));
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, stroke: &Stroke) {
        self.commands.push(DrawCommand::Stroke {
            points: points.to_vec(),
            closed,
            stroke: *stroke,
        });
    }

    fn fill_path(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::Fill {
            points: points.to_vec(),
            color,
        });
    }
}
