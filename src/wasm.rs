//! Browser bindings.
//!
//! [`WebSession`] wraps a [`Session`] for JavaScript hosts and
//! [`CanvasSurface`] draws it onto a 2D canvas context. Image decoding and
//! file pickers stay on the JavaScript side; only sizes, bytes and JSON text
//! cross the boundary.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::config::EngineConfig;
use crate::format::LoadMode;
use crate::model::{Extent, Point, Properties, Rect, Tool};
use crate::render::{Color, Stroke, Surface};
use crate::session::{ImageTicket, Session};
use crate::viewport::ImageSize;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    // The effective level is set per session from its config.
    if let Err(e) = console_log::init_with_level(log::Level::Trace) {
        web_sys::console::log_1(&format!("Logger already initialized: {}", e).into());
    }
}

/// A [`Surface`] backed by a canvas 2D context.
pub struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    image: Option<&'a HtmlImageElement>,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, image: Option<&'a HtmlImageElement>) -> Self {
        Self { ctx, image }
    }

    fn trace(&self, points: &[Point], closed: bool) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        if closed {
            self.ctx.close_path();
        }
    }
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self, area: Rect) {
        self.ctx.clear_rect(area.x, area.y, area.width, area.height);
    }

    fn draw_image(&mut self, dest: Rect) {
        let Some(image) = self.image else {
            return;
        };
        if let Err(e) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            dest.x,
            dest.y,
            dest.width,
            dest.height,
        ) {
            log::warn!("Failed to draw image: {:?}", e);
        }
    }

    fn stroke_path(&mut self, points: &[Point], closed: bool, stroke: &Stroke) {
        if points.len() < 2 {
            return;
        }
        let dash = match stroke.dash {
            Some([on, off]) => js_sys::Array::of2(&on.into(), &off.into()),
            None => js_sys::Array::new(),
        };
        if let Err(e) = self.ctx.set_line_dash(&dash) {
            log::warn!("Failed to set line dash: {:?}", e);
        }
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width);
        self.trace(points, closed);
        self.ctx.stroke();
    }

    fn fill_path(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_css());
        self.trace(points, true);
        self.ctx.fill();
    }
}

/// JavaScript-facing session.
#[wasm_bindgen]
pub struct WebSession {
    session: Session,
    next_request: u32,
    pending: HashMap<u32, ImageTicket>,
}

#[wasm_bindgen]
impl WebSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebSession {
        Self::from_session(Session::new())
    }

    /// Create a session from a JSON config document.
    pub fn with_config(json: &str) -> Result<WebSession, JsError> {
        let config = EngineConfig::from_json(json)?;
        Ok(Self::from_session(Session::with_config(config)))
    }

    fn from_session(session: Session) -> WebSession {
        session.config().apply_log_level();
        WebSession {
            session,
            next_request: 0,
            pending: HashMap::new(),
        }
    }

    // ---- image ----

    /// Load an image of known natural size. Returns the display scale.
    pub fn load_image(
        &mut self,
        width: u32,
        height: u32,
        available_width: f64,
        available_height: f64,
    ) -> Result<f64, JsError> {
        let extent = Extent::new(available_width, available_height);
        Ok(self
            .session
            .load_image(ImageSize::new(width, height), extent)?)
    }

    /// Start an image load; pass the returned id to `complete_image*`.
    pub fn request_image(&mut self) -> u32 {
        let id = self.next_request;
        self.next_request = self.next_request.wrapping_add(1);
        self.pending.insert(id, self.session.request_image());
        id
    }

    /// Finish a load of known size. Returns `false` if a newer load already
    /// won.
    pub fn complete_image(
        &mut self,
        request: u32,
        width: u32,
        height: u32,
        available_width: f64,
        available_height: f64,
    ) -> Result<bool, JsError> {
        let Some(ticket) = self.pending.remove(&request) else {
            log::warn!("Unknown image request {}", request);
            return Ok(false);
        };
        let extent = Extent::new(available_width, available_height);
        let size = ImageSize::new(width, height);
        Ok(self.session.complete_image(ticket, size, extent)?.is_some())
    }

    /// Finish a load from encoded bytes.
    pub fn complete_image_bytes(
        &mut self,
        request: u32,
        bytes: &[u8],
        available_width: f64,
        available_height: f64,
    ) -> Result<bool, JsError> {
        let Some(ticket) = self.pending.remove(&request) else {
            log::warn!("Unknown image request {}", request);
            return Ok(false);
        };
        let extent = Extent::new(available_width, available_height);
        Ok(self
            .session
            .complete_image_bytes(ticket, bytes, extent)?
            .is_some())
    }

    pub fn resize(&mut self, available_width: f64, available_height: f64) -> Option<f64> {
        self.session
            .resize(Extent::new(available_width, available_height))
    }

    pub fn scale(&self) -> f64 {
        self.session.display_scale()
    }

    pub fn canvas_width(&self) -> f64 {
        self.canvas_size().width
    }

    pub fn canvas_height(&self) -> f64 {
        self.canvas_size().height
    }

    fn canvas_size(&self) -> Extent {
        self.session
            .viewport()
            .map_or(self.session.config().max_canvas, |v| v.canvas_size())
    }

    // ---- tools and pointer ----

    /// Switch tool by id: `select`, `line` or `polygon`.
    pub fn set_tool(&mut self, id: &str) -> Result<(), JsError> {
        let tool = Tool::from_id(id).ok_or_else(|| JsError::new(&format!("Unknown tool: {}", id)))?;
        self.session.set_tool(tool);
        Ok(())
    }

    pub fn tool(&self) -> String {
        self.session.tool().name().to_lowercase()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_down(Point::new(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.session.pointer_move(Point::new(x, y));
    }

    pub fn pointer_leave(&mut self) {
        self.session.pointer_leave();
    }

    /// Commit the path on double-click.
    pub fn finish_path(&mut self) -> Option<usize> {
        self.session.finish_path()
    }

    pub fn cancel_path(&mut self) -> bool {
        self.session.cancel_path()
    }

    // ---- annotations ----

    pub fn select(&mut self, index: Option<usize>) -> Result<(), JsError> {
        Ok(self.session.select(index)?)
    }

    pub fn selected(&self) -> Option<usize> {
        self.session.selected()
    }

    pub fn remove(&mut self, index: usize) -> Result<(), JsError> {
        self.session.remove(index)?;
        Ok(())
    }

    pub fn set_property(&mut self, index: usize, key: &str, value: &str) -> Result<(), JsError> {
        Ok(self.session.set_property(index, key, value)?)
    }

    pub fn remove_property(&mut self, index: usize, key: &str) -> Result<Option<String>, JsError> {
        Ok(self.session.remove_property(index, key)?)
    }

    /// Replace all properties from a JSON object of strings.
    pub fn set_properties_json(&mut self, index: usize, json: &str) -> Result<(), JsError> {
        let properties: Properties = serde_json::from_str(json)?;
        Ok(self.session.set_properties(index, properties)?)
    }

    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// List entries as a JSON array of `{index, label, properties, selected}`.
    pub fn summaries_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.session.summaries())?)
    }

    /// Load an annotation file. Returns the number of annotations loaded.
    pub fn import_json(&mut self, text: &str, append: bool) -> Result<usize, JsError> {
        let mode = if append {
            LoadMode::Append
        } else {
            LoadMode::Replace
        };
        Ok(self.session.import_json(text, mode)?.loaded)
    }

    pub fn export_json(&self) -> Result<String, JsError> {
        Ok(self.session.export_json()?)
    }

    // ---- events and drawing ----

    /// Call `callback` with each change event serialized as JSON.
    pub fn subscribe(&mut self, callback: js_sys::Function) {
        self.session.subscribe(move |event| {
            let json = match serde_json::to_string(event) {
                Ok(json) => json,
                Err(e) => {
                    log::warn!("Failed to serialize event: {}", e);
                    return;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("Event handler threw: {:?}", e);
            }
        });
    }

    pub fn needs_redraw(&self) -> bool {
        self.session.needs_redraw()
    }

    pub fn render(&mut self, ctx: &CanvasRenderingContext2d, image: Option<HtmlImageElement>) {
        let mut surface = CanvasSurface::new(ctx, image.as_ref());
        self.session.render(&mut surface);
    }
}

impl Default for WebSession {
    fn default() -> Self {
        Self::new()
    }
}
