//! The annotation session: all state for one image and the operations a
//! host UI calls.
//!
//! A [`Session`] is an ordinary value owned by the host. Every mutating
//! operation runs to completion, leaves the session consistent, marks it as
//! needing a redraw and notifies subscribers with a [`SessionEvent`].
//! Failing operations leave the session untouched and are logged.
//!
//! # Examples
//!
//! ```
//! use tia::{Extent, ImageSize, Point, RecordingSurface, Session, Tool};
//!
//! let mut session = Session::new();
//! session.load_image(ImageSize::new(400, 300), Extent::new(800.0, 600.0))?;
//!
//! session.set_tool(Tool::Polygon);
//! for (x, y) in [(100.0, 100.0), (200.0, 100.0), (150.0, 200.0)] {
//!     session.pointer_down(Point::new(x, y));
//! }
//! assert_eq!(session.finish_path(), Some(0));
//!
//! let mut surface = RecordingSurface::new();
//! session.render(&mut surface);
//! assert!(!session.needs_redraw());
//! # Ok::<(), tia::SessionError>(())
//! ```

use std::io::Cursor;

use crate::config::EngineConfig;
use crate::drawing::{PathBuilder, PathKind};
use crate::error::SessionError;
use crate::format::{self, ImportReport, LoadMode, SkippedRecord};
use crate::hit_test::hit_test;
use crate::model::{Annotation, AnnotationSummary, Extent, Point, Properties, Tool};
use crate::observer::{Observers, SessionEvent, SubscriptionId};
use crate::render::{self, Surface};
use crate::store::AnnotationStore;
use crate::viewport::{ImageSize, Viewport};

/// Identifies one asynchronous image load. Later requests get larger
/// tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageTicket(u64);

/// Result of applying an annotation file.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    /// How the annotations were combined with existing ones
    pub mode: LoadMode,
    /// Number of annotations added
    pub loaded: usize,
    /// Records that failed validation
    pub skipped: Vec<SkippedRecord>,
}

/// State of one annotation session.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    store: AnnotationStore,
    viewport: Option<Viewport>,
    tool: Tool,
    path: PathBuilder,
    pointer: Option<Point>,
    next_ticket: u64,
    applied_ticket: Option<ImageTicket>,
    observers: Observers<SessionEvent>,
    dirty: bool,
}

impl Session {
    /// Create a session with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a session with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            store: AnnotationStore::new(),
            viewport: None,
            tool: Tool::default(),
            path: PathBuilder::new(),
            pointer: None,
            next_ticket: 0,
            applied_ticket: None,
            observers: Observers::new(),
            // Start dirty so the first frame gets drawn
            dirty: true,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Image and viewport
    // ========================================================================

    /// Accept a decoded image of `size` and fit it into `available`.
    /// Returns the new display scale.
    ///
    /// A zero-sized image is rejected and the previous image stays. Any path
    /// being drawn is cancelled; annotations are kept. Loads requested
    /// earlier with [`request_image`](Self::request_image) and still pending
    /// are dropped when they complete.
    pub fn load_image(&mut self, size: ImageSize, available: Extent) -> Result<f64, SessionError> {
        let ticket = self.request_image();
        self.apply_image(ticket, size, available)
    }

    fn apply_image(
        &mut self,
        ticket: ImageTicket,
        size: ImageSize,
        available: Extent,
    ) -> Result<f64, SessionError> {
        let viewport = Viewport::fit(size, available, self.config.max_canvas)
            .inspect_err(|e| log::warn!("Rejected image: {}", e))?;

        self.viewport = Some(viewport);
        self.applied_ticket = Some(ticket);
        self.path.cancel();
        let scale = viewport.scale();
        log::info!(
            "Loaded {}x{} image at scale {:.4}",
            size.width,
            size.height,
            scale
        );
        self.emit(SessionEvent::ImageLoaded {
            width: size.width,
            height: size.height,
            scale,
        });
        Ok(scale)
    }

    /// Read the natural size from encoded image bytes and load it.
    pub fn load_image_bytes(&mut self, bytes: &[u8], available: Extent) -> Result<f64, SessionError> {
        let size = decode_size(bytes).inspect_err(|e| log::warn!("Could not read image: {}", e))?;
        self.load_image(size, available)
    }

    /// Register the start of an asynchronous image load.
    pub fn request_image(&mut self) -> ImageTicket {
        let ticket = ImageTicket(self.next_ticket);
        self.next_ticket += 1;
        log::debug!("Issued image ticket {:?}", ticket);
        ticket
    }

    /// Complete an asynchronous load started with [`request_image`].
    ///
    /// If a newer request has already been applied the result is dropped
    /// and `Ok(None)` is returned, so the most recent upload always wins.
    ///
    /// [`request_image`]: Self::request_image
    pub fn complete_image(
        &mut self,
        ticket: ImageTicket,
        size: ImageSize,
        available: Extent,
    ) -> Result<Option<f64>, SessionError> {
        if self.is_stale(ticket) {
            return Ok(None);
        }
        self.apply_image(ticket, size, available).map(Some)
    }

    /// [`complete_image`](Self::complete_image) for encoded image bytes.
    pub fn complete_image_bytes(
        &mut self,
        ticket: ImageTicket,
        bytes: &[u8],
        available: Extent,
    ) -> Result<Option<f64>, SessionError> {
        if self.is_stale(ticket) {
            return Ok(None);
        }
        let size = decode_size(bytes).inspect_err(|e| log::warn!("Could not read image: {}", e))?;
        self.complete_image(ticket, size, available)
    }

    fn is_stale(&self, ticket: ImageTicket) -> bool {
        let stale = self.applied_ticket.is_some_and(|applied| ticket < applied);
        if stale {
            log::debug!(
                "Dropping image load {:?}: {:?} already applied",
                ticket,
                self.applied_ticket
            );
        }
        stale
    }

    /// Refit the image after the container changed size. Returns the new
    /// scale, or `None` when no image is loaded. Stored annotations are not
    /// touched.
    pub fn resize(&mut self, available: Extent) -> Option<f64> {
        let viewport = self.viewport.as_mut()?;
        let scale = viewport.resize(available, self.config.max_canvas);
        self.emit(SessionEvent::Resized { scale });
        Some(scale)
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.viewport.is_some()
    }

    /// Current display scale, `1.0` before any image is loaded.
    pub fn display_scale(&self) -> f64 {
        self.viewport.map_or(1.0, |v| v.scale())
    }

    // ========================================================================
    // Tools and pointer input
    // ========================================================================

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. Any path being drawn is discarded.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.path.cancel() {
            log::debug!("Tool switch cancelled the path in progress");
        }
        self.tool = tool;
        self.emit(SessionEvent::ToolChanged { tool });
    }

    /// Primary button press at `screen`.
    ///
    /// With the select tool this selects the topmost annotation under the
    /// pointer, or clears the selection. With a drawing tool it clears the
    /// selection and starts or extends the path. Ignored (returns `false`)
    /// until an image is loaded, and for non-finite positions.
    pub fn pointer_down(&mut self, screen: Point) -> bool {
        let Some(viewport) = self.viewport else {
            log::debug!("Ignoring pointer down: no image loaded");
            return false;
        };
        if !screen.is_finite() {
            log::debug!("Ignoring pointer down at {:?}", screen);
            return false;
        }

        match PathKind::for_tool(self.tool) {
            None => {
                let hit = hit_test(
                    screen,
                    self.store.as_slice(),
                    &viewport,
                    self.config.hit_tolerance,
                );
                self.set_selection(hit);
            }
            Some(kind) => {
                self.set_selection(None);
                if self.path.click(kind, screen, &viewport) {
                    self.emit(SessionEvent::PathChanged);
                }
            }
        }
        true
    }

    /// Pointer moved to `screen`. Used for the drawing preview.
    pub fn pointer_move(&mut self, screen: Point) {
        if !screen.is_finite() {
            log::debug!("Ignoring pointer move to {:?}", screen);
            return;
        }
        self.pointer = Some(screen);
        if self.path.is_accumulating() {
            self.emit(SessionEvent::PathChanged);
        }
    }

    /// Pointer left the canvas; the preview is hidden.
    pub fn pointer_leave(&mut self) {
        if self.pointer.take().is_some() && self.path.is_accumulating() {
            self.emit(SessionEvent::PathChanged);
        }
    }

    /// Last known pointer position in screen space.
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// Commit the path being drawn (double-click). Returns the index of the
    /// new annotation, or `None` if there are not enough points yet.
    pub fn finish_path(&mut self) -> Option<usize> {
        let index = self.path.commit(&mut self.store)?;
        log::info!("Added {}", self.store.as_slice()[index].label(index));
        self.emit(SessionEvent::AnnotationAdded { index });
        Some(index)
    }

    /// Discard the path being drawn.
    pub fn cancel_path(&mut self) -> bool {
        let cancelled = self.path.cancel();
        if cancelled {
            self.emit(SessionEvent::PathChanged);
        }
        cancelled
    }

    pub fn path(&self) -> &PathBuilder {
        &self.path
    }

    // ========================================================================
    // Annotations and selection
    // ========================================================================

    pub fn annotations(&self) -> &[Annotation] {
        self.store.as_slice()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn selected(&self) -> Option<usize> {
        self.store.selected()
    }

    /// Select an annotation, or clear the selection with `None`.
    pub fn select(&mut self, index: Option<usize>) -> Result<(), SessionError> {
        let before = self.store.selected();
        self.store
            .select(index)
            .inspect_err(|e| log::warn!("Cannot select: {}", e))?;
        if before != index {
            self.emit(SessionEvent::SelectionChanged { selected: index });
        }
        Ok(())
    }

    fn set_selection(&mut self, index: Option<usize>) {
        if self.store.selected() == index {
            return;
        }
        // Indices here come from the store itself.
        if self.store.select(index).is_ok() {
            self.emit(SessionEvent::SelectionChanged { selected: index });
        }
    }

    /// Remove an annotation. The selection keeps pointing at the same record
    /// or is cleared if that record was removed.
    pub fn remove(&mut self, index: usize) -> Result<Annotation, SessionError> {
        let before = self.store.selected();
        let removed = self
            .store
            .remove(index)
            .inspect_err(|e| log::warn!("Cannot remove: {}", e))?;
        log::info!("Removed {}", removed.label(index));

        self.emit(SessionEvent::AnnotationRemoved { index });
        let after = self.store.selected();
        if before != after {
            self.emit(SessionEvent::SelectionChanged { selected: after });
        }
        Ok(removed)
    }

    /// Replace the properties of an annotation. Keys and values are trimmed
    /// and blank keys dropped.
    pub fn set_properties(&mut self, index: usize, properties: Properties) -> Result<(), SessionError> {
        self.store
            .set_properties(index, properties)
            .inspect_err(|e| log::warn!("Cannot set properties: {}", e))?;
        self.emit(SessionEvent::PropertiesChanged { index });
        Ok(())
    }

    /// Set a single property. Key and value are trimmed.
    pub fn set_property(&mut self, index: usize, key: &str, value: &str) -> Result<(), SessionError> {
        self.store
            .set_property(index, key, value)
            .inspect_err(|e| log::warn!("Cannot set property: {}", e))?;
        self.emit(SessionEvent::PropertiesChanged { index });
        Ok(())
    }

    /// Remove a single property, returning its value.
    pub fn remove_property(&mut self, index: usize, key: &str) -> Result<Option<String>, SessionError> {
        let removed = self
            .store
            .remove_property(index, key)
            .inspect_err(|e| log::warn!("Cannot remove property: {}", e))?;
        if removed.is_some() {
            self.emit(SessionEvent::PropertiesChanged { index });
        }
        Ok(removed)
    }

    /// Remove every annotation and discard the path being drawn.
    pub fn clear(&mut self) {
        self.store.clear();
        self.path.cancel();
        log::info!("Cleared all annotations");
        self.emit(SessionEvent::Cleared);
    }

    /// What a list view shows for each annotation.
    pub fn summaries(&self) -> Vec<AnnotationSummary> {
        let selected = self.store.selected();
        self.store
            .iter()
            .enumerate()
            .map(|(index, annotation)| AnnotationSummary {
                index,
                label: annotation.label(index),
                properties: annotation.property_lines(),
                selected: selected == Some(index),
            })
            .collect()
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Load an annotation file. On any error the session is unchanged.
    pub fn import_json(&mut self, json: &str, mode: LoadMode) -> Result<LoadSummary, SessionError> {
        let report = format::parse_annotations(json)
            .inspect_err(|e| log::warn!("Annotation load failed: {}", e))?;
        Ok(self.apply_import(report, mode))
    }

    /// [`import_json`](Self::import_json) for raw file bytes.
    pub fn import_bytes(&mut self, bytes: &[u8], mode: LoadMode) -> Result<LoadSummary, SessionError> {
        let report = format::parse_annotations_bytes(bytes)
            .inspect_err(|e| log::warn!("Annotation load failed: {}", e))?;
        Ok(self.apply_import(report, mode))
    }

    fn apply_import(&mut self, report: ImportReport, mode: LoadMode) -> LoadSummary {
        let ImportReport {
            annotations,
            skipped,
        } = report;
        let loaded = annotations.len();
        match mode {
            LoadMode::Replace => self.store.replace_all(annotations),
            LoadMode::Append => self.store.append_all(annotations),
        }
        log::info!(
            "Loaded {} annotations ({:?}), {} skipped",
            loaded,
            mode,
            skipped.len()
        );
        self.emit(SessionEvent::AnnotationsLoaded {
            count: loaded,
            mode,
        });
        LoadSummary {
            mode,
            loaded,
            skipped,
        }
    }

    /// Serialize all annotations as an indented JSON array.
    pub fn export_json(&self) -> Result<String, SessionError> {
        Ok(format::export_annotations(self.store.as_slice())?)
    }

    /// [`export_json`](Self::export_json) as UTF-8 bytes.
    pub fn export_bytes(&self) -> Result<Vec<u8>, SessionError> {
        Ok(format::export_to_bytes(self.store.as_slice())?)
    }

    // ========================================================================
    // Observers and rendering
    // ========================================================================

    /// Register a change handler.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&SessionEvent) + 'static,
    {
        self.observers.subscribe(handler)
    }

    /// Remove a change handler.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Whether anything changed since the last [`render`](Self::render).
    pub fn needs_redraw(&self) -> bool {
        self.dirty
    }

    /// Draw the session and clear the redraw flag.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        render::render(self, surface);
        self.dirty = false;
    }

    fn emit(&mut self, event: SessionEvent) {
        self.dirty = true;
        self.observers.notify(&event);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Natural size of an encoded image, without decoding the pixels.
fn decode_size(bytes: &[u8]) -> Result<ImageSize, SessionError> {
    let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageSize::new(width, height))
}
