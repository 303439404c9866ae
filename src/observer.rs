//! Change notification for hosts.
//!
//! The engine never touches presentation. Instead, hosts register handlers
//! that are called with a [`SessionEvent`] after every state change and
//! decide for themselves what to redraw or rebuild.
//!
//! # Examples
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tia::{Session, SessionEvent, Tool};
//!
//! let mut session = Session::new();
//! let redraws = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&redraws);
//! session.subscribe(move |_event: &SessionEvent| counter.set(counter.get() + 1));
//!
//! session.set_tool(Tool::Line);
//! assert_eq!(redraws.get(), 1);
//! ```

use std::fmt;

use serde::Serialize;

use crate::format::LoadMode;
use crate::model::Tool;

/// What changed in a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new image was accepted and the display scale recomputed
    ImageLoaded { width: u32, height: u32, scale: f64 },
    /// The container changed size
    Resized { scale: f64 },
    /// The active tool changed (any path in progress was cancelled)
    ToolChanged { tool: Tool },
    /// The path being drawn gained a point, was cancelled, or the pointer
    /// moved while drawing
    PathChanged,
    /// A path was committed as a new annotation
    AnnotationAdded { index: usize },
    /// An annotation was removed
    AnnotationRemoved { index: usize },
    /// The properties of an annotation changed
    PropertiesChanged { index: usize },
    /// The selection changed
    SelectionChanged { selected: Option<usize> },
    /// A batch of imported annotations was applied
    AnnotationsLoaded { count: usize, mode: LoadMode },
    /// All annotations were removed
    Cleared,
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn FnMut(&E)>;

/// A list of event handlers, called in registration order.
pub struct Observers<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }

    /// Register a handler.
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Call every handler with `event`.
    pub fn notify(&mut self, event: &E) {
        for (_, handler) in &mut self.handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
