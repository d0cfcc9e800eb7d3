//! Shared editor state handed to every tool, and the view collaborator.

use crate::codec::{Clipboard, JsonSnapshotCodec, MemoryClipboard, SnapshotCodec};
use crate::command::{Command, UndoManager};
use crate::config::EditorConfig;
use crate::document::Document;
use crate::entity::EntityId;
use crate::error::{EditorResult, ValidationError};
use crate::selection::Selection;
use crate::tools::ToolRequest;
use crate::tracker::Tracker;
use kurbo::{Point, Rect};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Mouse cursor requested from the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Move,
    Crosshair,
    ResizeNs,
    ResizeEw,
    ResizeNwse,
    ResizeNesw,
}

/// Transient preview painted by the view during a gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Ghost {
    Rect(Rect),
    Ellipse(Rect),
    Line(Point, Point),
    Polyline(Vec<Point>),
    Marquee(Rect),
    /// Snap target highlight.
    Marker(Point),
}

/// The painting collaborator. Implementations must not block.
pub trait View {
    fn set_cursor(&mut self, cursor: Cursor);
    fn show_ghost(&mut self, ghost: Ghost);
    fn clear_ghost(&mut self);
    /// Request a repaint of `region`, or everything for `None`.
    fn invalidate(&mut self, region: Option<Rect>);
}

/// A view that ignores every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl View for NullView {
    fn set_cursor(&mut self, _cursor: Cursor) {}
    fn show_ghost(&mut self, _ghost: Ghost) {}
    fn clear_ghost(&mut self) {}
    fn invalidate(&mut self, _region: Option<Rect>) {}
}

/// What a [`RecordingView`] has been told so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewLog {
    pub cursor: Cursor,
    pub ghost: Option<Ghost>,
    /// Number of ghosts shown so far.
    pub ghosts_shown: usize,
    pub invalidations: usize,
}

/// A view that records calls. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    log: Rc<RefCell<ViewLog>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current log.
    pub fn log(&self) -> ViewLog {
        self.log.borrow().clone()
    }
}

impl View for RecordingView {
    fn set_cursor(&mut self, cursor: Cursor) {
        self.log.borrow_mut().cursor = cursor;
    }

    fn show_ghost(&mut self, ghost: Ghost) {
        let mut log = self.log.borrow_mut();
        log.ghost = Some(ghost);
        log.ghosts_shown += 1;
    }

    fn clear_ghost(&mut self) {
        self.log.borrow_mut().ghost = None;
    }

    fn invalidate(&mut self, _region: Option<Rect>) {
        self.log.borrow_mut().invalidations += 1;
    }
}

/// Flags tools set to restrict each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockingFlags {
    /// While set, dragging entities does not move them.
    pub move_blocked: bool,
}

/// Everything a tool may read or change.
pub struct EditorContext {
    pub document: Document,
    pub selection: Selection,
    pub undo: UndoManager,
    pub config: EditorConfig,
    pub blocking: BlockingFlags,
    /// Hover-capable entity under the pointer.
    pub hovered: Option<EntityId>,
    pub view: Box<dyn View>,
    pub clipboard: Box<dyn Clipboard>,
    pub codec: Box<dyn SnapshotCodec>,
    /// User-facing messages, oldest first.
    pub messages: Vec<String>,
    requests: Vec<ToolRequest>,
}

impl EditorContext {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            document: Document::new(),
            selection: Selection::new(),
            undo: UndoManager::new(config.max_undo_history),
            config,
            blocking: BlockingFlags::default(),
            hovered: None,
            view: Box::new(NullView),
            clipboard: Box::new(MemoryClipboard::new()),
            codec: Box::new(JsonSnapshotCodec),
            messages: Vec::new(),
            requests: Vec::new(),
        }
    }

    pub fn with_document(mut self, document: Document) -> Self {
        self.document = document;
        self
    }

    pub fn with_view(mut self, view: impl View + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Box::new(clipboard);
        self
    }

    pub fn with_codec(mut self, codec: impl SnapshotCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Ask the tool manager to do something once the current handler returns.
    pub fn request(&mut self, request: ToolRequest) {
        self.requests.push(request);
    }

    pub(crate) fn take_requests(&mut self) -> Vec<ToolRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Show a validation failure to the user.
    pub fn report(&mut self, error: &ValidationError) {
        log::warn!("{}", error);
        self.messages.push(error.to_string());
    }

    /// Apply a command and record it (the command has not been applied yet).
    pub fn execute(&mut self, command: Command) -> EditorResult<()> {
        self.undo.execute(command, &mut self.document)?;
        self.view.invalidate(None);
        Ok(())
    }

    /// Record a command whose effect a gesture already applied.
    pub fn record(&mut self, command: Command) {
        self.undo.add_undo_command(command);
        self.view.invalidate(None);
    }

    /// Tracker around the current selection.
    pub fn tracker(&self) -> Option<Tracker> {
        Tracker::for_selection(&self.document, &self.selection)
    }

    /// Selected leaves in z-order.
    pub fn selected_leaves(&self) -> Vec<EntityId> {
        self.selection.flattened(&self.document)
    }

    /// Drop stale selection and hover after the document changed under them.
    pub fn sync_selection(&mut self) {
        self.selection.retain_existing(&self.document);
        if self.hovered.is_some_and(|id| !self.document.contains(id)) {
            self.hovered = None;
        }
    }
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("document", &self.document.id)
            .field("selection", &self.selection)
            .field("undo", &self.undo)
            .field("config", &self.config)
            .field("blocking", &self.blocking)
            .field("hovered", &self.hovered)
            .field("messages", &self.messages)
            .finish_non_exhaustive()
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
