//! Diagrafft Core Library
//!
//! Interactive tool and command framework of the Diagrafft diagram editor:
//! routes pointer and keyboard input to tools, turns gestures into undoable
//! commands and keeps the connector graph and paint order consistent.

pub mod codec;
pub mod command;
pub mod config;
pub mod connector;
pub mod context;
pub mod document;
pub mod editor;
pub mod entity;
pub mod error;
pub mod hit_test;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod tools;
pub mod tracker;
pub mod transform;
pub mod z_order;

pub use codec::{Bundle, Clipboard, JsonSnapshotCodec, MemoryClipboard, SnapshotCodec};
pub use command::{Command, CompoundCommand, UndoManager};
pub use config::{ConfigError, EditorConfig, InclusionMode};
pub use connector::{Connector, ConnectorGraph, ConnectorId};
pub use context::{Cursor, EditorContext, Ghost, NullView, RecordingView, View};
pub use document::Document;
pub use editor::Editor;
pub use entity::{Capabilities, Entity, EntityId, EntityKind, ShapeKind};
pub use error::{ClipboardError, CodecError, ConnectorError, EditorError, EditorResult, ValidationError};
pub use input::{EventResult, Key, KeyEvent, KeyPhase, Modifiers, MouseButton, PointerEvent, PointerInput};
pub use selection::Selection;
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use tools::{Action, AlignKind, Tool, ToolCategory, ToolKind, ToolManager};
pub use tracker::{Grip, Tracker};
pub use z_order::ZOrder;
