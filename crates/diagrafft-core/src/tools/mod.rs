//! Tool system: stateful handlers that turn input into commands.

mod action;
mod connection_tool;
mod connector_mover;
mod drag;
mod hover;
mod manager;
mod move_tool;
mod multi_point;
mod select;
mod shape_tool;
mod transform_tool;

pub use action::ActionTool;
pub use connection_tool::ConnectionTool;
pub use connector_mover::ConnectorMoverTool;
pub use drag::DragRect;
pub use hover::HoverTool;
pub use manager::ToolManager;
pub use move_tool::MoveTool;
pub use multi_point::MultiPointTool;
pub use select::SelectTool;
pub use shape_tool::ShapeTool;
pub use transform_tool::TransformTool;

use crate::context::EditorContext;
use crate::error::EditorResult;
use crate::input::{EventResult, KeyEvent, PointerInput};
use serde::{Deserialize, Serialize};

/// Alignment target for the align actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignKind {
    Left,
    Right,
    Top,
    Bottom,
    /// Line up horizontal centers.
    CenterHorizontal,
    /// Line up vertical centers.
    CenterVertical,
}

/// One-shot operations on the selection or history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Group,
    Ungroup,
    Delete,
    Copy,
    Cut,
    Paste,
    Undo,
    Redo,
    SelectAll,
    SendToFront,
    SendToBack,
    SendForwards,
    SendBackwards,
    Align(AlignKind),
}

/// How a tool takes part in event routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Always listening, in priority order, unless suspended or disabled.
    Listener,
    /// Exclusive once activated; receives input before the listeners.
    Modal,
    /// Runs on activation and deactivates immediately.
    Action,
}

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hover,
    ConnectorMover,
    Transform,
    Move,
    Select,
    Rectangle,
    Ellipse,
    Polygon,
    Polyline,
    Connection,
    Action(Action),
}

const NAMED_TOOLS: &[(&str, ToolKind)] = &[
    ("hover", ToolKind::Hover),
    ("connector-mover", ToolKind::ConnectorMover),
    ("transform", ToolKind::Transform),
    ("move", ToolKind::Move),
    ("select", ToolKind::Select),
    ("rectangle", ToolKind::Rectangle),
    ("ellipse", ToolKind::Ellipse),
    ("polygon", ToolKind::Polygon),
    ("polyline", ToolKind::Polyline),
    ("connection", ToolKind::Connection),
    ("group", ToolKind::Action(Action::Group)),
    ("ungroup", ToolKind::Action(Action::Ungroup)),
    ("delete", ToolKind::Action(Action::Delete)),
    ("copy", ToolKind::Action(Action::Copy)),
    ("cut", ToolKind::Action(Action::Cut)),
    ("paste", ToolKind::Action(Action::Paste)),
    ("undo", ToolKind::Action(Action::Undo)),
    ("redo", ToolKind::Action(Action::Redo)),
    ("select-all", ToolKind::Action(Action::SelectAll)),
    ("send-to-front", ToolKind::Action(Action::SendToFront)),
    ("send-to-back", ToolKind::Action(Action::SendToBack)),
    ("send-forwards", ToolKind::Action(Action::SendForwards)),
    ("send-backwards", ToolKind::Action(Action::SendBackwards)),
    ("align-left", ToolKind::Action(Action::Align(AlignKind::Left))),
    ("align-right", ToolKind::Action(Action::Align(AlignKind::Right))),
    ("align-top", ToolKind::Action(Action::Align(AlignKind::Top))),
    ("align-bottom", ToolKind::Action(Action::Align(AlignKind::Bottom))),
    (
        "align-center-horizontal",
        ToolKind::Action(Action::Align(AlignKind::CenterHorizontal)),
    ),
    (
        "align-center-vertical",
        ToolKind::Action(Action::Align(AlignKind::CenterVertical)),
    ),
];

impl ToolKind {
    /// Listener tools in routing priority order.
    pub const LISTENERS: [ToolKind; 5] = [
        ToolKind::Hover,
        ToolKind::ConnectorMover,
        ToolKind::Transform,
        ToolKind::Move,
        ToolKind::Select,
    ];

    /// Look a tool up by its name, e.g. `"rectangle"` or `"align-left"`.
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_TOOLS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, kind)| kind)
    }

    pub fn name(self) -> &'static str {
        NAMED_TOOLS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map_or("unknown", |&(n, _)| n)
    }

    pub fn category(self) -> ToolCategory {
        match self {
            ToolKind::Hover
            | ToolKind::ConnectorMover
            | ToolKind::Transform
            | ToolKind::Move
            | ToolKind::Select => ToolCategory::Listener,
            ToolKind::Rectangle
            | ToolKind::Ellipse
            | ToolKind::Polygon
            | ToolKind::Polyline
            | ToolKind::Connection => ToolCategory::Modal,
            ToolKind::Action(_) => ToolCategory::Action,
        }
    }

    /// Instantiate the tool.
    pub fn create(self) -> Box<dyn Tool> {
        match self {
            ToolKind::Hover => Box::new(HoverTool::new()),
            ToolKind::ConnectorMover => Box::new(ConnectorMoverTool::new()),
            ToolKind::Transform => Box::new(TransformTool::new()),
            ToolKind::Move => Box::new(MoveTool::new()),
            ToolKind::Select => Box::new(SelectTool::new()),
            ToolKind::Rectangle | ToolKind::Ellipse => Box::new(ShapeTool::new(self)),
            ToolKind::Polygon => Box::new(MultiPointTool::polygon()),
            ToolKind::Polyline => Box::new(MultiPointTool::polyline()),
            ToolKind::Connection => Box::new(ConnectionTool::new()),
            ToolKind::Action(action) => Box::new(ActionTool::new(action)),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Requests a tool makes of the manager. Applied after the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRequest {
    /// Suspend every other tool until `UnsuspendAll`.
    SuspendOthers,
    UnsuspendAll,
    /// Deactivate the requesting tool.
    Deactivate,
}

/// A stateful input handler.
///
/// Handlers return [`EventResult::Handled`] to stop the event from reaching
/// lower priority tools. Gesture state lives in the tool between events.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Called when the tool becomes active. Action tools do their work here.
    fn on_activate(&mut self, _ctx: &mut EditorContext) -> EditorResult<()> {
        Ok(())
    }

    /// Called when the tool stops being active. Must discard any gesture in progress.
    fn on_deactivate(&mut self, _ctx: &mut EditorContext) {}

    fn on_pointer_down(&mut self, _ctx: &mut EditorContext, _input: &PointerInput) -> EditorResult<EventResult> {
        Ok(EventResult::Ignored)
    }

    fn on_pointer_move(&mut self, _ctx: &mut EditorContext, _input: &PointerInput) -> EditorResult<EventResult> {
        Ok(EventResult::Ignored)
    }

    fn on_pointer_up(&mut self, _ctx: &mut EditorContext, _input: &PointerInput) -> EditorResult<EventResult> {
        Ok(EventResult::Ignored)
    }

    fn on_key_down(&mut self, _ctx: &mut EditorContext, _event: &KeyEvent) -> EditorResult<EventResult> {
        Ok(EventResult::Ignored)
    }

    fn on_key_up(&mut self, _ctx: &mut EditorContext, _event: &KeyEvent) -> EditorResult<EventResult> {
        Ok(EventResult::Ignored)
    }

    fn on_key_press(&mut self, _ctx: &mut EditorContext, _event: &KeyEvent) -> EditorResult<EventResult> {
        Ok(EventResult::Ignored)
    }

    /// Abort a gesture in progress and leave the model as it was before it.
    fn cancel(&mut self, _ctx: &mut EditorContext) {}

    /// Whether a gesture is in progress.
    fn is_busy(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for &(name, kind) in NAMED_TOOLS {
            assert_eq!(ToolKind::from_name(name), Some(kind));
            assert_eq!(kind.name(), name);
        }
        assert_eq!(ToolKind::from_name("lasso"), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(ToolKind::Select.category(), ToolCategory::Listener);
        assert_eq!(ToolKind::Polygon.category(), ToolCategory::Modal);
        assert_eq!(
            ToolKind::Action(Action::Align(AlignKind::Top)).category(),
            ToolCategory::Action
        );
    }

    #[test]
    fn test_create_reports_kind() {
        for &(_, kind) in NAMED_TOOLS {
            assert_eq!(kind.create().kind(), kind);
        }
    }
}
