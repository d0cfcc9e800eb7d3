//! Dragging connection endpoints, with detach and re-attach.

use super::{Tool, ToolKind, ToolRequest};
use crate::command::{apply_connector_state, Command, ConnectorMoveCommand, ConnectorState};
use crate::connector::ConnectorId;
use crate::context::{Cursor, EditorContext, Ghost};
use crate::document::Document;
use crate::error::EditorResult;
use crate::hit_test::collect_connector_at;
use crate::input::{EventResult, MouseButton, PointerInput};
use kurbo::Point;
use std::collections::HashSet;

#[derive(Debug)]
struct ConnectorDrag {
    connector: ConnectorId,
    before: ConnectorState,
    /// The dragged connector and everything attached beneath it.
    excluded: HashSet<ConnectorId>,
    moved: bool,
}

impl ConnectorDrag {
    /// Connector the drag would attach to if released at `point`.
    fn snap_target(&self, doc: &Document, point: Point, radius: f64) -> Option<ConnectorId> {
        collect_connector_at(doc, point, radius, |c| !self.excluded.contains(&c.id()))
    }
}

/// Highest priority gesture listener: grabs connection endpoints.
#[derive(Debug, Default)]
pub struct ConnectorMoverTool {
    drag: Option<ConnectorDrag>,
}

impl ConnectorMoverTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn release(&mut self, ctx: &mut EditorContext) {
        self.drag = None;
        ctx.blocking.move_blocked = false;
        ctx.view.clear_ghost();
        ctx.view.set_cursor(Cursor::Default);
        ctx.request(ToolRequest::UnsuspendAll);
    }
}

impl Tool for ConnectorMoverTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ConnectorMover
    }

    fn on_pointer_down(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if input.button != MouseButton::Left {
            return Ok(EventResult::Ignored);
        }
        let radius = ctx.config.connector_snap_radius;
        let Some(connector) = collect_connector_at(&ctx.document, input.position, radius, |c| c.is_endpoint()) else {
            return Ok(EventResult::Ignored);
        };
        let Some(before) = ConnectorState::of(&ctx.document, connector) else {
            return Ok(EventResult::Ignored);
        };
        let mut excluded: HashSet<ConnectorId> =
            ctx.document.connectors().descendants(connector).into_iter().collect();
        excluded.insert(connector);

        log::debug!("Grabbed connector {}", connector);
        self.drag = Some(ConnectorDrag {
            connector,
            before,
            excluded,
            moved: false,
        });
        ctx.blocking.move_blocked = true;
        ctx.request(ToolRequest::SuspendOthers);
        ctx.view.set_cursor(Cursor::Crosshair);
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(drag) = self.drag.as_mut() else {
            return Ok(EventResult::Ignored);
        };
        if !drag.moved {
            drag.moved = true;
            if let Some(parent) = drag.before.parent {
                ctx.document.connectors_mut().detach(parent, drag.connector)?;
            }
        }
        let free = ConnectorState {
            position: input.position,
            parent: None,
        };
        apply_connector_state(&mut ctx.document, drag.connector, free)?;
        match drag.snap_target(&ctx.document, input.position, ctx.config.connector_snap_radius) {
            Some(target) => {
                if let Some(c) = ctx.document.connectors().get(target) {
                    ctx.view.show_ghost(Ghost::Marker(c.position));
                }
            }
            None => ctx.view.clear_ghost(),
        }
        ctx.view.invalidate(None);
        Ok(EventResult::Handled)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(drag) = self.drag.take() else {
            return Ok(EventResult::Ignored);
        };
        if !drag.moved {
            self.release(ctx);
            return Ok(EventResult::Handled);
        }
        let target = drag.snap_target(&ctx.document, input.position, ctx.config.connector_snap_radius);
        let position = target
            .and_then(|t| ctx.document.connectors().get(t))
            .map_or(input.position, |c| c.position);
        let after = ConnectorState {
            position,
            parent: target,
        };
        let applied = apply_connector_state(&mut ctx.document, drag.connector, after);
        if let Err(err) = applied {
            apply_connector_state(&mut ctx.document, drag.connector, drag.before)?;
            self.release(ctx);
            return Err(err);
        }
        ctx.record(Command::ConnectorMove(ConnectorMoveCommand {
            connector: drag.connector,
            before: drag.before,
            after,
        }));
        self.release(ctx);
        Ok(EventResult::Handled)
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        if let Some(drag) = self.drag.take() {
            if drag.moved {
                if let Err(err) = apply_connector_state(&mut ctx.document, drag.connector, drag.before) {
                    log::warn!("Failed to restore connector {}: {}", drag.connector, err);
                }
            }
            self.release(ctx);
        }
    }

    fn is_busy(&self) -> bool {
        self.drag.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, ShapeKind};
    use kurbo::Rect;

    fn setup() -> (EditorContext, EntityId, ConnectorId, ConnectorId) {
        let mut ctx = EditorContext::default();
        let shape = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let line = ctx.document.add_connection(Point::new(200.0, 200.0), Point::new(300.0, 300.0));
        let anchor = ctx.document.entity(shape).unwrap().connectors[1];
        let end = ctx.document.entity(line).unwrap().as_connection().unwrap().end;
        (ctx, line, anchor, end)
    }

    #[test]
    fn test_drag_attaches_to_anchor() {
        let (mut ctx, _, anchor, end) = setup();
        let mut tool = ConnectorMoverTool::new();

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(300.0, 300.0))).unwrap();
        assert!(ctx.blocking.move_blocked);
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(150.0, 80.0))).unwrap();
        tool.on_pointer_up(&mut ctx, &PointerInput::at(Point::new(102.0, 51.0))).unwrap();
        assert!(!ctx.blocking.move_blocked);

        assert_eq!(ctx.document.connectors().parent(end), Some(anchor));
        assert_eq!(ctx.document.connectors().get(end).unwrap().position, Point::new(100.0, 50.0));

        ctx.undo.undo(&mut ctx.document).unwrap();
        assert_eq!(ctx.document.connectors().parent(end), None);
        assert_eq!(ctx.document.connectors().get(end).unwrap().position, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_drag_does_not_attach_below_itself() {
        let (mut ctx, line, _, end) = setup();
        let start = ctx.document.entity(line).unwrap().as_connection().unwrap().start;
        // `end` hangs beneath `start` and travels with it.
        ctx.document.connectors_mut().attach(start, end).unwrap();
        let mut tool = ConnectorMoverTool::new();

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(200.0, 200.0))).unwrap();
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(400.0, 400.0))).unwrap();
        tool.on_pointer_up(&mut ctx, &PointerInput::at(Point::new(400.0, 400.0))).unwrap();

        assert!(ctx.document.connectors().is_consistent());
        assert_eq!(ctx.document.connectors().parent(start), None);
        assert_eq!(ctx.document.connectors().parent(end), Some(start));
        assert_eq!(ctx.document.connectors().get(end).unwrap().position, Point::new(400.0, 400.0));
    }

    #[test]
    fn test_cancel_restores_attachment() {
        let (mut ctx, _, anchor, end) = setup();
        ctx.document.connectors_mut().attach(anchor, end).unwrap();
        let mut tool = ConnectorMoverTool::new();

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(100.0, 50.0))).unwrap();
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(180.0, 50.0))).unwrap();
        assert_eq!(ctx.document.connectors().parent(end), None);

        tool.cancel(&mut ctx);
        assert_eq!(ctx.document.connectors().parent(end), Some(anchor));
        assert!(!ctx.undo.can_undo());
    }
}
