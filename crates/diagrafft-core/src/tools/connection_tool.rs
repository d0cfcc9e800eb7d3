//! Drawing connections between shape anchors.

use super::{Tool, ToolKind, ToolRequest};
use crate::command::{Command, CompoundCommand, EntityRecord, EntitySet};
use crate::connector::ConnectorId;
use crate::context::{Cursor, EditorContext, Ghost};
use crate::document::{build_connection, Document};
use crate::error::EditorResult;
use crate::hit_test::collect_connector_at;
use crate::input::{EventResult, Key, KeyEvent, MouseButton, PointerInput};
use kurbo::Point;

/// Where a connection end lands: a point, optionally bound to an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EndPlacement {
    position: Point,
    anchor: Option<ConnectorId>,
}

impl EndPlacement {
    /// Snap to the nearest anchor of a connectable entity within `radius`.
    fn resolve(doc: &Document, point: Point, radius: f64) -> Self {
        let anchor = collect_connector_at(doc, point, radius, |c| {
            !c.is_endpoint()
                && doc
                    .entity(c.owner)
                    .is_some_and(|e| e.capabilities.connectable)
        });
        let position = anchor
            .and_then(|a| doc.connectors().get(a))
            .map_or(point, |c| c.position);
        Self { position, anchor }
    }
}

/// Modal tool: drag from one point (or anchor) to another.
#[derive(Debug, Default)]
pub struct ConnectionTool {
    start: Option<EndPlacement>,
}

impl ConnectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn discard(&mut self, ctx: &mut EditorContext) {
        if self.start.take().is_some() {
            ctx.request(ToolRequest::UnsuspendAll);
        }
        ctx.view.clear_ghost();
    }
}

impl Tool for ConnectionTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Connection
    }

    fn on_activate(&mut self, ctx: &mut EditorContext) -> EditorResult<()> {
        ctx.view.set_cursor(Cursor::Crosshair);
        Ok(())
    }

    fn on_deactivate(&mut self, ctx: &mut EditorContext) {
        self.discard(ctx);
        ctx.view.set_cursor(Cursor::Default);
    }

    fn on_pointer_down(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if input.button != MouseButton::Left {
            return Ok(EventResult::Ignored);
        }
        let start = EndPlacement::resolve(&ctx.document, input.position, ctx.config.connector_snap_radius);
        self.start = Some(start);
        ctx.request(ToolRequest::SuspendOthers);
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(start) = self.start else {
            return Ok(EventResult::Handled);
        };
        let end = EndPlacement::resolve(&ctx.document, input.position, ctx.config.connector_snap_radius);
        ctx.view.show_ghost(Ghost::Line(start.position, end.position));
        Ok(EventResult::Handled)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(start) = self.start else {
            return Ok(EventResult::Handled);
        };
        let end = EndPlacement::resolve(&ctx.document, input.position, ctx.config.connector_snap_radius);
        self.discard(ctx);
        ctx.request(ToolRequest::Deactivate);

        let too_short = (end.position - start.position).hypot() < ctx.config.min_shape_size;
        if too_short || (start.anchor.is_some() && start.anchor == end.anchor) {
            log::debug!("Discarded degenerate connection");
            return Ok(EventResult::Handled);
        }

        let (entity, connectors) = build_connection(start.position, end.position);
        let id = entity.id();
        let (start_id, end_id) = match entity.as_connection() {
            Some(connection) => (connection.start, connection.end),
            None => return Ok(EventResult::Handled),
        };
        let mut compound = CompoundCommand::new();
        compound.push(Command::Add(EntitySet {
            records: vec![EntityRecord {
                entity,
                connectors,
                z_index: None,
            }],
            links: Vec::new(),
        }));
        for (placement, connector) in [(start, start_id), (end, end_id)] {
            if let Some(anchor) = placement.anchor {
                compound.push(Command::Attach {
                    parent: anchor,
                    child: connector,
                });
            }
        }
        ctx.execute(Command::Compound(compound))?;
        ctx.selection.select(id);
        log::info!("Created connection {}", id);
        Ok(EventResult::Handled)
    }

    fn on_key_down(&mut self, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
        if event.key != Key::Escape {
            return Ok(EventResult::Ignored);
        }
        self.discard(ctx);
        ctx.request(ToolRequest::Deactivate);
        Ok(EventResult::Handled)
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        self.discard(ctx);
    }

    fn is_busy(&self) -> bool {
        self.start.is_some()
    }
}
