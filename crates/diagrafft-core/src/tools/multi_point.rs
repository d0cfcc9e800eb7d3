//! Polygon and polyline drawing by successive clicks.

use super::{Tool, ToolKind, ToolRequest};
use crate::command::{Command, EntityRecord, EntitySet};
use crate::context::{Cursor, EditorContext, Ghost};
use crate::document::build_polygon;
use crate::error::EditorResult;
use crate::input::{EventResult, Key, KeyEvent, MouseButton, PointerInput};
use kurbo::Point;

/// Modal tool collecting vertices. A double click or Enter finishes the
/// shape; Escape also keeps what was placed so far.
#[derive(Debug)]
pub struct MultiPointTool {
    closed: bool,
    points: Vec<Point>,
    pointer: Option<Point>,
}

impl MultiPointTool {
    pub fn polygon() -> Self {
        Self {
            closed: true,
            points: Vec::new(),
            pointer: None,
        }
    }

    pub fn polyline() -> Self {
        Self {
            closed: false,
            ..Self::polygon()
        }
    }

    fn min_points(&self) -> usize {
        if self.closed { 3 } else { 2 }
    }

    /// Commit the placed vertices if there are enough of them, then deactivate.
    fn finish(&mut self, ctx: &mut EditorContext) -> EditorResult<()> {
        let points = std::mem::take(&mut self.points);
        self.pointer = None;
        ctx.view.clear_ghost();
        ctx.request(ToolRequest::UnsuspendAll);
        ctx.request(ToolRequest::Deactivate);

        if points.len() < self.min_points() {
            log::debug!("Discarded shape with {} vertices", points.len());
            return Ok(());
        }
        let (entity, connectors) = build_polygon(points, self.closed);
        let id = entity.id();
        ctx.execute(Command::Add(EntitySet {
            records: vec![EntityRecord {
                entity,
                connectors,
                z_index: None,
            }],
            links: Vec::new(),
        }))?;
        ctx.selection.select(id);
        log::info!("Created {} {}", if self.closed { "polygon" } else { "polyline" }, id);
        Ok(())
    }

    fn show_ghost(&self, ctx: &mut EditorContext) {
        let mut preview = self.points.clone();
        preview.extend(self.pointer);
        ctx.view.show_ghost(Ghost::Polyline(preview));
    }
}

impl Tool for MultiPointTool {
    fn kind(&self) -> ToolKind {
        if self.closed {
            ToolKind::Polygon
        } else {
            ToolKind::Polyline
        }
    }

    fn on_activate(&mut self, ctx: &mut EditorContext) -> EditorResult<()> {
        ctx.view.set_cursor(Cursor::Crosshair);
        Ok(())
    }

    fn on_deactivate(&mut self, ctx: &mut EditorContext) {
        self.points.clear();
        self.pointer = None;
        ctx.view.clear_ghost();
        ctx.view.set_cursor(Cursor::Default);
    }

    fn on_pointer_down(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if input.button != MouseButton::Left {
            return Ok(EventResult::Ignored);
        }
        if input.click_count >= 2 {
            self.finish(ctx)?;
            return Ok(EventResult::Handled);
        }
        if self.points.is_empty() {
            ctx.request(ToolRequest::SuspendOthers);
        }
        self.points.push(input.position);
        self.show_ghost(ctx);
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if !self.points.is_empty() {
            self.pointer = Some(input.position);
            self.show_ghost(ctx);
        }
        Ok(EventResult::Handled)
    }

    fn on_pointer_up(&mut self, _ctx: &mut EditorContext, _input: &PointerInput) -> EditorResult<EventResult> {
        Ok(EventResult::Handled)
    }

    fn on_key_down(&mut self, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
        match event.key {
            Key::Escape | Key::Enter => {
                self.finish(ctx)?;
                Ok(EventResult::Handled)
            }
            _ => Ok(EventResult::Ignored),
        }
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        if let Err(err) = self.finish(ctx) {
            log::warn!("Failed to commit placed vertices: {}", err);
        }
    }

    fn is_busy(&self) -> bool {
        !self.points.is_empty()
    }
}
