//! Drawing rectangles and ellipses by dragging.

use super::{DragRect, Tool, ToolKind, ToolRequest};
use crate::command::{Command, EntityRecord, EntitySet};
use crate::context::{Cursor, EditorContext, Ghost};
use crate::document::build_shape;
use crate::entity::ShapeKind;
use crate::error::EditorResult;
use crate::input::{EventResult, Key, KeyEvent, MouseButton, PointerInput};

/// Modal tool drawing one shape, then deactivating.
#[derive(Debug)]
pub struct ShapeTool {
    kind: ToolKind,
    shape: ShapeKind,
    drag: Option<DragRect>,
}

impl ShapeTool {
    /// Tool for `ToolKind::Rectangle` or `ToolKind::Ellipse`.
    pub fn new(kind: ToolKind) -> Self {
        let shape = match kind {
            ToolKind::Ellipse => ShapeKind::Ellipse,
            _ => ShapeKind::Rectangle,
        };
        Self {
            kind,
            shape,
            drag: None,
        }
    }

    fn ghost(&self, drag: &DragRect) -> Ghost {
        match self.shape {
            ShapeKind::Rectangle => Ghost::Rect(drag.rect()),
            ShapeKind::Ellipse => Ghost::Ellipse(drag.rect()),
        }
    }

    fn discard(&mut self, ctx: &mut EditorContext) {
        if self.drag.take().is_some() {
            ctx.request(ToolRequest::UnsuspendAll);
        }
        ctx.view.clear_ghost();
    }
}

impl Tool for ShapeTool {
    fn kind(&self) -> ToolKind {
        self.kind
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
        self.drag = Some(DragRect::new(input.position));
        ctx.request(ToolRequest::SuspendOthers);
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(mut drag) = self.drag else {
            return Ok(EventResult::Handled);
        };
        drag.update(input.position);
        self.drag = Some(drag);
        ctx.view.show_ghost(self.ghost(&drag));
        Ok(EventResult::Handled)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(mut drag) = self.drag else {
            return Ok(EventResult::Handled);
        };
        drag.update(input.position);
        self.discard(ctx);

        if drag.is_smaller_than(ctx.config.min_shape_size) {
            log::debug!("Discarded {:?} smaller than {}", self.shape, ctx.config.min_shape_size);
        } else {
            let (entity, connectors) = build_shape(self.shape, drag.rect());
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
            log::info!("Created {:?} {}", self.shape, id);
        }
        ctx.request(ToolRequest::Deactivate);
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
        self.drag.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RecordingView;
    use kurbo::{Point, Rect};

    #[test]
    fn test_draws_one_shape_then_deactivates() {
        let view = RecordingView::new();
        let mut ctx = EditorContext::default().with_view(view.clone());
        let mut tool = ShapeTool::new(ToolKind::Ellipse);

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(50.0, 50.0))).unwrap();
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(30.0, 70.0))).unwrap();
        assert_eq!(view.log().ghost, Some(Ghost::Ellipse(Rect::new(30.0, 50.0, 50.0, 70.0))));
        tool.on_pointer_up(&mut ctx, &PointerInput::at(Point::new(10.0, 90.0))).unwrap();

        assert_eq!(view.log().ghost, None);
        assert_eq!(ctx.document.len(), 1);
        let id = ctx.selection.items()[0];
        assert_eq!(ctx.document.bounds_of(id), Some(Rect::new(10.0, 50.0, 50.0, 90.0)));
        assert!(ctx.take_requests().contains(&ToolRequest::Deactivate));
    }

    #[test]
    fn test_escape_discards_without_command() {
        let mut ctx = EditorContext::default();
        let mut tool = ShapeTool::new(ToolKind::Rectangle);

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(0.0, 0.0))).unwrap();
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(40.0, 40.0))).unwrap();
        let result = tool.on_key_down(&mut ctx, &KeyEvent::down(Key::Escape)).unwrap();

        assert!(result.is_handled());
        assert!(!tool.is_busy());
        assert!(ctx.document.is_empty());
        assert!(!ctx.undo.can_undo());
    }

    #[test]
    fn test_tiny_drag_is_discarded() {
        let mut ctx = EditorContext::default();
        let mut tool = ShapeTool::new(ToolKind::Rectangle);

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(0.0, 0.0))).unwrap();
        tool.on_pointer_up(&mut ctx, &PointerInput::at(Point::new(1.0, 1.0))).unwrap();
        assert!(ctx.document.is_empty());
    }
}
