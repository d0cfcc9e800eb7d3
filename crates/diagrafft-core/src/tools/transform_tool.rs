//! Resizing the selection by its tracker grips.

use super::{Tool, ToolKind, ToolRequest};
use crate::command::Command;
use crate::context::{Cursor, EditorContext, Ghost};
use crate::error::EditorResult;
use crate::input::{EventResult, MouseButton, PointerInput};
use crate::transform::TransformGesture;

/// Listens for presses on a tracker grip and scales the selection live.
#[derive(Debug, Default)]
pub struct TransformTool {
    gesture: Option<TransformGesture>,
}

impl TransformTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tool for TransformTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Transform
    }

    fn on_pointer_down(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if input.button != MouseButton::Left {
            return Ok(EventResult::Ignored);
        }
        let Some(tracker) = ctx.tracker() else {
            return Ok(EventResult::Ignored);
        };
        let Some(grip) = tracker.hit_test_grip(input.position, ctx.config.grip_size) else {
            return Ok(EventResult::Ignored);
        };
        let leaves = ctx.selected_leaves();
        let Some(gesture) = TransformGesture::begin(&ctx.document, &tracker, grip, &leaves) else {
            return Ok(EventResult::Ignored);
        };
        log::debug!("Transform started on grip {:?} with {} bones", grip, gesture.bones().len());
        self.gesture = Some(gesture);
        ctx.blocking.move_blocked = true;
        ctx.request(ToolRequest::SuspendOthers);
        ctx.view.set_cursor(grip.cursor());
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        match self.gesture.as_mut() {
            Some(gesture) => {
                gesture.update(&mut ctx.document, input.position, ctx.config.min_extent);
                if let Some(bounds) = ctx.selection.bounds(&ctx.document) {
                    ctx.view.show_ghost(Ghost::Rect(bounds));
                }
                ctx.view.invalidate(None);
                Ok(EventResult::Handled)
            }
            None => {
                // Feedback only: show the resize cursor over a grip.
                let grip = ctx
                    .tracker()
                    .and_then(|t| t.hit_test_grip(input.position, ctx.config.grip_size));
                if let Some(grip) = grip {
                    ctx.view.set_cursor(grip.cursor());
                }
                Ok(EventResult::Ignored)
            }
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(EventResult::Ignored);
        };
        gesture.update(&mut ctx.document, input.position, ctx.config.min_extent);
        if let Some(command) = gesture.finish() {
            ctx.record(Command::Transform(command));
        }
        ctx.view.clear_ghost();
        ctx.view.set_cursor(Cursor::Default);
        ctx.blocking.move_blocked = false;
        ctx.request(ToolRequest::UnsuspendAll);
        Ok(EventResult::Handled)
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        if let Some(gesture) = self.gesture.take() {
            gesture.cancel(&mut ctx.document);
            ctx.view.clear_ghost();
            ctx.view.set_cursor(Cursor::Default);
            ctx.blocking.move_blocked = false;
            ctx.request(ToolRequest::UnsuspendAll);
        }
    }

    fn is_busy(&self) -> bool {
        self.gesture.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use kurbo::{Point, Rect};

    #[test]
    fn test_resize_records_without_reapplying() {
        let mut ctx = EditorContext::default();
        let a = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 50.0));
        ctx.selection.select(a);
        let mut tool = TransformTool::new();

        let down = tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(100.0, 25.0))).unwrap();
        assert!(down.is_handled());
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(150.0, 25.0))).unwrap();
        tool.on_pointer_up(&mut ctx, &PointerInput::at(Point::new(200.0, 40.0))).unwrap();

        assert_eq!(ctx.document.bounds_of(a), Some(Rect::new(0.0, 0.0, 200.0, 50.0)));
        assert_eq!(ctx.undo.undo_count(), 1);
        ctx.undo.undo(&mut ctx.document).unwrap();
        assert_eq!(ctx.document.bounds_of(a), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
        ctx.undo.redo(&mut ctx.document).unwrap();
        assert_eq!(ctx.document.bounds_of(a), Some(Rect::new(0.0, 0.0, 200.0, 50.0)));
    }

    #[test]
    fn test_press_away_from_grips_is_ignored() {
        let mut ctx = EditorContext::default();
        let a = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 50.0));
        ctx.selection.select(a);
        let mut tool = TransformTool::new();

        let result = tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(50.0, 25.0))).unwrap();
        assert_eq!(result, EventResult::Ignored);
    }
}
