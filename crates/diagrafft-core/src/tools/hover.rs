//! Hover tracking.

use super::{Tool, ToolKind};
use crate::context::{Cursor, EditorContext};
use crate::error::EditorResult;
use crate::hit_test::collect_entity_at;
use crate::input::{EventResult, PointerInput};

/// Records the hover-capable entity under the pointer. Never consumes events.
#[derive(Debug, Default)]
pub struct HoverTool;

impl HoverTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for HoverTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Hover
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let hovered = collect_entity_at(&ctx.document, input.position, ctx.config.hit_tolerance)
            .filter(|&id| {
                ctx.document
                    .entity(id)
                    .is_some_and(|e| e.capabilities.hoverable)
            });
        if hovered != ctx.hovered {
            log::debug!("Hover changed to {:?}", hovered);
            ctx.hovered = hovered;
            ctx.view.set_cursor(if hovered.is_some() {
                Cursor::Pointer
            } else {
                Cursor::Default
            });
            ctx.view.invalidate(None);
        }
        Ok(EventResult::Ignored)
    }

    fn on_deactivate(&mut self, ctx: &mut EditorContext) {
        ctx.hovered = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use kurbo::{Point, Rect};

    #[test]
    fn test_tracks_hover_without_consuming() {
        let mut ctx = EditorContext::default();
        let id = ctx
            .document
            .add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut tool = HoverTool::new();

        let result = tool
            .on_pointer_move(&mut ctx, &PointerInput::at(Point::new(5.0, 5.0)))
            .unwrap();
        assert_eq!(result, EventResult::Ignored);
        assert_eq!(ctx.hovered, Some(id));

        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(50.0, 5.0)))
            .unwrap();
        assert_eq!(ctx.hovered, None);
    }
}
