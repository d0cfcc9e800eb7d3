//! Click, shift-click and marquee selection, plus label typing.

use super::{DragRect, Tool, ToolKind, ToolRequest};
use crate::command::Command;
use crate::context::{EditorContext, Ghost};
use crate::error::EditorResult;
use crate::hit_test::{collect_entities_inside, collect_entity_at};
use crate::input::{EventResult, Key, KeyEvent, MouseButton, PointerInput};

/// Lowest priority listener: selects what was clicked, or marquee-selects on
/// empty canvas.
#[derive(Debug, Default)]
pub struct SelectTool {
    marquee: Option<DragRect>,
    /// Shift held at marquee start: add to the selection instead of replacing it.
    extend: bool,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish_marquee(&mut self, ctx: &mut EditorContext) {
        self.marquee = None;
        ctx.view.clear_ghost();
        ctx.request(ToolRequest::UnsuspendAll);
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn on_pointer_down(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if input.button != MouseButton::Left {
            return Ok(EventResult::Ignored);
        }
        let hit = collect_entity_at(&ctx.document, input.position, ctx.config.hit_tolerance);
        match hit {
            Some(leaf) => {
                let item = ctx.document.outermost(leaf);
                if input.modifiers.shift {
                    ctx.selection.toggle(item);
                } else {
                    ctx.selection.select(item);
                }
            }
            None => {
                if !input.modifiers.shift {
                    ctx.selection.clear();
                }
                self.marquee = Some(DragRect::new(input.position));
                self.extend = input.modifiers.shift;
                ctx.request(ToolRequest::SuspendOthers);
                log::debug!("Marquee started at {:?}", input.position);
            }
        }
        ctx.view.invalidate(None);
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(marquee) = self.marquee.as_mut() else {
            return Ok(EventResult::Ignored);
        };
        marquee.update(input.position);
        ctx.view.show_ghost(Ghost::Marquee(marquee.rect()));
        Ok(EventResult::Handled)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(mut marquee) = self.marquee else {
            return Ok(EventResult::Ignored);
        };
        marquee.update(input.position);
        let found = collect_entities_inside(&ctx.document, marquee.rect(), ctx.config.inclusion_mode);
        if self.extend {
            for id in found {
                ctx.selection.add(id);
            }
        } else {
            ctx.selection.select_all(found);
        }
        log::debug!("Marquee selected {} items", ctx.selection.len());
        self.finish_marquee(ctx);
        ctx.view.invalidate(None);
        Ok(EventResult::Handled)
    }

    fn on_key_press(&mut self, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
        let Key::Char(c) = event.key else {
            return Ok(EventResult::Ignored);
        };
        if event.modifiers.command() || c.is_control() {
            return Ok(EventResult::Ignored);
        }
        let [id] = ctx.selection.items() else {
            return Ok(EventResult::Ignored);
        };
        let id = *id;
        let Some(entity) = ctx.document.entity(id) else {
            return Ok(EventResult::Ignored);
        };
        if !entity.capabilities.keyboard {
            return Ok(EventResult::Ignored);
        }
        let before = entity.label.clone();
        let mut after = before.clone().unwrap_or_default();
        after.push(c);
        ctx.execute(Command::SetLabel {
            entity: id,
            before,
            after: Some(after),
        })?;
        Ok(EventResult::Handled)
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        if self.marquee.is_some() {
            self.finish_marquee(ctx);
        }
    }

    fn is_busy(&self) -> bool {
        self.marquee.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use crate::input::Modifiers;
    use kurbo::{Point, Rect};

    fn shift() -> Modifiers {
        Modifiers {
            shift: true,
            ..Modifiers::default()
        }
    }

    #[test]
    fn test_click_and_shift_click() {
        let mut ctx = EditorContext::default();
        let a = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(20.0, 0.0, 30.0, 10.0));
        let mut tool = SelectTool::new();

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(5.0, 5.0))).unwrap();
        assert_eq!(ctx.selection.items(), &[a]);

        let shifted = PointerInput::at(Point::new(25.0, 5.0)).with_modifiers(shift());
        tool.on_pointer_down(&mut ctx, &shifted).unwrap();
        assert_eq!(ctx.selection.items(), &[a, b]);
        tool.on_pointer_down(&mut ctx, &shifted).unwrap();
        assert_eq!(ctx.selection.items(), &[a]);
    }

    #[test]
    fn test_marquee_selects_contained() {
        let mut ctx = EditorContext::default();
        let a = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(10.0, 10.0, 20.0, 20.0));
        ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(40.0, 40.0, 80.0, 80.0));
        let mut tool = SelectTool::new();

        tool.on_pointer_down(&mut ctx, &PointerInput::at(Point::new(0.0, 0.0))).unwrap();
        assert!(tool.is_busy());
        assert_eq!(ctx.take_requests(), vec![ToolRequest::SuspendOthers]);
        tool.on_pointer_move(&mut ctx, &PointerInput::at(Point::new(50.0, 50.0))).unwrap();
        tool.on_pointer_up(&mut ctx, &PointerInput::at(Point::new(50.0, 50.0))).unwrap();

        assert!(!tool.is_busy());
        assert_eq!(ctx.selection.items(), &[a]);
        assert_eq!(ctx.take_requests(), vec![ToolRequest::UnsuspendAll]);
    }

    #[test]
    fn test_typing_sets_label() {
        let mut ctx = EditorContext::default();
        let a = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        ctx.selection.select(a);
        let mut tool = SelectTool::new();

        tool.on_key_press(&mut ctx, &KeyEvent::press(Key::Char('h'))).unwrap();
        tool.on_key_press(&mut ctx, &KeyEvent::press(Key::Char('i'))).unwrap();
        assert_eq!(ctx.document.entity(a).unwrap().label.as_deref(), Some("hi"));

        ctx.undo.undo(&mut ctx.document).unwrap();
        assert_eq!(ctx.document.entity(a).unwrap().label.as_deref(), Some("h"));
    }
}
