//! Dragging and nudging the selection.

use super::{Tool, ToolKind, ToolRequest};
use crate::command::{Command, MoveCommand};
use crate::context::{Cursor, EditorContext};
use crate::document::EntitySnapshot;
use crate::error::EditorResult;
use crate::hit_test::collect_entity_at;
use crate::input::{EventResult, Key, KeyEvent, MouseButton, PointerInput};
use kurbo::{Point, Vec2};

#[derive(Debug)]
struct MoveGesture {
    start: Point,
    before: Vec<EntitySnapshot>,
    delta: Vec2,
}

/// Moves the selected items by drag (applied live) or by arrow keys.
#[derive(Debug, Default)]
pub struct MoveTool {
    gesture: Option<MoveGesture>,
}

impl MoveTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(ctx: &mut EditorContext, before: &[EntitySnapshot], delta: Vec2) {
        for snapshot in before {
            ctx.document.apply_snapshot(&snapshot.translated(delta));
        }
        ctx.view.invalidate(None);
    }
}

impl Tool for MoveTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Move
    }

    fn on_pointer_down(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        if input.button != MouseButton::Left || input.modifiers.shift || ctx.blocking.move_blocked {
            return Ok(EventResult::Ignored);
        }
        let Some(leaf) = collect_entity_at(&ctx.document, input.position, ctx.config.hit_tolerance) else {
            return Ok(EventResult::Ignored);
        };
        if ctx.document.entity(leaf).is_some_and(|e| e.capabilities.mouse) {
            return Ok(EventResult::Ignored);
        }
        let item = ctx.document.outermost(leaf);
        if !ctx.selection.contains(item) {
            ctx.selection.select(item);
        }
        let before = ctx
            .selected_leaves()
            .iter()
            .filter_map(|&id| ctx.document.snapshot(id))
            .collect();
        self.gesture = Some(MoveGesture {
            start: input.position,
            before,
            delta: Vec2::ZERO,
        });
        ctx.request(ToolRequest::SuspendOthers);
        ctx.view.set_cursor(Cursor::Move);
        Ok(EventResult::Handled)
    }

    fn on_pointer_move(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(gesture) = self.gesture.as_mut() else {
            return Ok(EventResult::Ignored);
        };
        gesture.delta = input.position - gesture.start;
        Self::apply(ctx, &gesture.before, gesture.delta);
        Ok(EventResult::Handled)
    }

    fn on_pointer_up(&mut self, ctx: &mut EditorContext, input: &PointerInput) -> EditorResult<EventResult> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(EventResult::Ignored);
        };
        gesture.delta = input.position - gesture.start;
        Self::apply(ctx, &gesture.before, gesture.delta);
        if gesture.delta != Vec2::ZERO {
            ctx.record(Command::Move(MoveCommand {
                before: gesture.before,
                delta: gesture.delta,
            }));
        }
        ctx.request(ToolRequest::UnsuspendAll);
        ctx.view.set_cursor(Cursor::Default);
        Ok(EventResult::Handled)
    }

    fn on_key_down(&mut self, ctx: &mut EditorContext, event: &KeyEvent) -> EditorResult<EventResult> {
        if ctx.selection.is_empty() || ctx.blocking.move_blocked || event.modifiers.command() {
            return Ok(EventResult::Ignored);
        }
        let step = if event.modifiers.shift {
            ctx.config.nudge_step * 10.0
        } else {
            ctx.config.nudge_step
        };
        let delta = match event.key {
            Key::ArrowLeft => Vec2::new(-step, 0.0),
            Key::ArrowRight => Vec2::new(step, 0.0),
            Key::ArrowUp => Vec2::new(0.0, -step),
            Key::ArrowDown => Vec2::new(0.0, step),
            _ => return Ok(EventResult::Ignored),
        };
        let leaves = ctx.selected_leaves();
        let command = Command::Move(MoveCommand::new(&ctx.document, &leaves, delta));
        ctx.execute(command)?;
        Ok(EventResult::Handled)
    }

    fn cancel(&mut self, ctx: &mut EditorContext) {
        if let Some(gesture) = self.gesture.take() {
            Self::apply(ctx, &gesture.before, Vec2::ZERO);
            ctx.request(ToolRequest::UnsuspendAll);
            ctx.view.set_cursor(Cursor::Default);
        }
    }

    fn is_busy(&self) -> bool {
        self.gesture.is_some()
    }
}
