//! One-shot actions on the selection: grouping, deletion, clipboard,
//! history, reordering and alignment.

use super::{Action, AlignKind, Tool, ToolKind};
use crate::codec::Bundle;
use crate::command::{Command, CompoundCommand, EntitySet, MoveCommand, ZOrderCommand};
use crate::context::EditorContext;
use crate::entity::EntityId;
use crate::error::{EditorError, EditorResult, ValidationError};
use crate::hit_test::top_level_items;
use crate::z_order::ZOrder;
use kurbo::{Rect, Vec2};
use uuid::Uuid;

/// Runs its action when activated. The manager deactivates it right after,
/// whether or not the action succeeded.
#[derive(Debug)]
pub struct ActionTool {
    action: Action,
}

impl ActionTool {
    pub fn new(action: Action) -> Self {
        Self { action }
    }

    pub fn action(&self) -> Action {
        self.action
    }
}

impl Tool for ActionTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Action(self.action)
    }

    fn on_activate(&mut self, ctx: &mut EditorContext) -> EditorResult<()> {
        log::debug!("Running {}", self.kind());
        match self.action {
            Action::Group => group(ctx),
            Action::Ungroup => ungroup(ctx),
            Action::Delete => delete(ctx),
            Action::Copy => copy(ctx),
            Action::Cut => {
                copy(ctx)?;
                delete(ctx)
            }
            Action::Paste => paste(ctx),
            Action::Undo => {
                ctx.undo.undo(&mut ctx.document)?;
                ctx.sync_selection();
                ctx.view.invalidate(None);
                Ok(())
            }
            Action::Redo => {
                ctx.undo.redo(&mut ctx.document)?;
                ctx.sync_selection();
                ctx.view.invalidate(None);
                Ok(())
            }
            Action::SelectAll => {
                let items = top_level_items(&ctx.document);
                ctx.selection.select_all(items);
                ctx.view.invalidate(None);
                Ok(())
            }
            Action::SendToFront => reorder(ctx, ZOrder::ToFront),
            Action::SendToBack => reorder(ctx, ZOrder::ToBack),
            Action::SendForwards => reorder(ctx, ZOrder::Forwards(0)),
            Action::SendBackwards => reorder(ctx, ZOrder::Backwards(0)),
            Action::Align(kind) => align(ctx, kind),
        }
    }
}

/// Selected items ordered by their lowest leaf.
fn ordered_items(ctx: &EditorContext) -> Vec<EntityId> {
    let mut items = ctx.selection.items().to_vec();
    items.sort_by_key(|&id| {
        ctx.document
            .z_range(id)
            .map_or(usize::MAX, |(min, _)| min)
    });
    items
}

fn require_selection(ctx: &EditorContext) -> EditorResult<()> {
    if ctx.selection.is_empty() {
        return Err(ValidationError::EmptySelection.into());
    }
    Ok(())
}

fn group(ctx: &mut EditorContext) -> EditorResult<()> {
    if ctx.selection.len() < 2 {
        return Err(ValidationError::GroupNeedsTwoItems.into());
    }
    let members = ordered_items(ctx);
    let count = members.len();
    let group = Uuid::new_v4();
    ctx.execute(Command::Group { group, members })?;
    ctx.selection.select(group);
    log::info!("Grouped {} items into {}", count, group);
    Ok(())
}

fn ungroup(ctx: &mut EditorContext) -> EditorResult<()> {
    let groups: Vec<_> = ctx
        .selection
        .items()
        .iter()
        .filter_map(|&id| ctx.document.entity(id))
        .filter(|e| e.is_group())
        .cloned()
        .collect();
    if groups.is_empty() {
        return Err(ValidationError::UngroupNeedsGroup.into());
    }
    let released: Vec<EntityId> = groups
        .iter()
        .filter_map(|g| g.as_group())
        .flat_map(|g| g.members.iter().copied())
        .collect();
    let ids: Vec<EntityId> = groups.iter().map(|g| g.id()).collect();
    let compound = CompoundCommand::from(
        groups
            .into_iter()
            .map(|group| Command::Ungroup { group })
            .collect::<Vec<_>>(),
    );
    ctx.execute(Command::Compound(compound))?;
    for id in ids {
        ctx.selection.remove(id);
    }
    for id in released {
        ctx.selection.add(id);
    }
    Ok(())
}

fn delete(ctx: &mut EditorContext) -> EditorResult<()> {
    require_selection(ctx)?;
    let set = EntitySet::capture(&ctx.document, ctx.selection.items());
    let count = set.records.len();
    ctx.execute(Command::Delete(set))?;
    ctx.selection.clear();
    ctx.sync_selection();
    log::info!("Deleted {} entities", count);
    Ok(())
}

fn copy(ctx: &mut EditorContext) -> EditorResult<()> {
    require_selection(ctx)?;
    let bundle = Bundle::from_items(&ctx.document, ctx.selection.items());
    let bytes = ctx
        .codec
        .serialize(&bundle)
        .map_err(|err| EditorError::operation_failed("copy", err))?;
    ctx.clipboard
        .set(bytes)
        .map_err(|err| EditorError::operation_failed("copy", err))?;
    log::info!("Copied {} entities", bundle.entities.len());
    Ok(())
}

fn paste(ctx: &mut EditorContext) -> EditorResult<()> {
    let bytes = ctx
        .clipboard
        .get()
        .map_err(|err| EditorError::operation_failed("paste", err))?
        .ok_or(ValidationError::EmptyClipboard)?;
    let bundle = ctx
        .codec
        .deserialize(&bytes)
        .map_err(|err| EditorError::operation_failed("paste", err))?;
    if bundle.is_empty() {
        return Err(ValidationError::EmptyClipboard.into());
    }
    let set = bundle.into_entity_set(ctx.config.paste_offset);
    let pasted: Vec<EntityId> = set
        .records
        .iter()
        .filter(|r| r.entity.parent.is_none())
        .map(|r| r.entity.id())
        .collect();
    ctx.execute(Command::Add(set))?;
    log::info!("Pasted {} items", pasted.len());
    ctx.selection.select_all(pasted);
    Ok(())
}

fn reorder(ctx: &mut EditorContext, op: ZOrder) -> EditorResult<()> {
    require_selection(ctx)?;
    let leaves = ctx.selected_leaves();
    let command = ZOrderCommand::new(&ctx.document, op, &leaves);
    log::debug!("Reordering {} leaves with {:?}", leaves.len(), command.op);
    ctx.execute(Command::ZOrder(command))
}

fn align_delta(kind: AlignKind, target: Rect, item: Rect) -> Vec2 {
    match kind {
        AlignKind::Left => Vec2::new(target.x0 - item.x0, 0.0),
        AlignKind::Right => Vec2::new(target.x1 - item.x1, 0.0),
        AlignKind::Top => Vec2::new(0.0, target.y0 - item.y0),
        AlignKind::Bottom => Vec2::new(0.0, target.y1 - item.y1),
        AlignKind::CenterHorizontal => Vec2::new(target.center().x - item.center().x, 0.0),
        AlignKind::CenterVertical => Vec2::new(0.0, target.center().y - item.center().y),
    }
}

fn align(ctx: &mut EditorContext, kind: AlignKind) -> EditorResult<()> {
    if ctx.selection.len() < 2 {
        return Err(ValidationError::AlignNeedsTwoItems.into());
    }
    let Some(target) = ctx.selection.bounds(&ctx.document) else {
        return Err(ValidationError::AlignNeedsTwoItems.into());
    };
    let mut compound = CompoundCommand::new();
    for &item in ctx.selection.items() {
        let Some(bounds) = ctx.document.bounds_of(item) else {
            continue;
        };
        let delta = align_delta(kind, target, bounds);
        if delta == Vec2::ZERO {
            continue;
        }
        let leaves = ctx.document.leaves(item);
        compound.push(Command::Move(MoveCommand::new(&ctx.document, &leaves, delta)));
    }
    if compound.is_empty() {
        return Ok(());
    }
    ctx.execute(Command::Compound(compound))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Clipboard;
    use crate::entity::ShapeKind;
    use crate::error::ClipboardError;

    fn two_shapes() -> (EditorContext, EntityId, EntityId) {
        let mut ctx = EditorContext::default();
        let a = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = ctx.document.add_shape(ShapeKind::Rectangle, Rect::new(30.0, 20.0, 50.0, 60.0));
        (ctx, a, b)
    }

    fn run(ctx: &mut EditorContext, action: Action) -> EditorResult<()> {
        ActionTool::new(action).on_activate(ctx)
    }

    #[test]
    fn test_group_requires_two_items() {
        let (mut ctx, a, _) = two_shapes();
        ctx.selection.select(a);
        let err = run(&mut ctx, Action::Group).unwrap_err();
        assert!(err.is_validation());
        assert!(!ctx.undo.can_undo());
    }

    #[test]
    fn test_group_then_ungroup() {
        let (mut ctx, a, b) = two_shapes();
        ctx.selection.select_all([b, a]);
        run(&mut ctx, Action::Group).unwrap();
        let group = ctx.selection.items()[0];
        assert_eq!(ctx.document.entity(group).unwrap().as_group().unwrap().members, vec![a, b]);

        run(&mut ctx, Action::Ungroup).unwrap();
        assert!(!ctx.document.contains(group));
        assert_eq!(ctx.selection.items(), &[a, b]);
    }

    #[test]
    fn test_align_left_and_undo() {
        let (mut ctx, a, b) = two_shapes();
        ctx.selection.select_all([a, b]);
        run(&mut ctx, Action::Align(AlignKind::Left)).unwrap();
        assert_eq!(ctx.document.bounds_of(b), Some(Rect::new(0.0, 20.0, 20.0, 60.0)));

        run(&mut ctx, Action::Align(AlignKind::Bottom)).unwrap();
        assert_eq!(ctx.document.bounds_of(a), Some(Rect::new(0.0, 50.0, 10.0, 60.0)));

        run(&mut ctx, Action::Undo).unwrap();
        run(&mut ctx, Action::Undo).unwrap();
        assert_eq!(ctx.document.bounds_of(b), Some(Rect::new(30.0, 20.0, 50.0, 60.0)));
    }

    #[test]
    fn test_cut_and_paste() {
        let (mut ctx, a, _) = two_shapes();
        ctx.selection.select(a);
        run(&mut ctx, Action::Cut).unwrap();
        assert!(!ctx.document.contains(a));
        assert!(ctx.selection.is_empty());

        run(&mut ctx, Action::Paste).unwrap();
        let pasted = ctx.selection.items()[0];
        assert_ne!(pasted, a);
        assert_eq!(ctx.document.bounds_of(pasted), Some(Rect::new(10.0, 10.0, 20.0, 20.0)));
    }

    #[test]
    fn test_paste_with_empty_clipboard() {
        let (mut ctx, _, _) = two_shapes();
        let err = run(&mut ctx, Action::Paste).unwrap_err();
        assert!(matches!(err, EditorError::Validation(ValidationError::EmptyClipboard)));
    }

    struct BrokenClipboard;

    impl Clipboard for BrokenClipboard {
        fn set(&mut self, _bytes: Vec<u8>) -> Result<(), ClipboardError> {
            Err(ClipboardError::Unavailable("locked".to_string()))
        }

        fn get(&self) -> Result<Option<Vec<u8>>, ClipboardError> {
            Err(ClipboardError::Unavailable("locked".to_string()))
        }
    }

    #[test]
    fn test_clipboard_failure_is_operation_failed() {
        let (ctx, a, _) = two_shapes();
        let mut ctx = ctx.with_clipboard(BrokenClipboard);
        ctx.selection.select(a);
        let err = run(&mut ctx, Action::Copy).unwrap_err();
        assert!(matches!(err, EditorError::OperationFailed { operation: "copy", .. }));
    }

    #[test]
    fn test_send_to_back() {
        let (mut ctx, a, b) = two_shapes();
        ctx.selection.select(b);
        run(&mut ctx, Action::SendToBack).unwrap();
        assert_eq!(ctx.document.paintables(), &[b, a]);
        run(&mut ctx, Action::Undo).unwrap();
        assert_eq!(ctx.document.paintables(), &[a, b]);
    }
}
