//! Reversible edits.
//!
//! Every change to the document goes through a [`Command`]. A command either
//! gets applied right away by [`UndoManager::execute`], or describes a change a
//! gesture already applied live and is registered with
//! [`UndoManager::add_undo_command`] so it is not applied twice.

mod history;

pub use history::UndoManager;

use crate::connector::{Connector, ConnectorId};
use crate::document::{Document, EntitySnapshot};
use crate::entity::{Entity, EntityId};
use crate::error::EditorResult;
use crate::transform::{apply_scale, restore_bones, EntityBone};
use crate::z_order::{self, ZOrder};
use kurbo::{Point, Vec2};
use std::collections::HashSet;

/// One entity with its connectors, as removed from or inserted into a document.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub entity: Entity,
    /// Owned connectors, stripped of their relations.
    pub connectors: Vec<Connector>,
    /// Paint position. `None` places leaves on top.
    pub z_index: Option<usize>,
}

/// A set of entities plus the connector relations that involve them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitySet {
    /// Leaves in ascending paint order, then groups.
    pub records: Vec<EntityRecord>,
    pub links: Vec<(ConnectorId, ConnectorId)>,
}

impl EntitySet {
    /// Capture top-level `items` and everything nested in them, as they are now.
    pub fn capture(doc: &Document, items: &[EntityId]) -> Self {
        let mut seen = HashSet::new();
        let mut ids: Vec<EntityId> = items
            .iter()
            .flat_map(|&item| doc.subtree(doc.outermost(item)))
            .filter(|&id| seen.insert(id))
            .collect();
        ids.sort_by_key(|&id| doc.z_index(id).unwrap_or(usize::MAX));

        let mut links = Vec::new();
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(entity) = doc.entity(id) else {
                continue;
            };
            let connectors = entity
                .connectors
                .iter()
                .filter_map(|&c| doc.connectors().get(c))
                .map(|c| {
                    for link in doc.connectors().relations(c.id()) {
                        if !links.contains(&link) {
                            links.push(link);
                        }
                    }
                    let mut stripped = c.clone();
                    stripped.attached_to = None;
                    stripped.attached.clear();
                    stripped
                })
                .collect();
            records.push(EntityRecord {
                entity: entity.clone(),
                connectors,
                z_index: doc.z_index(id),
            });
        }
        Self { records, links }
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.records.iter().map(|r| r.entity.id()).collect()
    }

    /// Insert every record and re-link the captured relations.
    pub fn restore(&self, doc: &mut Document) {
        for record in &self.records {
            doc.insert(record.entity.clone(), record.connectors.clone(), record.z_index);
        }
        for &(parent, child) in &self.links {
            doc.connectors_mut().link(parent, child);
        }
        for record in &self.records {
            if let Some(parent) = record.entity.parent {
                if !self.records.iter().any(|r| r.entity.id() == parent) {
                    if let Some(group) = doc.entity_mut(parent).and_then(Entity::as_group_mut) {
                        if !group.members.contains(&record.entity.id()) {
                            group.members.push(record.entity.id());
                        }
                    }
                }
            }
            doc.refresh_ancestors(record.entity.id());
        }
    }

    /// Remove every record, topmost first.
    pub fn remove(&self, doc: &mut Document) {
        for record in self.records.iter().rev() {
            let id = record.entity.id();
            if let Some(parent) = record.entity.parent {
                if let Some(group) = doc.entity_mut(parent).and_then(Entity::as_group_mut) {
                    group.members.retain(|&m| m != id);
                }
            }
            doc.remove(id);
        }
    }
}

/// Translation of a bundle of leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    /// Geometry of every moved leaf before the move.
    pub before: Vec<EntitySnapshot>,
    pub delta: Vec2,
}

impl MoveCommand {
    /// Capture the current geometry of `leaves` for a move by `delta`.
    pub fn new(doc: &Document, leaves: &[EntityId], delta: Vec2) -> Self {
        Self {
            before: leaves.iter().filter_map(|&id| doc.snapshot(id)).collect(),
            delta,
        }
    }

    fn redo(&self, doc: &mut Document) {
        for snapshot in &self.before {
            doc.apply_snapshot(&snapshot.translated(self.delta));
        }
    }

    fn undo(&self, doc: &mut Document) {
        for snapshot in &self.before {
            doc.apply_snapshot(snapshot);
        }
    }
}

/// Resize of a bundle around a fixed origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformCommand {
    pub origin: Point,
    pub scale_x: f64,
    pub scale_y: f64,
    pub bones: Vec<EntityBone>,
}

/// Position and parent of a connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorState {
    pub position: Point,
    pub parent: Option<ConnectorId>,
}

impl ConnectorState {
    pub fn of(doc: &Document, connector: ConnectorId) -> Option<Self> {
        let c = doc.connectors().get(connector)?;
        Some(Self {
            position: c.position,
            parent: c.attached_to(),
        })
    }
}

/// A connector dragged from one state to another, possibly re-attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorMoveCommand {
    pub connector: ConnectorId,
    pub before: ConnectorState,
    pub after: ConnectorState,
}

/// Put a connector into `state`, detaching from or attaching to parents as needed.
pub(crate) fn apply_connector_state(
    doc: &mut Document,
    connector: ConnectorId,
    state: ConnectorState,
) -> EditorResult<()> {
    let graph = doc.connectors_mut();
    let current = graph.parent(connector);
    if current != state.parent {
        if let Some(parent) = current {
            graph.detach(parent, connector)?;
        }
    }
    graph.set_position(connector, state.position);
    if let Some(parent) = state.parent {
        graph.attach(parent, connector)?;
    }
    if let Some(owner) = doc.connectors().get(connector).map(|c| c.owner) {
        doc.refresh_ancestors(owner);
    }
    Ok(())
}

/// A paint order change.
#[derive(Debug, Clone, PartialEq)]
pub struct ZOrderCommand {
    pub op: ZOrder,
    pub leaves: Vec<EntityId>,
    /// Paint order before the first application.
    pub before: Vec<EntityId>,
}

impl ZOrderCommand {
    /// Plan a reorder of `leaves` against the current layout.
    pub fn new(doc: &Document, op: ZOrder, leaves: &[EntityId]) -> Self {
        Self {
            op: z_order::plan(doc, op, leaves),
            leaves: leaves.to_vec(),
            before: doc.paintables().to_vec(),
        }
    }
}

/// Commands applied as one unit: forward on redo, reverse on undo.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompoundCommand {
    pub commands: Vec<Command>,
}

impl CompoundCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl From<Vec<Command>> for CompoundCommand {
    fn from(commands: Vec<Command>) -> Self {
        Self { commands }
    }
}

/// A reversible edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert entities.
    Add(EntitySet),
    /// Remove entities, dropping their connector relations until undone.
    Delete(EntitySet),
    Move(MoveCommand),
    Transform(TransformCommand),
    Attach {
        parent: ConnectorId,
        child: ConnectorId,
    },
    Detach {
        parent: ConnectorId,
        child: ConnectorId,
    },
    ConnectorMove(ConnectorMoveCommand),
    /// Wrap top-level items into a new group.
    Group {
        group: EntityId,
        members: Vec<EntityId>,
    },
    /// Dissolve a group. Holds the group as it was.
    Ungroup { group: Entity },
    ZOrder(ZOrderCommand),
    SetLabel {
        entity: EntityId,
        before: Option<String>,
        after: Option<String>,
    },
    Compound(CompoundCommand),
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Delete(_) => "delete",
            Command::Move(_) => "move",
            Command::Transform(_) => "transform",
            Command::Attach { .. } => "attach",
            Command::Detach { .. } => "detach",
            Command::ConnectorMove(_) => "connector move",
            Command::Group { .. } => "group",
            Command::Ungroup { .. } => "ungroup",
            Command::ZOrder(_) => "z-order",
            Command::SetLabel { .. } => "set label",
            Command::Compound(_) => "compound",
        }
    }

    /// Apply the edit.
    pub fn redo(&self, doc: &mut Document) -> EditorResult<()> {
        match self {
            Command::Add(set) => set.restore(doc),
            Command::Delete(set) => set.remove(doc),
            Command::Move(cmd) => cmd.redo(doc),
            Command::Transform(cmd) => apply_scale(doc, cmd.origin, cmd.scale_x, cmd.scale_y, &cmd.bones),
            Command::Attach { parent, child } => doc.connectors_mut().attach(*parent, *child)?,
            Command::Detach { parent, child } => doc.connectors_mut().detach(*parent, *child)?,
            Command::ConnectorMove(cmd) => apply_connector_state(doc, cmd.connector, cmd.after)?,
            Command::Group { group, members } => doc.group(*group, members),
            Command::Ungroup { group } => {
                doc.ungroup(group.id());
            }
            Command::ZOrder(cmd) => {
                doc.set_paint_order(cmd.before.clone());
                z_order::apply(doc, cmd.op, &cmd.leaves);
            }
            Command::SetLabel { entity, after, .. } => set_label(doc, *entity, after.clone()),
            Command::Compound(compound) => {
                for (applied, command) in compound.commands.iter().enumerate() {
                    if let Err(err) = command.redo(doc) {
                        for done in compound.commands[..applied].iter().rev() {
                            done.undo(doc)?;
                        }
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    /// Reverse the edit.
    pub fn undo(&self, doc: &mut Document) -> EditorResult<()> {
        match self {
            Command::Add(set) => set.remove(doc),
            Command::Delete(set) => set.restore(doc),
            Command::Move(cmd) => cmd.undo(doc),
            Command::Transform(cmd) => restore_bones(doc, &cmd.bones),
            Command::Attach { parent, child } => doc.connectors_mut().detach(*parent, *child)?,
            Command::Detach { parent, child } => doc.connectors_mut().attach(*parent, *child)?,
            Command::ConnectorMove(cmd) => apply_connector_state(doc, cmd.connector, cmd.before)?,
            Command::Group { group, .. } => {
                doc.ungroup(*group);
            }
            Command::Ungroup { group } => doc.restore_group(group.clone()),
            Command::ZOrder(cmd) => doc.set_paint_order(cmd.before.clone()),
            Command::SetLabel { entity, before, .. } => set_label(doc, *entity, before.clone()),
            Command::Compound(compound) => {
                for command in compound.commands.iter().rev() {
                    command.undo(doc)?;
                }
            }
        }
        Ok(())
    }
}

fn set_label(doc: &mut Document, entity: EntityId, label: Option<String>) {
    if let Some(e) = doc.entity_mut(entity) {
        e.label = label;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use kurbo::Rect;
    use uuid::Uuid;

    fn label(doc: &Document, id: EntityId) -> Option<String> {
        doc.entity(id).and_then(|e| e.label.clone())
    }

    fn set(id: EntityId, before: Option<&str>, after: &str) -> Command {
        Command::SetLabel {
            entity: id,
            before: before.map(str::to_string),
            after: Some(after.to_string()),
        }
    }

    #[test]
    fn test_compound_undo_runs_in_reverse() {
        let mut doc = Document::new();
        let id = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let compound = Command::Compound(CompoundCommand::from(vec![
            set(id, None, "a"),
            set(id, Some("a"), "b"),
            set(id, Some("b"), "c"),
        ]));

        compound.redo(&mut doc).unwrap();
        assert_eq!(label(&doc, id).as_deref(), Some("c"));
        // Forward-order undo would leave "b" behind.
        compound.undo(&mut doc).unwrap();
        assert_eq!(label(&doc, id), None);
    }

    #[test]
    fn test_compound_rolls_back_on_failure() {
        let mut doc = Document::new();
        let id = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let anchors = doc.entity(id).unwrap().connectors.clone();
        let compound = Command::Compound(CompoundCommand::from(vec![
            set(id, None, "a"),
            Command::Attach {
                parent: anchors[0],
                child: anchors[0],
            },
        ]));

        assert!(compound.redo(&mut doc).is_err());
        assert_eq!(label(&doc, id), None);
    }

    #[test]
    fn test_move_undo_is_exact() {
        let mut doc = Document::new();
        let a = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.1, 0.2, 10.3, 10.7));
        let b = doc.add_polygon(vec![Point::new(1.0 / 3.0, 0.0), Point::new(5.0, 2.0 / 3.0)], false);
        let before_a = doc.bounds_of(a);
        let before_b = doc.bounds_of(b);

        let cmd = Command::Move(MoveCommand::new(&doc, &[a, b], Vec2::new(0.7, -1.3)));
        cmd.redo(&mut doc).unwrap();
        assert_eq!(doc.bounds_of(a), before_a.map(|r| r + Vec2::new(0.7, -1.3)));

        cmd.undo(&mut doc).unwrap();
        assert_eq!(doc.bounds_of(a), before_a);
        assert_eq!(doc.bounds_of(b), before_b);
    }

    #[test]
    fn test_delete_restores_external_attachment() {
        let mut doc = Document::new();
        let shape = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 50.0));
        let other = doc.add_shape(ShapeKind::Rectangle, Rect::new(300.0, 0.0, 400.0, 50.0));
        let line = doc.add_connection(Point::new(200.0, 200.0), Point::new(300.0, 300.0));
        let anchor = doc.entity(shape).unwrap().connectors[1];
        let start = doc.entity(line).unwrap().as_connection().unwrap().start;
        doc.connectors_mut().attach(anchor, start).unwrap();

        let cmd = Command::Delete(EntitySet::capture(&doc, &[shape]));
        cmd.redo(&mut doc).unwrap();
        assert!(!doc.contains(shape));
        assert_eq!(doc.connectors().parent(start), None);
        assert_eq!(doc.paintables(), &[other, line]);

        cmd.undo(&mut doc).unwrap();
        assert_eq!(doc.paintables(), &[shape, other, line]);
        assert_eq!(doc.connectors().parent(start), Some(anchor));
        assert!(doc.connectors().is_consistent());
    }

    #[test]
    fn test_group_and_ungroup_commands() {
        let mut doc = Document::new();
        let a = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = doc.add_shape(ShapeKind::Rectangle, Rect::new(20.0, 0.0, 30.0, 10.0));
        let group = Uuid::new_v4();

        let cmd = Command::Group {
            group,
            members: vec![a, b],
        };
        cmd.redo(&mut doc).unwrap();
        assert_eq!(doc.outermost(a), group);

        let ungroup = Command::Ungroup {
            group: doc.entity(group).unwrap().clone(),
        };
        ungroup.redo(&mut doc).unwrap();
        assert!(!doc.contains(group));
        assert_eq!(doc.entity(a).unwrap().parent, None);

        ungroup.undo(&mut doc).unwrap();
        assert_eq!(doc.bounds_of(group), Some(Rect::new(0.0, 0.0, 30.0, 10.0)));
        cmd.undo(&mut doc).unwrap();
        assert!(!doc.contains(group));
    }

    #[test]
    fn test_connector_move_restores_attachment() {
        let mut doc = Document::new();
        let shape = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let line = doc.add_connection(Point::new(200.0, 200.0), Point::new(300.0, 300.0));
        let anchor = doc.entity(shape).unwrap().connectors[0];
        let start = doc.entity(line).unwrap().as_connection().unwrap().start;
        doc.connectors_mut().attach(anchor, start).unwrap();

        let before = ConnectorState::of(&doc, start).unwrap();
        let after = ConnectorState {
            position: Point::new(250.0, 10.0),
            parent: None,
        };
        let cmd = Command::ConnectorMove(ConnectorMoveCommand {
            connector: start,
            before,
            after,
        });

        cmd.redo(&mut doc).unwrap();
        assert_eq!(doc.connectors().parent(start), None);
        cmd.undo(&mut doc).unwrap();
        assert_eq!(doc.connectors().parent(start), Some(anchor));
        assert_eq!(doc.connectors().get(start).unwrap().position, Point::new(50.0, 0.0));
    }
}
