//! Diagram document: entities, paint order and the connector graph.

use crate::connector::{Connector, ConnectorGraph, ConnectorId, ConnectorRole, End};
use crate::entity::{
    point_to_segment_dist, Capabilities, Connection, Entity, EntityId, EntityKind, Geometry,
    Group, Polygon, Shape, ShapeKind,
};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Position-only snapshot of an entity, enough to put it back where it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub geometry: Geometry,
    /// Positions of the entity's connectors that are not attached to a parent.
    pub free_connectors: Vec<(ConnectorId, Point)>,
}

impl EntitySnapshot {
    pub fn translated(&self, delta: Vec2) -> EntitySnapshot {
        EntitySnapshot {
            id: self.id,
            geometry: self.geometry.translated(delta),
            free_connectors: self
                .free_connectors
                .iter()
                .map(|&(id, p)| (id, p + delta))
                .collect(),
        }
    }
}

/// Build a rectangle or ellipse with an anchor on each edge midpoint.
pub fn build_shape(kind: ShapeKind, rect: Rect) -> (Entity, Vec<Connector>) {
    let shape = Shape::new(kind, rect);
    let anchors = shape.anchor_points();
    let mut entity = Entity::new(EntityKind::Shape(shape), Capabilities::default());
    let connectors: Vec<Connector> = anchors
        .iter()
        .map(|&p| Connector::new(entity.id(), ConnectorRole::Anchor, p))
        .collect();
    entity.connectors = connectors.iter().map(Connector::id).collect();
    (entity, connectors)
}

/// Build a polygon or polyline. Polygons carry no connectors.
pub fn build_polygon(points: Vec<Point>, closed: bool) -> (Entity, Vec<Connector>) {
    let capabilities = Capabilities {
        connectable: false,
        ..Capabilities::default()
    };
    let entity = Entity::new(EntityKind::Polygon(Polygon::new(points, closed)), capabilities);
    (entity, Vec::new())
}

/// Build a detached connection between two points.
pub fn build_connection(start: Point, end: Point) -> (Entity, Vec<Connector>) {
    let owner = Uuid::new_v4();
    let start_connector = Connector::new(owner, ConnectorRole::Endpoint(End::Start), start);
    let end_connector = Connector::new(owner, ConnectorRole::Endpoint(End::End), end);
    let mut entity = Entity::new(
        EntityKind::Connection(Connection::new(start_connector.id(), end_connector.id())),
        Capabilities::connection(),
    );
    entity.set_id(owner);
    entity.connectors = vec![start_connector.id(), end_connector.id()];
    (entity, vec![start_connector, end_connector])
}

/// A diagram document containing all entities and their attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All entities, keyed by ID. Includes groups.
    entities: HashMap<EntityId, Entity>,
    /// Paint order of leaf entities, back to front. The index is the z-index.
    paintables: Vec<EntityId>,
    /// Attachment graph of every connector in the document.
    connectors: ConnectorGraph,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            entities: HashMap::new(),
            paintables: Vec::new(),
            connectors: ConnectorGraph::new(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Replace what an entity opts into. `false` if the entity is unknown.
    pub fn set_capabilities(&mut self, id: EntityId, capabilities: Capabilities) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.capabilities = capabilities;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Paint order of leaf entities, back to front.
    pub fn paintables(&self) -> &[EntityId] {
        &self.paintables
    }

    /// Position of a leaf entity in the paint list.
    pub fn z_index(&self, id: EntityId) -> Option<usize> {
        self.paintables.iter().position(|&e| e == id)
    }

    /// Number of painted entities.
    pub fn len(&self) -> usize {
        self.paintables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn connectors(&self) -> &ConnectorGraph {
        &self.connectors
    }

    pub(crate) fn connectors_mut(&mut self) -> &mut ConnectorGraph {
        &mut self.connectors
    }

    /// Add a rectangle or ellipse on top of the paint list.
    pub fn add_shape(&mut self, kind: ShapeKind, rect: Rect) -> EntityId {
        let (entity, connectors) = build_shape(kind, rect);
        self.insert(entity, connectors, None)
    }

    /// Add a polygon or polyline on top of the paint list.
    pub fn add_polygon(&mut self, points: Vec<Point>, closed: bool) -> EntityId {
        let (entity, connectors) = build_polygon(points, closed);
        self.insert(entity, connectors, None)
    }

    /// Add a detached connection on top of the paint list.
    pub fn add_connection(&mut self, start: Point, end: Point) -> EntityId {
        let (entity, connectors) = build_connection(start, end);
        self.insert(entity, connectors, None)
    }

    /// Insert an entity and its connectors. Leaves go into the paint list at
    /// `z_index` (clamped) or on top; groups are never painted.
    pub(crate) fn insert(
        &mut self,
        entity: Entity,
        connectors: Vec<Connector>,
        z_index: Option<usize>,
    ) -> EntityId {
        let id = entity.id();
        if !entity.is_group() {
            let index = z_index
                .unwrap_or(self.paintables.len())
                .min(self.paintables.len());
            self.paintables.insert(index, id);
        }
        for connector in connectors {
            self.connectors.insert(connector);
        }
        self.entities.insert(id, entity);
        id
    }

    /// Remove an entity and its connectors. Attachments to other connectors are dropped.
    pub(crate) fn remove(&mut self, id: EntityId) -> Option<(Entity, Vec<Connector>)> {
        let entity = self.entities.remove(&id)?;
        self.paintables.retain(|&e| e != id);
        let connectors = entity
            .connectors
            .iter()
            .filter_map(|&c| self.connectors.remove(c))
            .collect();
        Some((entity, connectors))
    }

    /// Follow parent links up to the outermost group (or the entity itself).
    pub fn outermost(&self, id: EntityId) -> EntityId {
        let mut current = id;
        while let Some(parent) = self.entities.get(&current).and_then(|e| e.parent) {
            current = parent;
        }
        current
    }

    /// Groups containing `id`, nearest first.
    pub fn ancestors(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(parent) = self.entities.get(&current).and_then(|e| e.parent) {
            result.push(parent);
            current = parent;
        }
        result
    }

    /// `id` and every entity nested below it, groups before their members.
    pub fn subtree(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(entity) = self.entities.get(&current) else {
                continue;
            };
            result.push(current);
            if let Some(group) = entity.as_group() {
                stack.extend(group.members.iter().rev());
            }
        }
        result
    }

    /// Leaf entities under `id` (itself if it is a leaf), in paint order.
    pub fn leaves(&self, id: EntityId) -> Vec<EntityId> {
        let mut result = Vec::new();
        self.collect_leaves(id, &mut result);
        result.sort_by_key(|&leaf| self.z_index(leaf).unwrap_or(usize::MAX));
        result
    }

    fn collect_leaves(&self, id: EntityId, out: &mut Vec<EntityId>) {
        match self.entities.get(&id).map(|e| &e.kind) {
            Some(EntityKind::Group(group)) => {
                for &member in &group.members {
                    self.collect_leaves(member, out);
                }
            }
            Some(_) => out.push(id),
            None => {}
        }
    }

    /// Lowest and highest z-index among a group's leaves.
    pub fn z_range(&self, id: EntityId) -> Option<(usize, usize)> {
        let indices: Vec<usize> = self
            .leaves(id)
            .iter()
            .filter_map(|&leaf| self.z_index(leaf))
            .collect();
        Some((*indices.iter().min()?, *indices.iter().max()?))
    }

    /// Bounding box of an entity.
    pub fn bounds_of(&self, id: EntityId) -> Option<Rect> {
        let entity = self.entities.get(&id)?;
        match &entity.kind {
            EntityKind::Connection(connection) => {
                let start = self.connectors.get(connection.start)?.position;
                let end = self.connectors.get(connection.end)?.position;
                Some(Rect::from_points(start, end))
            }
            _ => entity.intrinsic_bounds(),
        }
    }

    /// Union of the bounds of several entities.
    pub fn union_bounds(&self, ids: &[EntityId]) -> Option<Rect> {
        ids.iter()
            .filter_map(|&id| self.bounds_of(id))
            .reduce(|acc, r| acc.union(r))
    }

    /// Whether `point` hits the entity. Framed shapes test their bounds; thin
    /// entities test the distance to their segments against `tolerance`.
    pub fn hit(&self, id: EntityId, point: Point, tolerance: f64) -> bool {
        let Some(entity) = self.entities.get(&id) else {
            return false;
        };
        match &entity.kind {
            EntityKind::Shape(shape) => rect_contains_point(shape.rect, point),
            EntityKind::Polygon(polygon) if polygon.closed => {
                rect_contains_point(polygon.bounds(), point)
            }
            EntityKind::Polygon(polygon) => polygon
                .segments()
                .iter()
                .any(|&(a, b)| point_to_segment_dist(point, a, b) <= tolerance),
            EntityKind::Connection(connection) => {
                match (
                    self.connectors.get(connection.start),
                    self.connectors.get(connection.end),
                ) {
                    (Some(a), Some(b)) => {
                        point_to_segment_dist(point, a.position, b.position) <= tolerance
                    }
                    _ => false,
                }
            }
            EntityKind::Group(group) => group
                .members
                .iter()
                .any(|&member| self.hit(member, point, tolerance)),
        }
    }

    /// Capture the geometry and free connector positions of a leaf entity.
    pub fn snapshot(&self, id: EntityId) -> Option<EntitySnapshot> {
        let entity = self.entities.get(&id)?;
        let free_connectors = entity
            .connectors
            .iter()
            .filter_map(|&c| self.connectors.get(c))
            .filter(|c| c.attached_to().is_none())
            .map(|c| (c.id(), c.position))
            .collect();
        Some(EntitySnapshot {
            id,
            geometry: entity.geometry(),
            free_connectors,
        })
    }

    /// Put an entity back to a snapshot, drag attached connectors along and
    /// refresh the bounds of enclosing groups.
    pub fn apply_snapshot(&mut self, snapshot: &EntitySnapshot) {
        let Some(entity) = self.entities.get_mut(&snapshot.id) else {
            return;
        };
        entity.set_geometry(&snapshot.geometry);
        for &(connector, position) in &snapshot.free_connectors {
            self.connectors.set_position(connector, position);
        }
        self.sync_connectors(snapshot.id);
        self.refresh_ancestors(snapshot.id);
    }

    /// Translate a leaf entity and everything attached to it.
    pub fn translate(&mut self, id: EntityId, delta: Vec2) {
        if let Some(snapshot) = self.snapshot(id) {
            self.apply_snapshot(&snapshot.translated(delta));
        }
    }

    /// Re-derive the position of anchors from the shape frame and push every
    /// owned connector's position down to its descendants.
    pub(crate) fn sync_connectors(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        if let EntityKind::Shape(shape) = &entity.kind {
            let anchors = shape.anchor_points();
            let owned = entity.connectors.clone();
            for (connector, anchor) in owned.iter().zip(anchors) {
                if self.connectors.parent(*connector).is_none() {
                    self.connectors.set_position(*connector, anchor);
                }
            }
        }
        let owned = self
            .entities
            .get(&id)
            .map(|e| e.connectors.clone())
            .unwrap_or_default();
        for connector in owned {
            self.connectors.propagate(connector);
        }
    }

    /// Recompute the bounds of every group containing `id`, innermost first.
    pub fn refresh_ancestors(&mut self, id: EntityId) {
        for group in self.ancestors(id) {
            self.refresh_group(group);
        }
    }

    /// Recompute a group's bounds from its direct members.
    pub fn refresh_group(&mut self, id: EntityId) {
        let members = match self.entities.get(&id).and_then(Entity::as_group) {
            Some(group) => group.members.clone(),
            None => return,
        };
        let bounds = self.union_bounds(&members).unwrap_or(Rect::ZERO);
        if let Some(group) = self.entities.get_mut(&id).and_then(Entity::as_group_mut) {
            group.bounds = bounds;
        }
    }

    /// Recompute every group bottom-up. Needed after bulk edits such as paste.
    pub fn refresh_all_groups(&mut self) {
        let mut groups: Vec<(usize, EntityId)> = self
            .entities
            .values()
            .filter(|e| e.is_group())
            .map(|e| (self.ancestors(e.id()).len(), e.id()))
            .collect();
        // Deepest groups first so parents see fresh member bounds.
        groups.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, id) in groups {
            self.refresh_group(id);
        }
    }

    /// Create a group over `members` (top-level items) with a given id.
    pub(crate) fn group(&mut self, group_id: EntityId, members: &[EntityId]) {
        let mut entity = Entity::new(
            EntityKind::Group(Group::new(members.to_vec())),
            Capabilities::group(),
        );
        entity.set_id(group_id);
        self.entities.insert(group_id, entity);
        for &member in members {
            if let Some(e) = self.entities.get_mut(&member) {
                e.parent = Some(group_id);
            }
        }
        self.refresh_group(group_id);
    }

    /// Dissolve a group, releasing its members. Returns the members.
    pub(crate) fn ungroup(&mut self, group_id: EntityId) -> Vec<EntityId> {
        let Some(entity) = self.entities.get(&group_id) else {
            return Vec::new();
        };
        let Some(group) = entity.as_group() else {
            return Vec::new();
        };
        let members = group.members.clone();
        let outer = entity.parent;
        for &member in &members {
            if let Some(e) = self.entities.get_mut(&member) {
                e.parent = outer;
            }
        }
        if let Some(outer) = outer {
            if let Some(outer_group) = self.entities.get_mut(&outer).and_then(Entity::as_group_mut)
            {
                let position = outer_group
                    .members
                    .iter()
                    .position(|&m| m == group_id)
                    .unwrap_or(outer_group.members.len());
                outer_group.members.retain(|&m| m != group_id);
                for (offset, &member) in members.iter().enumerate() {
                    let index = (position + offset).min(outer_group.members.len());
                    outer_group.members.insert(index, member);
                }
            }
        }
        self.entities.remove(&group_id);
        members
    }

    /// Re-insert a previously dissolved group and reclaim its members.
    pub(crate) fn restore_group(&mut self, group: Entity) {
        let id = group.id();
        let members = group.as_group().map(|g| g.members.clone()).unwrap_or_default();
        if let Some(outer) = group.parent {
            if let Some(outer_group) = self.entities.get_mut(&outer).and_then(Entity::as_group_mut)
            {
                let position = outer_group
                    .members
                    .iter()
                    .position(|m| members.contains(m))
                    .unwrap_or(outer_group.members.len());
                outer_group.members.retain(|m| !members.contains(m));
                let index = position.min(outer_group.members.len());
                outer_group.members.insert(index, id);
            }
        }
        self.entities.insert(id, group);
        for member in members {
            if let Some(e) = self.entities.get_mut(&member) {
                e.parent = Some(id);
            }
        }
        self.refresh_group(id);
        self.refresh_ancestors(id);
    }

    /// Replace the whole paint order. The new order must be a permutation of the old one.
    pub(crate) fn set_paint_order(&mut self, order: Vec<EntityId>) {
        debug_assert_eq!(order.len(), self.paintables.len());
        self.paintables = order;
    }

    /// Raise a leaf by up to `steps` slots. Returns how far it moved.
    pub fn send_forwards(&mut self, id: EntityId, steps: usize) -> usize {
        let Some(index) = self.z_index(id) else {
            return 0;
        };
        let target = (index + steps).min(self.paintables.len() - 1);
        let moved = self.paintables.remove(index);
        self.paintables.insert(target, moved);
        target - index
    }

    /// Lower a leaf by up to `steps` slots. Returns how far it moved.
    pub fn send_backwards(&mut self, id: EntityId, steps: usize) -> usize {
        let Some(index) = self.z_index(id) else {
            return 0;
        };
        let target = index.saturating_sub(steps);
        let moved = self.paintables.remove(index);
        self.paintables.insert(target, moved);
        index - target
    }

    /// Move a leaf to the top of the paint list.
    pub fn send_to_front(&mut self, id: EntityId) {
        if let Some(index) = self.z_index(id) {
            let moved = self.paintables.remove(index);
            self.paintables.push(moved);
        }
    }

    /// Move a leaf to the bottom of the paint list.
    pub fn send_to_back(&mut self, id: EntityId) {
        if let Some(index) = self.z_index(id) {
            let moved = self.paintables.remove(index);
            self.paintables.insert(0, moved);
        }
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Inclusive point-in-rectangle test (kurbo's `contains` excludes the far edges).
pub fn rect_contains_point(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(x, y, x + w, y + h)
    }

    #[test]
    fn test_add_shape_creates_anchors() {
        let mut doc = Document::new();
        let id = doc.add_shape(ShapeKind::Rectangle, rect(0.0, 0.0, 100.0, 50.0));

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.z_index(id), Some(0));
        let entity = doc.entity(id).unwrap();
        assert_eq!(entity.connectors.len(), 4);
        assert_eq!(doc.connectors().len(), 4);
    }

    #[test]
    fn test_connection_bounds_follow_connectors() {
        let mut doc = Document::new();
        let id = doc.add_connection(Point::new(10.0, 10.0), Point::new(0.0, 30.0));
        assert_eq!(doc.bounds_of(id), Some(Rect::new(0.0, 10.0, 10.0, 30.0)));
        assert!(doc.hit(id, Point::new(5.0, 20.0), 1.0));
        assert!(!doc.hit(id, Point::new(9.0, 29.0), 1.0));
    }

    #[test]
    fn test_translate_moves_attached_connection() {
        let mut doc = Document::new();
        let shape = doc.add_shape(ShapeKind::Rectangle, rect(0.0, 0.0, 100.0, 50.0));
        let line = doc.add_connection(Point::new(200.0, 200.0), Point::new(300.0, 300.0));

        let anchor = doc.entity(shape).unwrap().connectors[1];
        let start = doc.entity(line).unwrap().as_connection().unwrap().start;
        doc.connectors_mut().attach(anchor, start).unwrap();
        assert_eq!(doc.connectors().get(start).unwrap().position, Point::new(100.0, 25.0));

        doc.translate(shape, Vec2::new(10.0, 5.0));
        assert_eq!(doc.bounds_of(shape), Some(rect(10.0, 5.0, 100.0, 50.0)));
        assert_eq!(doc.connectors().get(start).unwrap().position, Point::new(110.0, 30.0));
    }

    #[test]
    fn test_z_order_primitives() {
        let mut doc = Document::new();
        let ids: Vec<EntityId> = (0..4)
            .map(|i| doc.add_shape(ShapeKind::Rectangle, rect(i as f64 * 10.0, 0.0, 5.0, 5.0)))
            .collect();

        assert_eq!(doc.send_forwards(ids[0], 2), 2);
        assert_eq!(doc.z_index(ids[0]), Some(2));
        assert_eq!(doc.send_backwards(ids[0], 2), 2);
        assert_eq!(doc.paintables(), ids.as_slice());

        assert_eq!(doc.send_forwards(ids[3], 5), 0);
        doc.send_to_back(ids[3]);
        assert_eq!(doc.z_index(ids[3]), Some(0));
        doc.send_to_front(ids[3]);
        assert_eq!(doc.z_index(ids[3]), Some(3));
    }

    #[test]
    fn test_group_bounds_and_leaves() {
        let mut doc = Document::new();
        let a = doc.add_shape(ShapeKind::Rectangle, rect(0.0, 0.0, 100.0, 50.0));
        let b = doc.add_shape(ShapeKind::Ellipse, rect(200.0, 200.0, 50.0, 100.0));
        let c = doc.add_shape(ShapeKind::Rectangle, rect(400.0, 0.0, 10.0, 10.0));

        let inner = Uuid::new_v4();
        doc.group(inner, &[a, b]);
        let outer = Uuid::new_v4();
        doc.group(outer, &[inner, c]);

        assert_eq!(doc.bounds_of(inner), Some(Rect::new(0.0, 0.0, 250.0, 300.0)));
        assert_eq!(doc.bounds_of(outer), Some(Rect::new(0.0, 0.0, 410.0, 300.0)));
        assert_eq!(doc.leaves(outer), vec![a, b, c]);
        assert_eq!(doc.outermost(a), outer);
        assert_eq!(doc.z_range(outer), Some((0, 2)));

        doc.translate(c, Vec2::new(100.0, 0.0));
        assert_eq!(doc.bounds_of(outer), Some(Rect::new(0.0, 0.0, 510.0, 300.0)));

        let saved = doc.entity(inner).unwrap().clone();
        let released = doc.ungroup(inner);
        assert_eq!(released, vec![a, b]);
        assert_eq!(doc.entity(a).unwrap().parent, Some(outer));
        assert_eq!(doc.entity(outer).unwrap().as_group().unwrap().members, vec![a, b, c]);

        doc.restore_group(saved);
        assert_eq!(doc.entity(a).unwrap().parent, Some(inner));
        assert_eq!(doc.entity(outer).unwrap().as_group().unwrap().members, vec![inner, c]);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut doc = Document::new();
        doc.add_shape(ShapeKind::Rectangle, rect(0.0, 0.0, 10.0, 10.0));
        doc.add_connection(Point::new(0.0, 0.0), Point::new(5.0, 5.0));

        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded.paintables(), doc.paintables());
        assert_eq!(loaded.connectors().len(), 6);
    }
}
