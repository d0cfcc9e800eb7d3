//! Connectors and the attachment graph between them.
//!
//! A connector is a bindable point owned by an entity. Connection endpoints
//! attach beneath other connectors; an attached connector always sits at its
//! parent's position and follows it when the parent moves.

use crate::entity::EntityId;
use crate::error::ConnectorError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

/// Unique identifier for connectors.
pub type ConnectorId = Uuid;

/// Which end of a connection an endpoint connector represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum End {
    Start,
    End,
}

/// What a connector is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectorRole {
    /// A fixed binding point on a shape's outline.
    Anchor,
    /// A draggable end of a connection.
    Endpoint(End),
}

/// A bindable point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub(crate) id: ConnectorId,
    /// Entity that owns this connector.
    pub owner: EntityId,
    pub role: ConnectorRole,
    /// Position in world coordinates.
    pub position: Point,
    pub(crate) attached_to: Option<ConnectorId>,
    pub(crate) attached: Vec<ConnectorId>,
}

impl Connector {
    /// Create a detached connector.
    pub fn new(owner: EntityId, role: ConnectorRole, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            role,
            position,
            attached_to: None,
            attached: Vec::new(),
        }
    }

    pub fn id(&self) -> ConnectorId {
        self.id
    }

    /// Parent connector, if attached.
    pub fn attached_to(&self) -> Option<ConnectorId> {
        self.attached_to
    }

    /// Connectors attached beneath this one.
    pub fn attached_connectors(&self) -> &[ConnectorId] {
        &self.attached
    }

    /// Whether this is a connection endpoint (the only kind users drag directly).
    pub fn is_endpoint(&self) -> bool {
        matches!(self.role, ConnectorRole::Endpoint(_))
    }
}

/// Attachment graph over all connectors of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorGraph {
    connectors: HashMap<ConnectorId, Connector>,
}

impl ConnectorGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn contains(&self, id: ConnectorId) -> bool {
        self.connectors.contains_key(&id)
    }

    pub fn get(&self, id: ConnectorId) -> Option<&Connector> {
        self.connectors.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ConnectorId) -> Option<&mut Connector> {
        self.connectors.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.values()
    }

    /// Insert a connector as is, including whatever relations it records.
    /// Callers restoring a snapshot are responsible for the other side of each relation.
    pub(crate) fn insert(&mut self, connector: Connector) {
        self.connectors.insert(connector.id, connector);
    }

    /// Remove a connector, detaching it from its parent and children first.
    pub(crate) fn remove(&mut self, id: ConnectorId) -> Option<Connector> {
        let parent = self.parent(id);
        if let Some(parent) = parent {
            if let Some(p) = self.connectors.get_mut(&parent) {
                p.attached.retain(|&c| c != id);
            }
        }
        let children = self.children(id).to_vec();
        for child in children {
            if let Some(c) = self.connectors.get_mut(&child) {
                c.attached_to = None;
            }
        }
        let mut removed = self.connectors.remove(&id)?;
        removed.attached_to = None;
        removed.attached.clear();
        Some(removed)
    }

    pub fn parent(&self, id: ConnectorId) -> Option<ConnectorId> {
        self.connectors.get(&id).and_then(|c| c.attached_to)
    }

    pub fn children(&self, id: ConnectorId) -> &[ConnectorId] {
        self.connectors
            .get(&id)
            .map(|c| c.attached.as_slice())
            .unwrap_or(&[])
    }

    /// All connectors transitively attached beneath `id`, breadth first.
    pub fn descendants(&self, id: ConnectorId) -> Vec<ConnectorId> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<ConnectorId> = self.children(id).iter().copied().collect();
        while let Some(next) = queue.pop_front() {
            if !seen.insert(next) {
                continue;
            }
            result.push(next);
            queue.extend(self.children(next).iter().copied());
        }
        result
    }

    /// Whether `candidate` is reachable from `ancestor` through attached connectors.
    pub fn is_descendant(&self, ancestor: ConnectorId, candidate: ConnectorId) -> bool {
        self.descendants(ancestor).contains(&candidate)
    }

    /// Attach `child` beneath `parent`. The child snaps to the parent's position.
    pub fn attach(&mut self, parent: ConnectorId, child: ConnectorId) -> Result<(), ConnectorError> {
        if !self.contains(parent) {
            return Err(ConnectorError::UnknownConnector(parent));
        }
        if !self.contains(child) {
            return Err(ConnectorError::UnknownConnector(child));
        }
        if parent == child {
            return Err(ConnectorError::SelfAttachment(child));
        }
        match self.parent(child) {
            Some(existing) if existing == parent => return Ok(()),
            Some(existing) => {
                return Err(ConnectorError::AlreadyAttached {
                    child,
                    parent: existing,
                });
            }
            None => {}
        }
        if self.is_descendant(child, parent) {
            return Err(ConnectorError::WouldCreateCycle { parent, child });
        }

        let position = self.connectors[&parent].position;
        if let Some(p) = self.connectors.get_mut(&parent) {
            p.attached.push(child);
        }
        if let Some(c) = self.connectors.get_mut(&child) {
            c.attached_to = Some(parent);
            c.position = position;
        }
        self.propagate(child);
        log::debug!("Attached connector {} to {}", child, parent);
        Ok(())
    }

    /// Record a relation on both sides without checks or position changes.
    /// Used to restore relations captured from a consistent graph.
    pub(crate) fn link(&mut self, parent: ConnectorId, child: ConnectorId) {
        if !self.contains(parent) || !self.contains(child) {
            return;
        }
        if let Some(p) = self.connectors.get_mut(&parent) {
            if !p.attached.contains(&child) {
                p.attached.push(child);
            }
        }
        if let Some(c) = self.connectors.get_mut(&child) {
            c.attached_to = Some(parent);
        }
    }

    /// Every (parent, child) relation touching `id`.
    pub fn relations(&self, id: ConnectorId) -> Vec<(ConnectorId, ConnectorId)> {
        let mut result: Vec<(ConnectorId, ConnectorId)> =
            self.parent(id).map(|p| (p, id)).into_iter().collect();
        result.extend(self.children(id).iter().map(|&c| (id, c)));
        result
    }

    /// Remove the relation between `parent` and `child`. Positions are unchanged.
    pub fn detach(&mut self, parent: ConnectorId, child: ConnectorId) -> Result<(), ConnectorError> {
        if !self.contains(parent) {
            return Err(ConnectorError::UnknownConnector(parent));
        }
        if self.parent(child) != Some(parent) {
            return Err(ConnectorError::NotAttached { parent, child });
        }
        if let Some(p) = self.connectors.get_mut(&parent) {
            p.attached.retain(|&c| c != child);
        }
        if let Some(c) = self.connectors.get_mut(&child) {
            c.attached_to = None;
        }
        log::debug!("Detached connector {} from {}", child, parent);
        Ok(())
    }

    /// Move a connector and everything attached beneath it.
    pub fn set_position(&mut self, id: ConnectorId, position: Point) {
        if let Some(c) = self.connectors.get_mut(&id) {
            c.position = position;
            self.propagate(id);
        }
    }

    /// Copy `id`'s position down to all of its descendants.
    pub fn propagate(&mut self, id: ConnectorId) {
        let mut queue = VecDeque::from([id]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(connector) = self.connectors.get(&current) else {
                continue;
            };
            let position = connector.position;
            let children = connector.attached.clone();
            for child in children {
                if let Some(c) = self.connectors.get_mut(&child) {
                    c.position = position;
                }
                queue.push_back(child);
            }
        }
    }

    /// Check the structural invariants: every parent link is mirrored by a
    /// child link and no connector reaches itself.
    pub fn is_consistent(&self) -> bool {
        self.connectors.values().all(|c| {
            let parent_ok = match c.attached_to {
                Some(parent) => self
                    .connectors
                    .get(&parent)
                    .is_some_and(|p| p.attached.contains(&c.id)),
                None => true,
            };
            let children_ok = c
                .attached
                .iter()
                .all(|child| self.parent(*child) == Some(c.id));
            parent_ok && children_ok && !self.is_descendant(c.id, c.id)
        })
    }
}
