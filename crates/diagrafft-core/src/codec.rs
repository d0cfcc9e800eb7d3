//! Copy/paste transfer: bundles, the snapshot codec and clipboard backends.

use crate::command::{EntityRecord, EntitySet};
use crate::connector::{Connector, ConnectorId};
use crate::document::Document;
use crate::entity::{EntityId, EntityKind};
use crate::error::{ClipboardError, CodecError};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Entities and connectors detached from a document for transfer.
/// Only relations between connectors inside the bundle are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Leaves in paint order, then groups.
    pub entities: Vec<crate::entity::Entity>,
    pub connectors: Vec<Connector>,
}

impl Bundle {
    /// Copy top-level `items` (with everything nested in them) out of `doc`.
    pub fn from_items(doc: &Document, items: &[EntityId]) -> Self {
        let set = EntitySet::capture(doc, items);
        let mut connectors: Vec<Connector> = set
            .records
            .iter()
            .flat_map(|r| r.connectors.iter().cloned())
            .collect();
        let inside: HashSet<ConnectorId> = connectors.iter().map(Connector::id).collect();
        for &(parent, child) in &set.links {
            if !inside.contains(&parent) || !inside.contains(&child) {
                continue;
            }
            for connector in connectors.iter_mut() {
                if connector.id() == parent {
                    connector.attached.push(child);
                } else if connector.id() == child {
                    connector.attached_to = Some(parent);
                }
            }
        }
        Self {
            entities: set.records.into_iter().map(|r| r.entity).collect(),
            connectors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Turn the bundle into insertable records with fresh ids, shifted by `offset`.
    pub fn into_entity_set(self, offset: Vec2) -> EntitySet {
        let entity_ids: HashMap<EntityId, EntityId> = self
            .entities
            .iter()
            .map(|e| (e.id(), Uuid::new_v4()))
            .collect();
        let connector_ids: HashMap<ConnectorId, ConnectorId> = self
            .connectors
            .iter()
            .map(|c| (c.id(), Uuid::new_v4()))
            .collect();
        let remap_connector = |id: &ConnectorId| connector_ids.get(id).copied().unwrap_or(*id);

        let mut links = Vec::new();
        let mut owned: HashMap<EntityId, Vec<Connector>> = HashMap::new();
        for connector in self.connectors {
            let new_id = remap_connector(&connector.id());
            for child in &connector.attached {
                if let Some(&new_child) = connector_ids.get(child) {
                    links.push((new_id, new_child));
                }
            }
            let owner = entity_ids.get(&connector.owner).copied().unwrap_or(connector.owner);
            let mut fresh = connector;
            fresh.id = new_id;
            fresh.owner = owner;
            fresh.position += offset;
            fresh.attached_to = None;
            fresh.attached.clear();
            owned.entry(owner).or_default().push(fresh);
        }

        let records = self
            .entities
            .into_iter()
            .map(|mut entity| {
                let new_id = entity_ids.get(&entity.id()).copied().unwrap_or_else(Uuid::new_v4);
                entity.set_id(new_id);
                entity.parent = entity.parent.and_then(|p| entity_ids.get(&p).copied());
                entity.connectors = entity.connectors.iter().map(remap_connector).collect();
                let geometry = entity.geometry().translated(offset);
                entity.set_geometry(&geometry);
                match &mut entity.kind {
                    EntityKind::Connection(connection) => {
                        connection.start = remap_connector(&connection.start);
                        connection.end = remap_connector(&connection.end);
                    }
                    EntityKind::Group(group) => {
                        group.members = group
                            .members
                            .iter()
                            .filter_map(|m| entity_ids.get(m).copied())
                            .collect();
                        group.bounds = group.bounds + offset;
                    }
                    EntityKind::Shape(_) | EntityKind::Polygon(_) => {}
                }
                let connectors = owned.remove(&new_id).unwrap_or_default();
                EntityRecord {
                    entity,
                    connectors,
                    z_index: None,
                }
            })
            .collect();
        EntitySet { records, links }
    }
}

/// Serializes bundles for the clipboard.
pub trait SnapshotCodec {
    fn serialize(&self, bundle: &Bundle) -> Result<Vec<u8>, CodecError>;
    fn deserialize(&self, bytes: &[u8]) -> Result<Bundle, CodecError>;
}

/// JSON codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSnapshotCodec;

impl SnapshotCodec for JsonSnapshotCodec {
    fn serialize(&self, bundle: &Bundle) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(bundle).map_err(CodecError::Encode)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Bundle, CodecError> {
        serde_json::from_slice(bytes).map_err(CodecError::Decode)
    }
}

/// Clipboard backend holding raw bytes.
pub trait Clipboard {
    fn set(&mut self, bytes: Vec<u8>) -> Result<(), ClipboardError>;
    fn get(&self) -> Result<Option<Vec<u8>>, ClipboardError>;
}

/// In-process clipboard for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<Vec<u8>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn set(&mut self, bytes: Vec<u8>) -> Result<(), ClipboardError> {
        self.contents = Some(bytes);
        Ok(())
    }

    fn get(&self) -> Result<Option<Vec<u8>>, ClipboardError> {
        Ok(self.contents.clone())
    }
}
