//! Group payload for combining multiple entities.

use super::EntityId;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// A group of entities that is selected and manipulated as a single unit.
/// Groups can contain other groups. Members keep their own place in the paint list;
/// the group itself is never painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Direct members of this group.
    pub members: Vec<EntityId>,
    /// Union of the members' bounds, refreshed whenever a member changes.
    pub bounds: Rect,
}

impl Group {
    pub fn new(members: Vec<EntityId>) -> Self {
        Self {
            members,
            bounds: Rect::ZERO,
        }
    }
}
