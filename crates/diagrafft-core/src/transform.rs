//! Grip-driven scaling of the selection.

use crate::command::TransformCommand;
use crate::document::{Document, EntitySnapshot};
use crate::entity::EntityId;
use crate::tracker::{Grip, Tracker};
use kurbo::{Affine, Point};

/// Pre-transform geometry of one entity: its own geometry plus the positions
/// of its unattached connectors. Attached connectors follow their parent.
pub type EntityBone = EntitySnapshot;

/// Capture bones for the resizable entities among `leaves`.
pub fn capture_bones(doc: &Document, leaves: &[EntityId]) -> Vec<EntityBone> {
    leaves
        .iter()
        .filter(|&&id| doc.entity(id).is_some_and(|e| e.is_resizable()))
        .filter_map(|&id| doc.snapshot(id))
        .collect()
}

/// Affine map scaling around `origin`.
pub fn scale_about(origin: Point, scale_x: f64, scale_y: f64) -> Affine {
    Affine::translate(origin.to_vec2())
        * Affine::scale_non_uniform(scale_x, scale_y)
        * Affine::translate(-origin.to_vec2())
}

/// A bone scaled around `origin`.
pub fn scale_bone(bone: &EntityBone, origin: Point, scale_x: f64, scale_y: f64) -> EntitySnapshot {
    let affine = scale_about(origin, scale_x, scale_y);
    EntitySnapshot {
        id: bone.id,
        geometry: bone.geometry.transformed(affine),
        free_connectors: bone
            .free_connectors
            .iter()
            .map(|&(id, p)| (id, affine * p))
            .collect(),
    }
}

/// Place every bone-tracked entity at its scaled position. Enclosing groups
/// are refreshed innermost first as each entity moves.
pub fn apply_scale(doc: &mut Document, origin: Point, scale_x: f64, scale_y: f64, bones: &[EntityBone]) {
    for bone in bones {
        doc.apply_snapshot(&scale_bone(bone, origin, scale_x, scale_y));
    }
}

/// Put every bone-tracked entity back to its captured geometry.
pub fn restore_bones(doc: &mut Document, bones: &[EntityBone]) {
    for bone in bones {
        doc.apply_snapshot(bone);
    }
}

fn axis_scale(pointer: f64, origin: f64, grip: f64, min_extent: f64) -> f64 {
    let extent = grip - origin;
    if extent.abs() < f64::EPSILON {
        return 1.0;
    }
    let floor = min_extent / extent.abs();
    ((pointer - origin) / extent).max(floor)
}

/// Pick the proportional scale of a corner drag from the dominant motion
/// component. `along_x`/`along_y` are the pointer offsets from the origin,
/// measured positive toward the grip.
fn dominant_scale(along_x: f64, along_y: f64, width: f64, height: f64) -> f64 {
    if width < f64::EPSILON && height < f64::EPSILON {
        return 1.0;
    }
    if height < f64::EPSILON {
        return along_x / width;
    }
    if width < f64::EPSILON {
        return along_y / height;
    }
    if along_x * height >= along_y * width {
        along_x / width
    } else {
        along_y / height
    }
}

/// Scale factors for dragging `grip` (picked at `handle`, resizing around
/// `origin`) to `pointer`.
pub fn compute_scale(grip: Grip, origin: Point, handle: Point, pointer: Point, min_extent: f64) -> (f64, f64) {
    let width = (handle.x - origin.x).abs();
    let height = (handle.y - origin.y).abs();
    let scale = match grip {
        Grip::N | Grip::S | Grip::E | Grip::W => {
            let scale_x = if grip.scales_x() {
                axis_scale(pointer.x, origin.x, handle.x, min_extent)
            } else {
                1.0
            };
            let scale_y = if grip.scales_y() {
                axis_scale(pointer.y, origin.y, handle.y, min_extent)
            } else {
                1.0
            };
            return (scale_x, scale_y);
        }
        Grip::SE => dominant_scale(pointer.x - origin.x, pointer.y - origin.y, width, height),
        Grip::NW => dominant_scale(origin.x - pointer.x, origin.y - pointer.y, width, height),
        Grip::NE => dominant_scale(pointer.x - origin.x, origin.y - pointer.y, width, height),
        Grip::SW => dominant_scale(origin.x - pointer.x, pointer.y - origin.y, width, height),
    };
    let extent = width.max(height);
    let floor = if extent < f64::EPSILON { 0.0 } else { min_extent / extent };
    let scale = scale.max(floor);
    (scale, scale)
}

/// State of one resize gesture, from grip pick to mouse-up.
#[derive(Debug, Clone)]
pub struct TransformGesture {
    pub grip: Grip,
    pub origin: Point,
    handle: Point,
    bones: Vec<EntityBone>,
    scale: (f64, f64),
}

impl TransformGesture {
    /// Start a gesture on `grip`. `None` when nothing under the tracker is resizable.
    pub fn begin(doc: &Document, tracker: &Tracker, grip: Grip, leaves: &[EntityId]) -> Option<Self> {
        let bones = capture_bones(doc, leaves);
        if bones.is_empty() {
            return None;
        }
        Some(Self {
            grip,
            origin: tracker.origin(grip),
            handle: tracker.grip_position(grip),
            bones,
            scale: (1.0, 1.0),
        })
    }

    pub fn scale(&self) -> (f64, f64) {
        self.scale
    }

    pub fn bones(&self) -> &[EntityBone] {
        &self.bones
    }

    /// Rescale the bones for the current pointer position.
    pub fn update(&mut self, doc: &mut Document, pointer: Point, min_extent: f64) {
        self.scale = compute_scale(self.grip, self.origin, self.handle, pointer, min_extent);
        apply_scale(doc, self.origin, self.scale.0, self.scale.1, &self.bones);
    }

    /// Undo the live changes.
    pub fn cancel(&self, doc: &mut Document) {
        restore_bones(doc, &self.bones);
    }

    /// Command recording the already applied change, or `None` for a no-op drag.
    pub fn finish(self) -> Option<TransformCommand> {
        if self.scale == (1.0, 1.0) {
            return None;
        }
        Some(TransformCommand {
            origin: self.origin,
            scale_x: self.scale.0,
            scale_y: self.scale.1,
            bones: self.bones,
        })
    }
}
