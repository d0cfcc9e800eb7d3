//! Group-aware z-order operations.
//!
//! Forwards and backwards steps are computed, not fixed: the selection jumps
//! past the nearest overlapping obstacle (a whole group counts as one
//! obstacle) or moves by one slot when nothing above/below overlaps it.

use crate::document::Document;
use crate::entity::{rects_touch, EntityId};
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A reorder applied to a set of leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZOrder {
    ToFront,
    ToBack,
    Forwards(usize),
    Backwards(usize),
}

fn selected_bounds(doc: &Document, leaves: &[EntityId]) -> Vec<Rect> {
    leaves.iter().filter_map(|&id| doc.bounds_of(id)).collect()
}

fn overlaps_selection(doc: &Document, id: EntityId, bounds: &[Rect]) -> bool {
    doc.bounds_of(id)
        .is_some_and(|r| bounds.iter().any(|&b| rects_touch(r, b)))
}

/// Steps needed to raise `leaves` just above the first overlapping obstacle.
pub fn forward_steps(doc: &Document, leaves: &[EntityId]) -> usize {
    let selected: HashSet<EntityId> = leaves.iter().copied().collect();
    let Some(reference) = leaves.iter().filter_map(|&id| doc.z_index(id)).min() else {
        return 0;
    };
    let bounds = selected_bounds(doc, leaves);
    let paintables = doc.paintables();

    for (index, &id) in paintables.iter().enumerate().skip(reference + 1) {
        if selected.contains(&id) || !overlaps_selection(doc, id, &bounds) {
            continue;
        }
        let outer = doc.outermost(id);
        let effective = if outer != id {
            doc.z_range(outer).map_or(index, |(_, max)| max)
        } else {
            index
        };
        log::debug!("Forward obstacle {} at {} (effective {})", id, index, effective);
        return effective - reference;
    }
    1
}

/// Steps needed to lower `leaves` just below the first overlapping obstacle.
pub fn backward_steps(doc: &Document, leaves: &[EntityId]) -> usize {
    let selected: HashSet<EntityId> = leaves.iter().copied().collect();
    let Some(reference) = leaves.iter().filter_map(|&id| doc.z_index(id)).max() else {
        return 0;
    };
    let bounds = selected_bounds(doc, leaves);
    let paintables = doc.paintables();

    for index in (0..reference).rev() {
        let id = paintables[index];
        if selected.contains(&id) || !overlaps_selection(doc, id, &bounds) {
            continue;
        }
        let outer = doc.outermost(id);
        let effective = if outer != id {
            doc.z_range(outer).map_or(index, |(min, _)| min)
        } else {
            index
        };
        log::debug!("Backward obstacle {} at {} (effective {})", id, index, effective);
        return reference - effective;
    }
    1
}

/// Resolve forwards/backwards into concrete step counts for the current layout.
pub fn plan(doc: &Document, op: ZOrder, leaves: &[EntityId]) -> ZOrder {
    match op {
        ZOrder::Forwards(0) => ZOrder::Forwards(forward_steps(doc, leaves)),
        ZOrder::Backwards(0) => ZOrder::Backwards(backward_steps(doc, leaves)),
        other => other,
    }
}

fn sorted_by_z(doc: &Document, leaves: &[EntityId]) -> Vec<EntityId> {
    let mut sorted: Vec<EntityId> = leaves
        .iter()
        .copied()
        .filter(|&id| doc.z_index(id).is_some())
        .collect();
    sorted.sort_by_key(|&id| doc.z_index(id).unwrap_or(usize::MAX));
    sorted.dedup();
    sorted
}

/// Apply a reorder. Relative order inside `leaves` is preserved and no leaf
/// moves past the end of the paint list.
pub fn apply(doc: &mut Document, op: ZOrder, leaves: &[EntityId]) {
    let sorted = sorted_by_z(doc, leaves);
    let len = doc.len();
    match op {
        ZOrder::ToFront => {
            for &id in &sorted {
                doc.send_to_front(id);
            }
        }
        ZOrder::ToBack => {
            for &id in sorted.iter().rev() {
                doc.send_to_back(id);
            }
        }
        ZOrder::Forwards(steps) => {
            // Topmost first: each leaf is capped below the ones already moved.
            for (rank, &id) in sorted.iter().rev().enumerate() {
                let Some(index) = doc.z_index(id) else { continue };
                let target = (index + steps).min(len - 1 - rank);
                if target > index {
                    doc.send_forwards(id, target - index);
                }
            }
        }
        ZOrder::Backwards(steps) => {
            for (rank, &id) in sorted.iter().enumerate() {
                let Some(index) = doc.z_index(id) else { continue };
                let target = index.saturating_sub(steps).max(rank);
                if target < index {
                    doc.send_backwards(id, index - target);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use uuid::Uuid;

    /// Eight shapes laid out far apart, so nothing overlaps.
    fn spread_doc() -> (Document, Vec<EntityId>) {
        let mut doc = Document::new();
        let ids = (0..8)
            .map(|i| {
                let x = i as f64 * 100.0;
                doc.add_shape(ShapeKind::Rectangle, Rect::new(x, 0.0, x + 10.0, 10.0))
            })
            .collect();
        (doc, ids)
    }

    #[test]
    fn test_forwards_without_obstacle_moves_one() {
        let (mut doc, ids) = spread_doc();
        let leaves = [ids[2], ids[5]];

        assert_eq!(forward_steps(&doc, &leaves), 1);
        apply(&mut doc, ZOrder::Forwards(1), &leaves);
        assert_eq!(doc.z_index(ids[2]), Some(3));
        assert_eq!(doc.z_index(ids[5]), Some(6));
    }

    #[test]
    fn test_forwards_jumps_past_obstacle() {
        let (mut doc, ids) = spread_doc();
        // Overlap entity 1 with entity 4.
        doc.translate(ids[4], kurbo::Vec2::new(-300.0, 5.0));

        assert_eq!(forward_steps(&doc, &[ids[1]]), 3);
        apply(&mut doc, ZOrder::Forwards(3), &[ids[1]]);
        assert_eq!(doc.z_index(ids[1]), Some(4));
        assert_eq!(doc.z_index(ids[4]), Some(3));
    }

    #[test]
    fn test_grouped_obstacle_counts_as_whole() {
        let (mut doc, ids) = spread_doc();
        doc.translate(ids[3], kurbo::Vec2::new(-200.0, 0.0));
        let group = Uuid::new_v4();
        doc.group(group, &[ids[3], ids[6]]);

        assert_eq!(forward_steps(&doc, &[ids[1]]), 5);
        assert_eq!(backward_steps(&doc, &[ids[6]]), 1);
    }

    #[test]
    fn test_grouped_obstacle_below_uses_group_bottom() {
        let (mut doc, ids) = spread_doc();
        // Leaf 4 overlaps leaf 6 and shares a group with leaf 1.
        doc.translate(ids[4], kurbo::Vec2::new(200.0, 0.0));
        let group = Uuid::new_v4();
        doc.group(group, &[ids[1], ids[4]]);
        assert_eq!(doc.z_range(group), Some((1, 4)));

        assert_eq!(backward_steps(&doc, &[ids[6]]), 5);
        apply(&mut doc, ZOrder::Backwards(5), &[ids[6]]);
        assert_eq!(doc.z_index(ids[6]), Some(1));
        assert_eq!(doc.z_index(ids[1]), Some(2));
    }

    #[test]
    fn test_backwards_mirrors_forwards() {
        let (mut doc, ids) = spread_doc();
        doc.translate(ids[2], kurbo::Vec2::new(400.0, 0.0));

        assert_eq!(backward_steps(&doc, &[ids[6]]), 4);
        let original = doc.paintables().to_vec();
        apply(&mut doc, ZOrder::Forwards(2), &[ids[1], ids[3]]);
        apply(&mut doc, ZOrder::Backwards(2), &[ids[1], ids[3]]);
        assert_eq!(doc.paintables(), original.as_slice());
    }

    #[test]
    fn test_forwards_stops_at_top() {
        let (mut doc, ids) = spread_doc();
        apply(&mut doc, ZOrder::Forwards(5), &[ids[6], ids[7]]);
        assert_eq!(doc.z_index(ids[6]), Some(6));
        assert_eq!(doc.z_index(ids[7]), Some(7));
    }

    #[test]
    fn test_front_and_back_keep_relative_order() {
        let (mut doc, ids) = spread_doc();
        apply(&mut doc, ZOrder::ToFront, &[ids[0], ids[3]]);
        assert_eq!(doc.z_index(ids[0]), Some(6));
        assert_eq!(doc.z_index(ids[3]), Some(7));

        apply(&mut doc, ZOrder::ToBack, &[ids[0], ids[3]]);
        assert_eq!(doc.z_index(ids[0]), Some(0));
        assert_eq!(doc.z_index(ids[3]), Some(1));
    }
}
