//! Spatial queries over the paint list.

use crate::config::InclusionMode;
use crate::connector::{Connector, ConnectorId};
use crate::document::Document;
use crate::entity::{rect_contains_rect, rects_touch, EntityId};
use kurbo::{Point, Rect};
use std::collections::HashSet;

/// Topmost leaf entity under `point`, scanning the paint list from front to back.
pub fn collect_entity_at(doc: &Document, point: Point, tolerance: f64) -> Option<EntityId> {
    doc.paintables()
        .iter()
        .rev()
        .copied()
        .find(|&id| doc.hit(id, point, tolerance))
}

/// Top-level items (outermost groups or ungrouped leaves), in paint order of
/// their lowest leaf.
pub fn top_level_items(doc: &Document) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    doc.paintables()
        .iter()
        .map(|&id| doc.outermost(id))
        .filter(|&id| seen.insert(id))
        .collect()
}

/// Top-level items selected by a marquee rectangle.
pub fn collect_entities_inside(doc: &Document, rect: Rect, mode: InclusionMode) -> Vec<EntityId> {
    let rect = rect.abs();
    top_level_items(doc)
        .into_iter()
        .filter(|&id| match doc.bounds_of(id) {
            Some(bounds) => match mode {
                InclusionMode::Inclusive => rect_contains_rect(rect, bounds),
                InclusionMode::Touching => rects_touch(rect, bounds),
            },
            None => false,
        })
        .collect()
}

/// Connector within `radius` of `point` that satisfies `predicate`.
/// Connectors of entities higher in the paint list win.
pub fn collect_connector_at<F>(
    doc: &Document,
    point: Point,
    radius: f64,
    predicate: F,
) -> Option<ConnectorId>
where
    F: Fn(&Connector) -> bool,
{
    for &id in doc.paintables().iter().rev() {
        let Some(entity) = doc.entity(id) else {
            continue;
        };
        let hit = entity
            .connectors
            .iter()
            .filter_map(|&c| doc.connectors().get(c))
            .filter(|c| (c.position - point).hypot() <= radius && predicate(c))
            .min_by(|a, b| {
                let da = (a.position - point).hypot2();
                let db = (b.position - point).hypot2();
                da.total_cmp(&db)
            });
        if let Some(connector) = hit {
            return Some(connector.id());
        }
    }
    None
}

/// Expand groups into their leaves. The result is sorted by z-index and
/// contains each leaf once.
pub fn flattened_selection_items(doc: &Document, items: &[EntityId]) -> Vec<EntityId> {
    let mut seen = HashSet::new();
    let mut leaves: Vec<EntityId> = items
        .iter()
        .flat_map(|&id| doc.leaves(id))
        .filter(|&leaf| seen.insert(leaf))
        .collect();
    leaves.sort_by_key(|&leaf| doc.z_index(leaf).unwrap_or(usize::MAX));
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;
    use uuid::Uuid;

    #[test]
    fn test_topmost_entity_wins() {
        let mut doc = Document::new();
        let below = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = doc.add_shape(ShapeKind::Ellipse, Rect::new(50.0, 50.0, 150.0, 150.0));

        assert_eq!(collect_entity_at(&doc, Point::new(75.0, 75.0), 0.0), Some(above));
        assert_eq!(collect_entity_at(&doc, Point::new(10.0, 10.0), 0.0), Some(below));
        assert_eq!(collect_entity_at(&doc, Point::new(500.0, 500.0), 0.0), None);
    }

    #[test]
    fn test_inclusion_modes() {
        let mut doc = Document::new();
        let inside = doc.add_shape(ShapeKind::Rectangle, Rect::new(10.0, 10.0, 20.0, 20.0));
        let partial = doc.add_shape(ShapeKind::Rectangle, Rect::new(90.0, 90.0, 120.0, 120.0));
        let marquee = Rect::new(100.0, 100.0, 0.0, 0.0);

        assert_eq!(
            collect_entities_inside(&doc, marquee, InclusionMode::Inclusive),
            vec![inside]
        );
        assert_eq!(
            collect_entities_inside(&doc, marquee, InclusionMode::Touching),
            vec![inside, partial]
        );
    }

    #[test]
    fn test_marquee_returns_groups_once() {
        let mut doc = Document::new();
        let a = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = doc.add_shape(ShapeKind::Rectangle, Rect::new(20.0, 0.0, 30.0, 10.0));
        let group = Uuid::new_v4();
        doc.group(group, &[a, b]);

        let found = collect_entities_inside(&doc, Rect::new(-1.0, -1.0, 50.0, 50.0), InclusionMode::Inclusive);
        assert_eq!(found, vec![group]);
        assert_eq!(flattened_selection_items(&doc, &found), vec![a, b]);
    }

    #[test]
    fn test_connector_predicate_excludes() {
        let mut doc = Document::new();
        let shape = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 100.0, 50.0));
        let left_anchor = doc.entity(shape).unwrap().connectors[3];

        let found = collect_connector_at(&doc, Point::new(1.0, 25.0), 3.0, |_| true);
        assert_eq!(found, Some(left_anchor));
        let excluded = collect_connector_at(&doc, Point::new(1.0, 25.0), 3.0, |c| c.id() != left_anchor);
        assert_eq!(excluded, None);
    }
}
