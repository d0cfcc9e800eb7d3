//! Selection state: the ordered set of selected top-level items.

use crate::document::Document;
use crate::entity::EntityId;
use crate::hit_test::flattened_selection_items;
use kurbo::Rect;

/// Selected items. Holds outermost groups or ungrouped leaves, never group members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<EntityId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[EntityId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains(&id)
    }

    /// Replace the selection with a single item.
    pub fn select(&mut self, id: EntityId) {
        self.items.clear();
        self.items.push(id);
    }

    /// Replace the selection with several items.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = EntityId>) {
        self.items.clear();
        for id in ids {
            self.add(id);
        }
    }

    pub fn add(&mut self, id: EntityId) {
        if !self.items.contains(&id) {
            self.items.push(id);
        }
    }

    pub fn remove(&mut self, id: EntityId) {
        self.items.retain(|&e| e != id);
    }

    /// Add `id` if absent, remove it otherwise.
    pub fn toggle(&mut self, id: EntityId) {
        if self.contains(id) {
            self.remove(id);
        } else {
            self.items.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop items that no longer exist in the document.
    pub fn retain_existing(&mut self, doc: &Document) {
        self.items.retain(|&id| doc.contains(id));
    }

    /// Union of the bounds of all selected items.
    pub fn bounds(&self, doc: &Document) -> Option<Rect> {
        doc.union_bounds(&self.items)
    }

    /// Selected leaves in z-order.
    pub fn flattened(&self, doc: &Document) -> Vec<EntityId> {
        flattened_selection_items(doc, &self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ShapeKind;

    #[test]
    fn test_toggle_and_bounds() {
        let mut doc = Document::new();
        let a = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = doc.add_shape(ShapeKind::Rectangle, Rect::new(20.0, 20.0, 30.0, 30.0));

        let mut selection = Selection::new();
        selection.select(a);
        selection.toggle(b);
        assert_eq!(selection.items(), &[a, b]);
        assert_eq!(selection.bounds(&doc), Some(Rect::new(0.0, 0.0, 30.0, 30.0)));

        selection.toggle(a);
        assert_eq!(selection.items(), &[b]);
        selection.add(b);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_retain_existing() {
        let mut doc = Document::new();
        let a = doc.add_shape(ShapeKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut selection = Selection::new();
        selection.select(a);
        doc.remove(a);
        selection.retain_existing(&doc);
        assert!(selection.is_empty());
    }
}
