//! Selection tracker overlay and its eight resize grips.

use crate::context::Cursor;
use crate::document::Document;
use crate::selection::Selection;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Directional resize grip on the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grip {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Grip {
    /// All grips, corners first so they win over overlapping edges.
    pub const ALL: [Grip; 8] = [
        Grip::NW,
        Grip::NE,
        Grip::SE,
        Grip::SW,
        Grip::N,
        Grip::E,
        Grip::S,
        Grip::W,
    ];

    /// Whether dragging this grip changes the horizontal extent.
    pub fn scales_x(self) -> bool {
        !matches!(self, Grip::N | Grip::S)
    }

    /// Whether dragging this grip changes the vertical extent.
    pub fn scales_y(self) -> bool {
        !matches!(self, Grip::E | Grip::W)
    }

    pub fn cursor(self) -> Cursor {
        match self {
            Grip::N | Grip::S => Cursor::ResizeNs,
            Grip::E | Grip::W => Cursor::ResizeEw,
            Grip::NW | Grip::SE => Cursor::ResizeNwse,
            Grip::NE | Grip::SW => Cursor::ResizeNesw,
        }
    }
}

/// Bounding overlay of the current selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracker {
    pub bounds: Rect,
    /// Whether any selected leaf can be resized. Grips are inert otherwise.
    pub resizable: bool,
}

impl Tracker {
    pub fn new(bounds: Rect, resizable: bool) -> Self {
        Self { bounds, resizable }
    }

    /// Tracker around the selection, if anything is selected.
    pub fn for_selection(doc: &Document, selection: &Selection) -> Option<Self> {
        let bounds = selection.bounds(doc)?;
        let resizable = selection
            .flattened(doc)
            .iter()
            .filter_map(|&id| doc.entity(id))
            .any(|e| e.is_resizable());
        Some(Self::new(bounds, resizable))
    }

    /// World position of a grip.
    pub fn grip_position(&self, grip: Grip) -> Point {
        let r = self.bounds;
        let c = r.center();
        match grip {
            Grip::N => Point::new(c.x, r.y0),
            Grip::S => Point::new(c.x, r.y1),
            Grip::E => Point::new(r.x1, c.y),
            Grip::W => Point::new(r.x0, c.y),
            Grip::NE => Point::new(r.x1, r.y0),
            Grip::NW => Point::new(r.x0, r.y0),
            Grip::SE => Point::new(r.x1, r.y1),
            Grip::SW => Point::new(r.x0, r.y1),
        }
    }

    /// Fixed point of a resize: the corner or edge midpoint opposite the grip.
    pub fn origin(&self, grip: Grip) -> Point {
        let opposite = match grip {
            Grip::N => Grip::S,
            Grip::S => Grip::N,
            Grip::E => Grip::W,
            Grip::W => Grip::E,
            Grip::NE => Grip::SW,
            Grip::NW => Grip::SE,
            Grip::SE => Grip::NW,
            Grip::SW => Grip::NE,
        };
        self.grip_position(opposite)
    }

    /// Grip within `tolerance` of `point`.
    pub fn hit_test_grip(&self, point: Point, tolerance: f64) -> Option<Grip> {
        if !self.resizable {
            return None;
        }
        Grip::ALL
            .into_iter()
            .find(|&grip| (self.grip_position(grip) - point).hypot() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grip_positions_and_origins() {
        let tracker = Tracker::new(Rect::new(0.0, 0.0, 100.0, 50.0), true);
        assert_eq!(tracker.grip_position(Grip::SE), Point::new(100.0, 50.0));
        assert_eq!(tracker.origin(Grip::SE), Point::new(0.0, 0.0));
        assert_eq!(tracker.origin(Grip::E), Point::new(0.0, 25.0));
        assert_eq!(tracker.origin(Grip::N), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_hit_test_grip() {
        let tracker = Tracker::new(Rect::new(0.0, 0.0, 100.0, 50.0), true);
        assert_eq!(tracker.hit_test_grip(Point::new(101.0, 49.0), 4.0), Some(Grip::SE));
        assert_eq!(tracker.hit_test_grip(Point::new(50.0, 2.0), 4.0), Some(Grip::N));
        assert_eq!(tracker.hit_test_grip(Point::new(50.0, 25.0), 4.0), None);

        let fixed = Tracker::new(tracker.bounds, false);
        assert_eq!(fixed.hit_test_grip(Point::new(100.0, 50.0), 4.0), None);
    }

    #[test]
    fn test_corner_grips_win_on_tiny_trackers() {
        let tracker = Tracker::new(Rect::new(0.0, 0.0, 2.0, 2.0), true);
        assert_eq!(tracker.hit_test_grip(Point::new(0.0, 0.0), 4.0), Some(Grip::NW));
    }
}
