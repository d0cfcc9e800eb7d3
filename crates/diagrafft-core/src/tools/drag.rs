//! Drag rectangle shared by the marquee and the shape tools.

use kurbo::{Point, Rect, Vec2};

/// Anchor and current corner of a pointer drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragRect {
    pub start: Point,
    pub current: Point,
}

impl DragRect {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    /// Normalized rectangle spanned by the drag.
    pub fn rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    pub fn delta(&self) -> Vec2 {
        self.current - self.start
    }

    /// Whether the drag covers less than `min` on both axes.
    pub fn is_smaller_than(&self, min: f64) -> bool {
        let rect = self.rect();
        rect.width() < min && rect.height() < min
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_normalized() {
        let mut drag = DragRect::new(Point::new(100.0, 50.0));
        drag.update(Point::new(20.0, 80.0));
        assert_eq!(drag.rect(), Rect::new(20.0, 50.0, 100.0, 80.0));
        assert_eq!(drag.delta(), Vec2::new(-80.0, 30.0));
    }

    #[test]
    fn test_small_drag() {
        let mut drag = DragRect::new(Point::ZERO);
        drag.update(Point::new(1.0, 1.5));
        assert!(drag.is_smaller_than(2.0));
        drag.update(Point::new(1.0, 30.0));
        assert!(!drag.is_smaller_than(2.0));
    }
}
