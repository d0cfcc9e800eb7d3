//! Rectangle, ellipse and polygon payloads.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Outline drawn inside a shape's rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

/// A rectangle-framed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub rect: Rect,
}

impl Shape {
    pub fn new(kind: ShapeKind, rect: Rect) -> Self {
        Self {
            kind,
            rect: rect.abs(),
        }
    }

    /// Create a shape from two corner points.
    pub fn from_corners(kind: ShapeKind, p1: Point, p2: Point) -> Self {
        Self::new(kind, Rect::from_points(p1, p2))
    }

    /// Binding points on the outline: top, right, bottom and left edge midpoints.
    pub fn anchor_points(&self) -> [Point; 4] {
        let r = self.rect;
        let c = r.center();
        [
            Point::new(c.x, r.y0),
            Point::new(r.x1, c.y),
            Point::new(c.x, r.y1),
            Point::new(r.x0, c.y),
        ]
    }
}

/// A polygon (closed) or polyline (open) built from clicked vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub closed: bool,
}

impl Polygon {
    pub fn new(points: Vec<Point>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Bounding box of all vertices.
    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(*first, *first), |acc, p| {
            acc.union_pt(*p)
        })
    }

    /// Segments between consecutive vertices, including the closing edge.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let mut segments: Vec<(Point, Point)> =
            self.points.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && self.points.len() > 2 {
            if let (Some(&last), Some(&first)) = (self.points.last(), self.points.first()) {
                segments.push((last, first));
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_corners() {
        let shape = Shape::from_corners(
            ShapeKind::Rectangle,
            Point::new(100.0, 100.0),
            Point::new(50.0, 50.0),
        );
        assert!((shape.rect.x0 - 50.0).abs() < f64::EPSILON);
        assert!((shape.rect.width() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_anchor_points() {
        let shape = Shape::new(ShapeKind::Ellipse, Rect::new(0.0, 0.0, 10.0, 20.0));
        let anchors = shape.anchor_points();
        assert_eq!(anchors[0], Point::new(5.0, 0.0));
        assert_eq!(anchors[1], Point::new(10.0, 10.0));
        assert_eq!(anchors[2], Point::new(5.0, 20.0));
        assert_eq!(anchors[3], Point::new(0.0, 10.0));
    }

    #[test]
    fn test_polygon_bounds_and_segments() {
        let polygon = Polygon::new(
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 8.0),
            ],
            true,
        );
        assert_eq!(polygon.bounds(), Rect::new(0.0, 0.0, 10.0, 8.0));
        assert_eq!(polygon.segments().len(), 3);

        let polyline = Polygon::new(polygon.points.clone(), false);
        assert_eq!(polyline.segments().len(), 2);
    }
}
