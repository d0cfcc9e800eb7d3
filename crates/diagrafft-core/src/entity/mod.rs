//! Entities: everything that can be painted or selected.

mod connection;
mod group;
mod shape;

pub use connection::Connection;
pub use group::Group;
pub use shape::{Polygon, Shape, ShapeKind};

use crate::connector::ConnectorId;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for entities.
pub type EntityId = Uuid;

/// Optional behaviours an entity opts into. Queried instead of inspecting the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// May be scaled by the transform tool.
    pub resizable: bool,
    /// Exposes anchors that connection endpoints can attach to.
    pub connectable: bool,
    /// Reacts to the pointer hovering over it.
    pub hoverable: bool,
    /// Consumes pointer clicks itself; moving it by drag is blocked.
    pub mouse: bool,
    /// Accepts typed text into its label while selected.
    pub keyboard: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            resizable: true,
            connectable: true,
            hoverable: true,
            mouse: false,
            keyboard: true,
        }
    }
}

impl Capabilities {
    /// Capabilities of a connection line.
    pub fn connection() -> Self {
        Self {
            resizable: true,
            connectable: false,
            hoverable: true,
            mouse: false,
            keyboard: false,
        }
    }

    /// Capabilities of a group wrapper.
    pub fn group() -> Self {
        Self {
            resizable: true,
            connectable: false,
            hoverable: false,
            mouse: false,
            keyboard: false,
        }
    }
}

/// The kind-specific payload of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Shape(Shape),
    Polygon(Polygon),
    Connection(Connection),
    Group(Group),
}

/// Geometry an entity owns directly, used for move and transform snapshots.
/// Connections and groups own none: their geometry derives from connectors and members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Rect(Rect),
    Points(Vec<Point>),
    Derived,
}

impl Geometry {
    /// Apply an affine map. Rectangles stay axis aligned and normalized.
    pub fn transformed(&self, affine: Affine) -> Geometry {
        match self {
            Geometry::Rect(rect) => {
                let p0 = affine * Point::new(rect.x0, rect.y0);
                let p1 = affine * Point::new(rect.x1, rect.y1);
                Geometry::Rect(Rect::from_points(p0, p1))
            }
            Geometry::Points(points) => {
                Geometry::Points(points.iter().map(|&p| affine * p).collect())
            }
            Geometry::Derived => Geometry::Derived,
        }
    }

    pub fn translated(&self, delta: Vec2) -> Geometry {
        self.transformed(Affine::translate(delta))
    }
}

/// A paintable, selectable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub(crate) id: EntityId,
    pub kind: EntityKind,
    pub capabilities: Capabilities,
    /// Group this entity is a member of.
    pub parent: Option<EntityId>,
    /// Connectors owned by this entity.
    pub connectors: Vec<ConnectorId>,
    /// Free text typed into the entity.
    #[serde(default)]
    pub label: Option<String>,
}

impl Entity {
    /// Wrap a kind into a new entity with a fresh id.
    pub fn new(kind: EntityKind, capabilities: Capabilities) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            capabilities,
            parent: None,
            connectors: Vec::new(),
            label: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, EntityKind::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match &self.kind {
            EntityKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match &mut self.kind {
            EntityKind::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_connection(&self) -> Option<&Connection> {
        match &self.kind {
            EntityKind::Connection(c) => Some(c),
            _ => None,
        }
    }

    /// Whether the transform tool may scale this entity.
    pub fn is_resizable(&self) -> bool {
        self.capabilities.resizable
    }

    /// Owned geometry snapshot.
    pub fn geometry(&self) -> Geometry {
        match &self.kind {
            EntityKind::Shape(shape) => Geometry::Rect(shape.rect),
            EntityKind::Polygon(polygon) => Geometry::Points(polygon.points.clone()),
            EntityKind::Connection(_) | EntityKind::Group(_) => Geometry::Derived,
        }
    }

    /// Replace the owned geometry. Mismatched geometry kinds are ignored.
    pub fn set_geometry(&mut self, geometry: &Geometry) {
        match (&mut self.kind, geometry) {
            (EntityKind::Shape(shape), Geometry::Rect(rect)) => shape.rect = *rect,
            (EntityKind::Polygon(polygon), Geometry::Points(points))
                if points.len() == polygon.points.len() =>
            {
                polygon.points.clone_from(points);
            }
            _ => {}
        }
    }

    /// Bounds that do not depend on other model objects.
    /// `None` for connections, whose bounds come from their endpoint connectors.
    pub fn intrinsic_bounds(&self) -> Option<Rect> {
        match &self.kind {
            EntityKind::Shape(shape) => Some(shape.rect),
            EntityKind::Polygon(polygon) => Some(polygon.bounds()),
            EntityKind::Group(group) => Some(group.bounds),
            EntityKind::Connection(_) => None,
        }
    }
}

/// Distance from a point to the segment a-b.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq < f64::EPSILON {
        return (point - a).hypot();
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    (point - projection).hypot()
}

/// Whether two rectangles overlap or touch. Works for zero-area rectangles.
pub fn rects_touch(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Whether `inner` lies fully inside `outer`, edges included.
pub fn rect_contains_rect(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}
