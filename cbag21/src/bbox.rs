//!
//! # Rectangular Bounding Boxes and Associated Trait
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    geom::{
        Point, Polygon, Polygon45, Polygon45Set, Polygon90, Rect, Shape, Transform, TransformTrait,
    },
    Int,
};

/// # Rectangular Bounding Box
///
/// Points `p0` and `p1` represent opposite corners of a bounding rectangle.
/// `p0` is always closest to negative-infinity, in both x and y,
/// and `p1` is always closest to positive-infinity.
///
/// The [BoundBox::empty] box is "inverted", with `p0` above and right of `p1`,
/// so that its union with any other box produces the other box.
///
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct BoundBox {
    pub p0: Point,
    pub p1: Point,
}
impl BoundBox {
    /// Create a new [BoundBox] from two [Point]s.
    /// Callers are responsible for ensuring that p0.x <= p1.x, and p0.y <= p1.y.
    fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Create a new [BoundBox] from a single [Point].
    /// The resultant [BoundBox] comprises solely the point, having zero area.
    pub fn from_point(pt: Point) -> Self {
        Self { p0: pt, p1: pt }
    }
    /// Create a new [BoundBox] from two points
    pub fn from_points(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Create from lower-left (x0,y0) and upper-right (x1,y1) coordinates
    pub fn from_coords(x0: Int, y0: Int, x1: Int, y1: Int) -> Self {
        Self::from_points(Point::new(x0, y0), Point::new(x1, y1))
    }
    /// Create an empty, otherwise invalid [BoundBox]
    pub fn empty() -> Self {
        Self {
            p0: Point::new(Int::MAX, Int::MAX),
            p1: Point::new(Int::MIN, Int::MIN),
        }
    }
    /// Boolean indication of whether a box is empty
    pub fn is_empty(&self) -> bool {
        self.p0.x > self.p1.x || self.p0.y > self.p1.y
    }
    /// Boolean indication of whether [Point] `pt` lies inside out box.
    pub fn contains(&self, pt: &Point) -> bool {
        self.p0.x <= pt.x && self.p1.x >= pt.x && self.p0.y <= pt.y && self.p1.y >= pt.y
    }
    /// Boolean indication of whether we touch or overlap `other`
    pub fn intersects(&self, other: &BoundBox) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.p0.x <= other.p1.x
            && other.p0.x <= self.p1.x
            && self.p0.y <= other.p1.y
            && other.p0.y <= self.p1.y
    }
    /// Expand an existing [BoundBox] in all directions by `delta`
    pub fn expand(&mut self, delta: Int) {
        self.expand_xy(delta, delta)
    }
    /// Expand by `dx` in the x-direction and `dy` in the y-direction.
    /// Empty boxes stay empty.
    pub fn expand_xy(&mut self, dx: Int, dy: Int) {
        if self.is_empty() {
            return;
        }
        self.p0.x -= dx;
        self.p0.y -= dy;
        self.p1.x += dx;
        self.p1.y += dy;
    }
    /// Get the box's size as an (x,y) tuple
    pub fn size(&self) -> (Int, Int) {
        (self.p1.x - self.p0.x, self.p1.y - self.p0.y)
    }
    /// Convert to a [Rect]. Returns `None` for empty boxes.
    pub fn to_rect(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        Some(Rect::new(self.p0, self.p1))
    }
    /// Convert to a [geo::Rect]
    pub fn to_geo(&self) -> geo::Rect<f64> {
        geo::Rect::new(
            geo::coord! { x: self.p0.x as f64, y: self.p0.y as f64 },
            geo::coord! { x: self.p1.x as f64, y: self.p1.y as f64 },
        )
    }
    /// Convert to an [rstar::AABB], for spatial indexing
    pub fn to_aabb(&self) -> rstar::AABB<[Int; 2]> {
        rstar::AABB::from_corners([self.p0.x, self.p0.y], [self.p1.x, self.p1.y])
    }
}
impl TransformTrait for BoundBox {
    /// Transform both corners and re-sort them. Empty boxes stay empty.
    fn transform(&self, trans: &Transform) -> Self {
        if self.is_empty() {
            return Self::empty();
        }
        Self::from_points(self.p0.transform(trans), self.p1.transform(trans))
    }
}

///
/// # Bounding Box Trait
///
/// Methods for interacting with [BoundBox]s.
/// Implementations for [Point]s, [Shape]s, and [BoundBox]s
/// enable geometric transformations such as union and intersection.
///
pub trait BoundBoxTrait {
    /// Compute the intersection with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn intersection(&self, bbox: &BoundBox) -> BoundBox {
        let this = self.bbox();
        let pmin = Point::new(this.p0.x.max(bbox.p0.x), this.p0.y.max(bbox.p0.y));
        let pmax = Point::new(this.p1.x.min(bbox.p1.x), this.p1.y.min(bbox.p1.y));
        if pmin.x > pmax.x || pmin.y > pmax.y {
            return BoundBox::empty();
        }
        BoundBox::new(pmin, pmax)
    }
    /// Compute the union with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        let this = self.bbox();
        BoundBox::new(
            Point::new(this.p0.x.min(bbox.p0.x), this.p0.y.min(bbox.p0.y)),
            Point::new(this.p1.x.max(bbox.p1.x), this.p1.y.max(bbox.p1.y)),
        )
    }
    /// Compute a rectangular bounding box around the implementing type.
    fn bbox(&self) -> BoundBox;
}

impl BoundBoxTrait for BoundBox {
    fn bbox(&self) -> BoundBox {
        *self
    }
}
impl BoundBoxTrait for Point {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_point(*self)
    }
}
impl BoundBoxTrait for [Point] {
    fn bbox(&self) -> BoundBox {
        self.iter().fold(BoundBox::empty(), |b, p| p.union(&b))
    }
}
impl BoundBoxTrait for Rect {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_points(self.p0, self.p1)
    }
}
impl BoundBoxTrait for Polygon {
    fn bbox(&self) -> BoundBox {
        self.points.bbox()
    }
}
impl BoundBoxTrait for Polygon90 {
    fn bbox(&self) -> BoundBox {
        self.points().bbox()
    }
}
impl BoundBoxTrait for Polygon45 {
    fn bbox(&self) -> BoundBox {
        self.points().bbox()
    }
}
impl BoundBoxTrait for Polygon45Set {
    fn bbox(&self) -> BoundBox {
        self.polys()
            .iter()
            .fold(BoundBox::empty(), |b, p| p.bbox().union(&b))
    }
}
impl BoundBoxTrait for Shape {
    fn bbox(&self) -> BoundBox {
        match self {
            Shape::Rect(r) => r.bbox(),
            Shape::Poly90(p) => p.bbox(),
            Shape::Poly45(p) => p.bbox(),
            Shape::Poly45Set(p) => p.bbox(),
            Shape::Poly(p) => p.bbox(),
        }
    }
}
