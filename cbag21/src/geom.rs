//!
//! # Geometry Module
//!
//! Defines the core geometric types including [Point], [Shape], and [Transform],
//! and their core operations.
//!

// Crates.io
use derive_more::{Add, AddAssign, Sub, SubAssign};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    error::{LayoutError, LayoutResult},
    polyset::GeometryMode,
    utils::{enumstr, EnumStr},
    Int,
};

/// # Point in two-dimensional layout-space
///
/// Also used as an (x,y) vector of sizes and offsets, e.g. in via parameters.
///
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Add,
    AddAssign,
    Sub,
    SubAssign,
)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Create a new [Point] which serves as an offset in direction `dir`
    pub fn offset(val: Int, dir: Dir) -> Self {
        match dir {
            Dir::Horiz => Self { x: val, y: 0 },
            Dir::Vert => Self { x: 0, y: val },
        }
    }
    /// Get the coordinate associated with direction `dir`
    pub fn coord(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
}
impl From<(Int, Int)> for Point {
    fn from(xy: (Int, Int)) -> Self {
        Self::new(xy.0, xy.1)
    }
}

enumstr!(
    /// # Direction Enumeration
    ///
    /// Track and wire directions. Rule-files write these as "x" and "y".
    Dir {
        Horiz: "x",
        Vert: "y",
    }
);
impl Dir {
    /// Whichever direction we are, return the other one.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
    /// Index into per-direction arrays: horizontal first
    pub fn index(self) -> usize {
        match self {
            Self::Horiz => 0,
            Self::Vert => 1,
        }
    }
    /// Create from a boolean "is horizontal" flag
    pub fn from_horiz(horiz: bool) -> Self {
        if horiz {
            Self::Horiz
        } else {
            Self::Vert
        }
    }
}
impl std::ops::Not for Dir {
    type Output = Self;
    /// Exclamation Operator returns the opposite direction
    fn not(self) -> Self::Output {
        self.other()
    }
}

enumstr!(
    /// # Placement Orientations
    ///
    /// The eight orthogonal rotations and reflections.
    /// Reflected variants mirror first, then rotate.
    Orientation {
        R0: "R0",
        R90: "R90",
        R180: "R180",
        R270: "R270",
        MX: "MX",
        MY: "MY",
        MXR90: "MXR90",
        MYR90: "MYR90",
    }
);
impl Default for Orientation {
    fn default() -> Self {
        Self::R0
    }
}
impl Orientation {
    /// Row-major rotation/reflection matrix
    pub fn matrix(&self) -> [[Int; 2]; 2] {
        match self {
            Self::R0 => [[1, 0], [0, 1]],
            Self::R90 => [[0, -1], [1, 0]],
            Self::R180 => [[-1, 0], [0, -1]],
            Self::R270 => [[0, 1], [-1, 0]],
            Self::MX => [[1, 0], [0, -1]],
            Self::MY => [[-1, 0], [0, 1]],
            Self::MXR90 => [[0, 1], [1, 0]],
            Self::MYR90 => [[0, -1], [-1, 0]],
        }
    }
    /// Inverse of [Orientation::matrix].
    /// Products and transposes of orientation matrices are always orientation matrices.
    fn from_matrix(m: [[Int; 2]; 2]) -> Self {
        match m {
            [[1, 0], [0, 1]] => Self::R0,
            [[0, -1], [1, 0]] => Self::R90,
            [[-1, 0], [0, -1]] => Self::R180,
            [[0, 1], [-1, 0]] => Self::R270,
            [[1, 0], [0, -1]] => Self::MX,
            [[-1, 0], [0, 1]] => Self::MY,
            [[0, 1], [1, 0]] => Self::MXR90,
            [[0, -1], [-1, 0]] => Self::MYR90,
            _ => unreachable!("Invalid orientation matrix {:?}", m),
        }
    }
    /// Boolean indication of whether we exchange the x and y axes
    pub fn swaps_axes(&self) -> bool {
        self.matrix()[0][0] == 0
    }
}

/// # Placement Transform
///
/// Orthogonal [Orientation] about the origin, followed by translation to `loc`.
/// All coordinates stay integral.
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transform {
    pub loc: Point,
    pub orient: Orientation,
}
impl Transform {
    pub fn new(loc: Point, orient: Orientation) -> Self {
        Self { loc, orient }
    }
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self::default()
    }
    /// Translation by (x,y)
    pub fn translate(x: Int, y: Int) -> Self {
        Self::new(Point::new(x, y), Orientation::R0)
    }
    /// Copy of `self`, moved by (dx,dy) in parent coordinates
    pub fn move_by(&self, dx: Int, dy: Int) -> Self {
        Self::new(self.loc + Point::new(dx, dy), self.orient)
    }
    /// Apply to the (x,y) pair (`x`,`y`)
    pub fn apply(&self, x: Int, y: Int) -> (Int, Int) {
        let a = self.orient.matrix();
        (
            a[0][0] * x + a[0][1] * y + self.loc.x,
            a[1][0] * x + a[1][1] * y + self.loc.y,
        )
    }
    /// Apply to a floating-point (x,y) pair, as used by polygon-set data
    pub fn apply_f64(&self, x: f64, y: f64) -> (f64, f64) {
        let a = self.orient.matrix();
        (
            a[0][0] as f64 * x + a[0][1] as f64 * y + self.loc.x as f64,
            a[1][0] as f64 * x + a[1][1] as f64 * y + self.loc.y as f64,
        )
    }
    /// Create a new [Transform] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    /// Applying the result equals applying `child`, and then `parent`.
    ///
    /// Note this operation *is not* commutative.
    ///
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        let (x, y) = parent.apply(child.loc.x, child.loc.y);
        let orient = Orientation::from_matrix(matmul(
            &parent.orient.matrix(),
            &child.orient.matrix(),
        ));
        Self::new(Point::new(x, y), orient)
    }
    /// The inverse transform, such that cascading with `self` produces the identity
    pub fn invert(&self) -> Transform {
        let a = self.orient.matrix();
        let at = [[a[0][0], a[1][0]], [a[0][1], a[1][1]]];
        let loc = Point::new(
            -(at[0][0] * self.loc.x + at[0][1] * self.loc.y),
            -(at[1][0] * self.loc.x + at[1][1] * self.loc.y),
        );
        Self::new(loc, Orientation::from_matrix(at))
    }
}
/// Multiply 2x2 matrices, returning a new 2x2 matrix
fn matmul(a: &[[Int; 2]; 2], b: &[[Int; 2]; 2]) -> [[Int; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}

pub trait TransformTrait {
    /// Apply [Transform] `trans`.
    /// Creates a new object at a location equal to the transformation of our own.
    fn transform(&self, trans: &Transform) -> Self;
}
impl TransformTrait for Point {
    fn transform(&self, trans: &Transform) -> Self {
        let (x, y) = trans.apply(self.x, self.y);
        Point::new(x, y)
    }
}

/// # Two-Dimensional Array Parameters
///
/// `nx` by `ny` copies at pitches `spx` and `spy`.
/// Shared by instance arrays, rectangle arrays, and via arrays.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Array2d {
    pub nx: Int,
    pub ny: Int,
    pub spx: Int,
    pub spy: Int,
}
impl Array2d {
    /// Create a new [Array2d]. Counts must be at least one.
    pub fn new(nx: Int, ny: Int, spx: Int, spy: Int) -> LayoutResult<Self> {
        if nx < 1 || ny < 1 {
            return Err(LayoutError::out_of_range(format!(
                "Invalid array counts ({}, {})",
                nx, ny
            )));
        }
        Ok(Self { nx, ny, spx, spy })
    }
    /// A single, non-repeated element
    pub fn single() -> Self {
        Self {
            nx: 1,
            ny: 1,
            spx: 0,
            spy: 0,
        }
    }
    /// Offsets of each element, column by column
    pub fn offsets(&self) -> Vec<Point> {
        let mut rv = Vec::with_capacity((self.nx * self.ny).max(0) as usize);
        for ix in 0..self.nx {
            for iy in 0..self.ny {
                rv.push(Point::new(ix * self.spx, iy * self.spy));
            }
        }
        rv
    }
    /// Offset of the last element relative to the first
    pub fn span(&self) -> Point {
        Point::new((self.nx - 1) * self.spx, (self.ny - 1) * self.spy)
    }
}
impl Default for Array2d {
    fn default() -> Self {
        Self::single()
    }
}

/// # Rectangle
///
/// Axis-aligned rectangle, specified by two opposite corners.
/// `p0` is always the lower-left corner, and `p1` the upper-right.
///
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    /// Create a new [Rect] from any two opposite corners
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Create from lower-left (x0,y0) and upper-right (x1,y1) coordinates
    pub fn from_coords(x0: Int, y0: Int, x1: Int, y1: Int) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1))
    }
    /// Create a [Rect] along a track running in direction `dir`,
    /// spanning [`lower`,`upper`] along the track and [`lo`,`hi`] across it.
    pub fn from_dir(dir: Dir, lower: Int, upper: Int, lo: Int, hi: Int) -> Self {
        match dir {
            Dir::Horiz => Self::from_coords(lower, lo, upper, hi),
            Dir::Vert => Self::from_coords(lo, lower, hi, upper),
        }
    }
    pub fn width(&self) -> Int {
        self.p1.x - self.p0.x
    }
    pub fn height(&self) -> Int {
        self.p1.y - self.p0.y
    }
    pub fn area(&self) -> Int {
        self.width() * self.height()
    }
    /// Calculate our center-point
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }
}
impl TransformTrait for Rect {
    fn transform(&self, trans: &Transform) -> Self {
        Rect::new(self.p0.transform(trans), self.p1.transform(trans))
    }
}

/// # Polygon
///
/// Closed n-sided polygon with arbitrary edge angles.
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Polygon {
    pub points: Vec<Point>,
}
impl Polygon {
    /// Create a new [Polygon]. Requires at least three points.
    pub fn new(points: Vec<Point>) -> LayoutResult<Self> {
        check_edges(&points, 3, "polygon", |_, _| true)?;
        Ok(Self { points })
    }
}
impl TransformTrait for Polygon {
    fn transform(&self, trans: &Transform) -> Self {
        Polygon {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}

/// # Rectilinear Polygon
///
/// Every edge is horizontal or vertical.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Polygon90 {
    points: Vec<Point>,
}
impl Polygon90 {
    /// Create a new [Polygon90], checking that every edge is axis-aligned
    pub fn new(points: Vec<Point>) -> LayoutResult<Self> {
        check_edges(&points, 4, "rectilinear polygon", |dx, dy| {
            dx == 0 || dy == 0
        })?;
        Ok(Self { points })
    }
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}
impl TransformTrait for Polygon90 {
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}

/// # 45-Degree Polygon
///
/// Every edge is horizontal, vertical, or diagonal at 45 degrees.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Polygon45 {
    points: Vec<Point>,
}
impl Polygon45 {
    /// Create a new [Polygon45], checking every edge angle
    pub fn new(points: Vec<Point>) -> LayoutResult<Self> {
        check_edges(&points, 3, "45-degree polygon", |dx, dy| {
            dx == 0 || dy == 0 || dx.abs() == dy.abs()
        })?;
        Ok(Self { points })
    }
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}
impl TransformTrait for Polygon45 {
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}

/// # Set of 45-Degree Polygons
///
/// Non-empty. Members may overlap.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "Vec<Polygon45>", into = "Vec<Polygon45>")]
pub struct Polygon45Set {
    polys: Vec<Polygon45>,
}
impl Polygon45Set {
    /// Create a new [Polygon45Set]. Fails if `polys` is empty.
    pub fn new(polys: Vec<Polygon45>) -> LayoutResult<Self> {
        if polys.is_empty() {
            return Err(LayoutError::representation("Empty 45-degree polygon set"));
        }
        Ok(Self { polys })
    }
    pub fn polys(&self) -> &[Polygon45] {
        &self.polys
    }
}
impl TryFrom<Vec<Polygon45>> for Polygon45Set {
    type Error = LayoutError;
    fn try_from(polys: Vec<Polygon45>) -> LayoutResult<Self> {
        Self::new(polys)
    }
}
impl From<Polygon45Set> for Vec<Polygon45> {
    fn from(set: Polygon45Set) -> Self {
        set.polys
    }
}
impl TransformTrait for Polygon45Set {
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            polys: self.polys.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}

/// Check polygon `points`: at least `min_pts` of them,
/// and every edge (including closure) accepted by `edge_ok(dx, dy)`
fn check_edges(
    points: &[Point],
    min_pts: usize,
    kind: &str,
    edge_ok: impl Fn(Int, Int) -> bool,
) -> LayoutResult<()> {
    if points.len() < min_pts {
        return Err(LayoutError::representation(format!(
            "Invalid {} with {} points",
            kind,
            points.len()
        )));
    }
    for (idx, p) in points.iter().enumerate() {
        let next = &points[(idx + 1) % points.len()];
        if !edge_ok(next.x - p.x, next.y - p.y) {
            return Err(LayoutError::representation(format!(
                "Invalid {} edge from {:?} to {:?}",
                kind, p, next
            )));
        }
    }
    Ok(())
}

/// # Shape
///
/// The geometric primitives accepted by [crate::Geometry].
/// Variants are ordered from least to most general.
///
#[enum_dispatch(ShapeTrait)]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Shape {
    Rect(Rect),
    Poly90(Polygon90),
    Poly45(Polygon45),
    Poly45Set(Polygon45Set),
    Poly(Polygon),
}
impl Shape {
    /// Boolean indication of whether we touch or overlap `bbox`.
    /// Shared edges and corners count as intersecting.
    pub fn intersects_box(&self, bbox: &BoundBox) -> bool {
        use geo::Intersects;
        if bbox.is_empty() || !self.bbox().intersects(bbox) {
            return false;
        }
        match self {
            // Bounding-box overlap is exact for rectangles
            Shape::Rect(_) => true,
            _ => self.to_geo().intersects(&bbox.to_geo()),
        }
    }
}
impl TransformTrait for Shape {
    fn transform(&self, trans: &Transform) -> Self {
        match self {
            Shape::Rect(r) => Shape::Rect(r.transform(trans)),
            Shape::Poly90(p) => Shape::Poly90(p.transform(trans)),
            Shape::Poly45(p) => Shape::Poly45(p.transform(trans)),
            Shape::Poly45Set(p) => Shape::Poly45Set(p.transform(trans)),
            Shape::Poly(p) => Shape::Poly(p.transform(trans)),
        }
    }
}

/// # ShapeTrait
///
/// Common shape operations, dispatched from the [Shape] enum to its variants by [enum_dispatch].
///
#[enum_dispatch]
pub trait ShapeTrait {
    /// The least general [GeometryMode] able to hold this shape
    fn mode(&self) -> GeometryMode;
    /// Convert to a [geo::MultiPolygon], for polygon-set algebra
    fn to_geo(&self) -> geo::MultiPolygon<f64>;
}
impl ShapeTrait for Rect {
    fn mode(&self) -> GeometryMode {
        GeometryMode::Poly90
    }
    fn to_geo(&self) -> geo::MultiPolygon<f64> {
        self.bbox().to_geo().to_polygon().into()
    }
}
impl ShapeTrait for Polygon90 {
    fn mode(&self) -> GeometryMode {
        GeometryMode::Poly90
    }
    fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo_polygon(&self.points).into()
    }
}
impl ShapeTrait for Polygon45 {
    fn mode(&self) -> GeometryMode {
        GeometryMode::Poly45
    }
    fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo_polygon(&self.points).into()
    }
}
impl ShapeTrait for Polygon45Set {
    fn mode(&self) -> GeometryMode {
        GeometryMode::Poly45
    }
    fn to_geo(&self) -> geo::MultiPolygon<f64> {
        // Members may overlap; merge them into a valid multi-polygon
        use geo::BooleanOps;
        let mut rv = geo::MultiPolygon::new(vec![]);
        for p in self.polys.iter() {
            rv = rv.union(&geo_polygon(&p.points));
        }
        rv
    }
}
impl ShapeTrait for Polygon {
    fn mode(&self) -> GeometryMode {
        GeometryMode::Poly
    }
    fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo_polygon(&self.points).into()
    }
}
/// Convert a closed loop of `points` to a hole-free [geo::Polygon]
fn geo_polygon(points: &[Point]) -> geo::Polygon<f64> {
    let ring: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    geo::Polygon::new(geo::LineString::from(ring), vec![])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_rect() -> Shape {
        Shape::Rect(Rect::from_coords(0, 0, 1, 1))
    }
    #[test]
    fn transform_identity() {
        let trans = Transform::identity();
        assert_eq!(unit_rect().transform(&trans), unit_rect());
    }
    #[test]
    fn transform_rotate() {
        let trans = Transform::new(Point::default(), Orientation::R90);
        let shape2 = unit_rect().transform(&trans);
        assert_eq!(shape2, Shape::Rect(Rect::from_coords(-1, 0, 0, 1)));
        let shape3 = shape2.transform(&trans);
        assert_eq!(shape3, Shape::Rect(Rect::from_coords(-1, -1, 0, 0)));
        let shape4 = shape3.transform(&trans);
        assert_eq!(shape4, Shape::Rect(Rect::from_coords(0, -1, 1, 0)));
        assert_eq!(shape4.transform(&trans), unit_rect());
    }
    #[test]
    fn test_cascade() {
        let refl = Transform::new(Point::default(), Orientation::MX);
        let shift = Transform::translate(1, 1);
        let p = Point::new(1, 1);

        // Reflect after shifting
        let c1 = Transform::cascade(&refl, &shift);
        assert_eq!(p.transform(&c1), Point::new(2, -2));
        // Shift after reflecting
        let c2 = Transform::cascade(&shift, &refl);
        assert_eq!(p.transform(&c2), Point::new(2, 0));
    }
    #[test]
    fn cascade_is_associative() {
        let a = Transform::new(Point::new(3, -7), Orientation::R90);
        let b = Transform::new(Point::new(-2, 5), Orientation::MY);
        let c = Transform::new(Point::new(11, 4), Orientation::MXR90);
        let ab_c = Transform::cascade(&Transform::cascade(&a, &b), &c);
        let a_bc = Transform::cascade(&a, &Transform::cascade(&b, &c));
        assert_eq!(ab_c, a_bc);
        let p = Point::new(6, 9);
        assert_eq!(
            p.transform(&ab_c),
            p.transform(&c).transform(&b).transform(&a)
        );
    }
    #[test]
    fn invert_all_orientations() {
        use Orientation::*;
        for orient in [R0, R90, R180, R270, MX, MY, MXR90, MYR90] {
            let t = Transform::new(Point::new(13, -4), orient);
            let c = Transform::cascade(&t, &t.invert());
            assert_eq!(c, Transform::identity(), "{}", orient);
            let p = Point::new(-3, 8);
            assert_eq!(p.transform(&t).transform(&t.invert()), p);
        }
        assert!(R90.swaps_axes());
        assert!(!MX.swaps_axes());
    }
    #[test]
    fn polygon_validation() {
        let l_shape = vec![
            Point::new(0, 0),
            Point::new(20, 0),
            Point::new(20, 10),
            Point::new(10, 10),
            Point::new(10, 20),
            Point::new(0, 20),
        ];
        assert!(Polygon90::new(l_shape.clone()).is_ok());
        assert!(Polygon45::new(l_shape).is_ok());

        let chamfer = vec![
            Point::new(0, 0),
            Point::new(20, 0),
            Point::new(20, 10),
            Point::new(10, 20),
            Point::new(0, 20),
        ];
        assert!(Polygon90::new(chamfer.clone()).is_err());
        assert!(Polygon45::new(chamfer.clone()).is_ok());

        let skewed = vec![Point::new(0, 0), Point::new(20, 0), Point::new(5, 7)];
        assert!(Polygon45::new(skewed.clone()).is_err());
        assert!(Polygon::new(skewed).is_ok());
        assert!(Polygon::new(vec![Point::new(0, 0), Point::new(1, 1)]).is_err());
    }
    #[test]
    fn shape_modes() -> LayoutResult<()> {
        let tri = Polygon45::new(vec![Point::new(0, 0), Point::new(4, 0), Point::new(0, 4)])?;
        assert_eq!(Shape::from(Rect::default()).mode(), GeometryMode::Poly90);
        assert_eq!(Shape::from(tri.clone()).mode(), GeometryMode::Poly45);
        assert_eq!(
            Shape::from(Polygon45Set::new(vec![tri])?).mode(),
            GeometryMode::Poly45
        );
        assert!(matches!(
            Polygon45Set::new(Vec::new()),
            Err(LayoutError::Representation(_))
        ));
        Ok(())
    }
    #[test]
    fn shape_intersects_box() -> LayoutResult<()> {
        // Right triangle with its hypotenuse running from (10,0) to (0,10)
        let tri = Shape::Poly45(Polygon45::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(0, 10),
        ])?);
        // Inside the bounding box, but beyond the hypotenuse
        assert!(!tri.intersects_box(&BoundBox::from_coords(8, 8, 10, 10)));
        // Touching the hypotenuse at (5,5)
        assert!(tri.intersects_box(&BoundBox::from_coords(5, 5, 10, 10)));
        // Abutting the left edge
        let rect = Shape::Rect(Rect::from_coords(0, 0, 10, 10));
        assert!(rect.intersects_box(&BoundBox::from_coords(-5, 0, 0, 3)));
        assert!(!rect.intersects_box(&BoundBox::from_coords(-5, 0, -1, 3)));
        Ok(())
    }
    #[test]
    fn array_offsets() -> LayoutResult<()> {
        let arr = Array2d::new(2, 3, 10, -5)?;
        assert_eq!(arr.offsets().len(), 6);
        assert_eq!(arr.offsets()[1], Point::new(0, -5));
        assert_eq!(arr.span(), Point::new(10, -10));
        assert!(Array2d::new(0, 1, 0, 0).is_err());
        Ok(())
    }
    #[test]
    fn parse_dirs() {
        assert_eq!("x".parse::<Dir>(), Ok(Dir::Horiz));
        assert_eq!(!Dir::Horiz, Dir::Vert);
        assert_eq!("MXR90".parse::<Orientation>(), Ok(Orientation::MXR90));
    }
}
