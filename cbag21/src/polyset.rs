//!
//! # Polygon Sets
//!
//! Merged shape-data of a single layer, in one of three [GeometryMode]s.
//! Rectilinear data is held exactly, as a set of disjoint integer [Rect]s.
//! 45-degree and general data are held as [geo::MultiPolygon]s, merged with [geo::BooleanOps].
//!

// Crates.io
use geo::{Area, BooleanOps, MapCoords};
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    geom::{Point, Polygon90, Rect, Shape, ShapeTrait, Transform, TransformTrait},
    utils::{enumstr, EnumStr},
};

enumstr!(
    /// # Geometry Modes
    ///
    /// Ordered from least to most general.
    /// Every mode admits the shapes of all less general modes.
    GeometryMode {
        Poly90: "poly90",
        Poly45: "poly45",
        Poly: "poly",
    }
);
impl Default for GeometryMode {
    fn default() -> Self {
        Self::Poly90
    }
}

/// # Rectangle Set
///
/// Union of rectilinear shapes, as pair-wise disjoint, non-degenerate [Rect]s.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RectSet {
    rects: Vec<Rect>,
}
impl RectSet {
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
    /// Add `rect`, keeping only its parts not already covered
    pub fn insert(&mut self, rect: Rect) {
        let mut pieces = vec![rect];
        for existing in self.rects.iter() {
            if pieces.is_empty() {
                return;
            }
            pieces = pieces
                .into_iter()
                .flat_map(|p| subtract(&p, existing))
                .collect();
        }
        self.rects.extend(pieces.into_iter().filter(|r| r.area() > 0));
    }
    /// Add rectilinear polygon `poly`
    pub fn insert_poly90(&mut self, poly: &Polygon90) {
        for r in slabs(poly.points()) {
            self.insert(r);
        }
    }
    pub fn area(&self) -> isize {
        self.rects.iter().map(Rect::area).sum()
    }
    pub fn to_geo(&self) -> geo::MultiPolygon<f64> {
        let mut rv = geo::MultiPolygon::new(vec![]);
        for r in self.rects.iter() {
            rv = rv.union(&r.to_geo());
        }
        rv
    }
}
impl TransformTrait for RectSet {
    /// Orthogonal transforms map disjoint rectangles to disjoint rectangles
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            rects: self.rects.iter().map(|r| r.transform(trans)).collect(),
        }
    }
}

/// The parts of `a` outside of `b`, as up to four disjoint rectangles
fn subtract(a: &Rect, b: &Rect) -> Vec<Rect> {
    let (x0, x1) = (a.p0.x.max(b.p0.x), a.p1.x.min(b.p1.x));
    let (y0, y1) = (a.p0.y.max(b.p0.y), a.p1.y.min(b.p1.y));
    if x0 >= x1 || y0 >= y1 {
        return vec![*a];
    }
    let candidates = [
        // Full-width strips below and above the overlap
        Rect::from_coords(a.p0.x, a.p0.y, a.p1.x, y0),
        Rect::from_coords(a.p0.x, y1, a.p1.x, a.p1.y),
        // Left and right of the overlap, within its rows
        Rect::from_coords(a.p0.x, y0, x0, y1),
        Rect::from_coords(x1, y0, a.p1.x, y1),
    ];
    candidates.into_iter().filter(|r| r.area() > 0).collect()
}

/// Split a closed rectilinear loop into horizontal slabs of rectangles, by even-odd crossing
fn slabs(points: &[Point]) -> Vec<Rect> {
    let mut ys: Vec<isize> = points.iter().map(|p| p.y).collect();
    ys.sort_unstable();
    ys.dedup();
    // Vertical edges, as (x, ylo, yhi)
    let edges: Vec<(isize, isize, isize)> = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .filter(|(a, b)| a.x == b.x && a.y != b.y)
        .map(|(a, b)| (a.x, a.y.min(b.y), a.y.max(b.y)))
        .collect();

    let mut rv = Vec::new();
    for w in ys.windows(2) {
        let (ylo, yhi) = (w[0], w[1]);
        let mut xs: Vec<isize> = edges
            .iter()
            .filter(|(_, lo, hi)| *lo <= ylo && *hi >= yhi)
            .map(|(x, _, _)| *x)
            .collect();
        xs.sort_unstable();
        for pair in xs.chunks_exact(2) {
            if pair[0] < pair[1] {
                rv.push(Rect::from_coords(pair[0], ylo, pair[1], yhi));
            }
        }
    }
    rv
}

/// # Polygon Set
///
/// Merged shape data, tagged by its [GeometryMode].
///
#[derive(Debug, Clone, PartialEq)]
pub enum PolySet {
    Poly90(RectSet),
    Poly45(geo::MultiPolygon<f64>),
    Poly(geo::MultiPolygon<f64>),
}
impl PolySet {
    /// Create a new, empty [PolySet] of `mode`
    pub fn new(mode: GeometryMode) -> Self {
        match mode {
            GeometryMode::Poly90 => Self::Poly90(RectSet::default()),
            GeometryMode::Poly45 => Self::Poly45(geo::MultiPolygon::new(vec![])),
            GeometryMode::Poly => Self::Poly(geo::MultiPolygon::new(vec![])),
        }
    }
    pub fn mode(&self) -> GeometryMode {
        match self {
            Self::Poly90(_) => GeometryMode::Poly90,
            Self::Poly45(_) => GeometryMode::Poly45,
            Self::Poly(_) => GeometryMode::Poly,
        }
    }
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Poly90(r) => r.is_empty(),
            Self::Poly45(m) | Self::Poly(m) => m.0.is_empty(),
        }
    }
    /// Union `shape` into the set.
    /// Fails if `shape` is more general than our mode.
    pub fn insert(&mut self, shape: &Shape) -> LayoutResult<()> {
        self.check_mode(shape.mode())?;
        match (self, shape) {
            (Self::Poly90(rects), Shape::Rect(r)) => rects.insert(*r),
            (Self::Poly90(rects), Shape::Poly90(p)) => rects.insert_poly90(p),
            (Self::Poly90(_), _) => {
                return Err(LayoutError::representation(format!(
                    "Cannot add {:?} to rectilinear geometry",
                    shape
                )))
            }
            (Self::Poly45(m), _) | (Self::Poly(m), _) => *m = m.union(&shape.to_geo()),
        }
        Ok(())
    }
    /// Union the contents of `other` into the set.
    /// Fails if `other` is more general than our mode.
    pub fn merge(&mut self, other: &PolySet) -> LayoutResult<()> {
        self.check_mode(other.mode())?;
        match self {
            Self::Poly90(rects) => {
                if let Self::Poly90(others) = other {
                    for r in others.rects() {
                        rects.insert(*r);
                    }
                }
            }
            Self::Poly45(m) | Self::Poly(m) => *m = m.union(&other.to_geo()),
        }
        Ok(())
    }
    /// Convert to `mode`. Conversion is only possible to modes at least as general as our own.
    pub fn convert(self, mode: GeometryMode) -> LayoutResult<PolySet> {
        if mode < self.mode() {
            return Err(LayoutError::representation(format!(
                "Cannot convert {} geometry to {}",
                self.mode(),
                mode
            )));
        }
        Ok(match mode {
            GeometryMode::Poly90 => self,
            GeometryMode::Poly45 => Self::Poly45(self.to_geo()),
            GeometryMode::Poly => Self::Poly(self.to_geo()),
        })
    }
    /// Total covered area
    pub fn area(&self) -> f64 {
        match self {
            Self::Poly90(r) => r.area() as f64,
            Self::Poly45(m) | Self::Poly(m) => m.unsigned_area(),
        }
    }
    /// Export as a merged [geo::MultiPolygon]
    pub fn to_geo(&self) -> geo::MultiPolygon<f64> {
        match self {
            Self::Poly90(r) => r.to_geo(),
            Self::Poly45(m) | Self::Poly(m) => m.clone(),
        }
    }
    fn check_mode(&self, mode: GeometryMode) -> LayoutResult<()> {
        if mode > self.mode() {
            return Err(LayoutError::representation(format!(
                "Cannot add {} data to {} geometry",
                mode,
                self.mode()
            )));
        }
        Ok(())
    }
}
impl TransformTrait for PolySet {
    fn transform(&self, trans: &Transform) -> Self {
        let xf = |m: &geo::MultiPolygon<f64>| {
            m.map_coords(|c| {
                let (x, y) = trans.apply_f64(c.x, c.y);
                geo::coord! { x: x, y: y }
            })
        };
        match self {
            Self::Poly90(r) => Self::Poly90(r.transform(trans)),
            Self::Poly45(m) => Self::Poly45(xf(m)),
            Self::Poly(m) => Self::Poly(xf(m)),
        }
    }
}
