//!
//! # Layer Geometry
//!
//! All shapes of a single layer-purpose pair within a cell.
//!

// Crates.io
use rstar::{RTree, RTreeObject, AABB};

// Local imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    error::{LayoutError, LayoutResult},
    geom::{Shape, Transform, TransformTrait},
    polyset::{GeometryMode, PolySet},
    Int,
};

/// # Indexed Shape
///
/// A shape as added to a [Geometry], with its preferred-orientation flag.
///
#[derive(Debug, Clone, PartialEq)]
pub struct GeoObject {
    pub shape: Shape,
    /// Whether the shape prefers horizontal orientation, e.g. as a horizontal wire
    pub horiz: bool,
    bbox: BoundBox,
}
impl GeoObject {
    fn new(shape: Shape, horiz: bool) -> Self {
        let bbox = shape.bbox();
        Self { shape, horiz, bbox }
    }
}
impl BoundBoxTrait for GeoObject {
    fn bbox(&self) -> BoundBox {
        self.bbox
    }
}
impl RTreeObject for GeoObject {
    type Envelope = AABB<[Int; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bbox.to_aabb()
    }
}

/// # Geometry
///
/// Holds two views of the same shapes:
/// * `data`, their merged union in the geometry's [GeometryMode], and
/// * `index`, each individually-added shape, in an R-tree for spatial queries.
///
/// Shapes recorded from instance masters merge into `data` only.
///
#[derive(Debug, Clone)]
pub struct Geometry {
    data: PolySet,
    index: RTree<GeoObject>,
    bbox: BoundBox,
}
impl Geometry {
    pub fn new(mode: GeometryMode) -> Self {
        Self {
            data: PolySet::new(mode),
            index: RTree::new(),
            bbox: BoundBox::empty(),
        }
    }
    pub fn mode(&self) -> GeometryMode {
        self.data.mode()
    }
    /// Union of every shape's bounding box, including those of recorded instances
    pub fn get_bbox(&self) -> BoundBox {
        self.bbox
    }
    /// Boolean indication of whether nothing has been added
    pub fn is_empty(&self) -> bool {
        self.bbox.is_empty() && self.data.is_empty()
    }
    /// Add `shape`, flagged as preferring horizontal orientation if `horiz`.
    /// Fails with [LayoutError::Representation] if `shape` is more general than our mode.
    pub fn add_shape(&mut self, shape: Shape, horiz: bool) -> LayoutResult<()> {
        self.data.insert(&shape)?;
        self.bbox = shape.bbox().union(&self.bbox);
        self.index.insert(GeoObject::new(shape, horiz));
        Ok(())
    }
    /// Merge the shapes of `master`, placed by `xform`.
    /// Only the merged data is recorded; the spatial index holds our own shapes.
    pub fn record_instance(&mut self, master: &Geometry, xform: &Transform) -> LayoutResult<()> {
        if master.mode() > self.mode() {
            return Err(LayoutError::representation(format!(
                "Cannot record {} master geometry in {} geometry",
                master.mode(),
                self.mode()
            )));
        }
        self.data.merge(&master.data.transform(xform))?;
        self.bbox = master.bbox.transform(xform).union(&self.bbox);
        Ok(())
    }
    /// Copy of our own indexed shapes, without any recorded instances
    pub(crate) fn without_instances(&self) -> LayoutResult<Self> {
        let mut rv = Self::new(self.mode());
        for obj in self.index.iter() {
            rv.add_shape(obj.shape.clone(), obj.horiz)?;
        }
        Ok(rv)
    }
    /// Get all indexed shapes touching `bbox`, grown by `spx` in x and `spy` in y
    pub fn intersect(&self, bbox: &BoundBox, spx: Int, spy: Int) -> Vec<&GeoObject> {
        let mut search = *bbox;
        search.expand_xy(spx, spy);
        if search.is_empty() {
            return Vec::new();
        }
        self.index
            .locate_in_envelope_intersecting(&search.to_aabb())
            .filter(|obj| obj.shape.intersects_box(&search))
            .collect()
    }
    /// Iterate over all indexed shapes, in no particular order
    pub fn shapes(&self) -> impl Iterator<Item = &GeoObject> {
        self.index.iter()
    }
    /// Total area of the merged shapes
    pub fn area(&self) -> f64 {
        self.data.area()
    }
    /// Export the merged shapes
    pub fn polygons(&self) -> geo::MultiPolygon<f64> {
        self.data.to_geo()
    }
    /// Change our [GeometryMode].
    /// Moving to a more general mode converts existing data.
    /// Moving to a less general mode is only possible while empty.
    pub fn reset_to_mode(&mut self, mode: GeometryMode) -> LayoutResult<()> {
        if mode == self.mode() {
            return Ok(());
        }
        if mode < self.mode() {
            if !self.is_empty() {
                return Err(LayoutError::representation(format!(
                    "Cannot convert non-empty {} geometry to {}",
                    self.mode(),
                    mode
                )));
            }
            self.data = PolySet::new(mode);
            return Ok(());
        }
        let data = std::mem::replace(&mut self.data, PolySet::new(mode));
        self.data = data.convert(mode)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Orientation, Point, Polygon45, Rect};

    fn rect(x0: Int, y0: Int, x1: Int, y1: Int) -> Shape {
        Shape::Rect(Rect::from_coords(x0, y0, x1, y1))
    }
    #[test]
    fn bbox_tracks_additions() -> LayoutResult<()> {
        let mut geo = Geometry::new(GeometryMode::Poly90);
        assert!(geo.is_empty());
        assert!(geo.get_bbox().is_empty());
        geo.add_shape(rect(0, 0, 10, 10), true)?;
        geo.add_shape(rect(-5, 20, 0, 30), false)?;
        assert_eq!(geo.get_bbox(), BoundBox::from_coords(-5, 0, 10, 30));
        assert_eq!(geo.area(), 150.0);
        assert!(!geo.is_empty());
        Ok(())
    }
    #[test]
    fn rejects_general_shapes() -> LayoutResult<()> {
        let mut geo = Geometry::new(GeometryMode::Poly90);
        let tri = Shape::Poly45(Polygon45::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(0, 10),
        ])?);
        assert!(matches!(
            geo.add_shape(tri.clone(), true),
            Err(LayoutError::Representation(_))
        ));
        // Nothing was modified
        assert!(geo.is_empty());
        assert_eq!(geo.shapes().count(), 0);

        geo.reset_to_mode(GeometryMode::Poly45)?;
        geo.add_shape(tri, true)?;
        assert!((geo.area() - 50.0).abs() < 1e-6);
        Ok(())
    }
    #[test]
    fn intersect_queries() -> LayoutResult<()> {
        let mut geo = Geometry::new(GeometryMode::Poly45);
        geo.add_shape(rect(0, 0, 10, 10), true)?;
        geo.add_shape(rect(100, 0, 110, 10), false)?;
        geo.add_shape(
            Shape::Poly45(Polygon45::new(vec![
                Point::new(200, 0),
                Point::new(210, 0),
                Point::new(200, 10),
            ])?),
            true,
        )?;
        let query = BoundBox::from_coords(12, 0, 20, 5);
        assert!(geo.intersect(&query, 0, 0).is_empty());
        let found = geo.intersect(&query, 2, 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].shape, rect(0, 0, 10, 10));
        assert!(found[0].horiz);

        // Within the triangle's bounding box, but not the triangle
        assert!(geo
            .intersect(&BoundBox::from_coords(208, 8, 210, 10), 0, 0)
            .is_empty());
        assert_eq!(
            geo.intersect(&BoundBox::from_coords(-1000, -1000, 1000, 1000), 0, 0)
                .len(),
            3
        );
        assert!(geo.intersect(&BoundBox::empty(), 100, 100).is_empty());
        Ok(())
    }
    #[test]
    fn record_instances() -> LayoutResult<()> {
        let mut master = Geometry::new(GeometryMode::Poly90);
        master.add_shape(rect(0, 0, 10, 20), true)?;

        let mut geo = Geometry::new(GeometryMode::Poly90);
        let xform = Transform::new(Point::new(100, 0), Orientation::R90);
        geo.record_instance(&master, &xform)?;
        assert_eq!(geo.get_bbox(), BoundBox::from_coords(80, 0, 100, 10));
        assert_eq!(geo.area(), 200.0);
        // Recorded shapes are not indexed
        assert_eq!(geo.shapes().count(), 0);
        assert!(!geo.is_empty());

        let mut general = Geometry::new(GeometryMode::Poly);
        general.add_shape(rect(0, 0, 1, 1), true)?;
        assert!(matches!(
            geo.record_instance(&general, &xform),
            Err(LayoutError::Representation(_))
        ));
        let mut g45 = Geometry::new(GeometryMode::Poly45);
        g45.record_instance(&master, &Transform::identity())?;
        assert!((g45.area() - 200.0).abs() < 1e-6);
        Ok(())
    }
    #[test]
    fn mode_changes() -> LayoutResult<()> {
        let mut geo = Geometry::new(GeometryMode::Poly);
        geo.reset_to_mode(GeometryMode::Poly90)?;
        assert_eq!(geo.mode(), GeometryMode::Poly90);
        geo.add_shape(rect(0, 0, 4, 4), true)?;
        geo.reset_to_mode(GeometryMode::Poly)?;
        assert_eq!(geo.polygons().0.len(), 1);
        assert!(geo.reset_to_mode(GeometryMode::Poly45).is_err());
        assert_eq!(geo.mode(), GeometryMode::Poly);
        assert!((geo.area() - 16.0).abs() < 1e-6);
        Ok(())
    }
}
