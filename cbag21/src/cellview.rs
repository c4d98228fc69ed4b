//!
//! # Cellviews
//!
//! [CellView] is the per-cell container of shapes, instances, vias, pins, blockages, boundaries, and labels.
//! Objects are added through builders returning [CvObjRef] handles,
//! which insert their object on `commit`.
//!

// Std-Lib
use std::collections::BTreeMap;

// Crates.io
use log::trace;

// Local imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    error::{LayoutError, LayoutResult},
    geom::{
        Array2d, Dir, Point, Polygon, Polygon45, Polygon45Set, Polygon90, Rect, Shape, Transform,
        TransformTrait,
    },
    geometry::{GeoObject, Geometry},
    grid::RoutingGrid,
    instance::{CellViewRef, Instance, ParamValue},
    objects::{
        track_rect, Blockage, Boundary, CvObject, Label, Pin, ShapeRef, ViaLayerDirs, ViaWrapper,
    },
    path::PathStyle,
    polyset::GeometryMode,
    tech::{LayerKey, Tech},
    tracks::WireArray,
    utils::{DepOrder, DepOrderer},
    via::Via,
    Htr, Int, LayerId, Level, Ptr, PurposeId,
};

///
/// # Cellview Object Handle
///
/// Deferred-commit handle to an object being added to a [CellView].
/// The object is inserted either when the handle is created with `commit`,
/// or on a later call to [CvObjRef::commit].
/// Dropping or [CvObjRef::discard]-ing an uncommitted handle leaves the cellview unmodified.
///
/// The handle holds the cellview's exclusive borrow for its lifetime.
///
#[derive(Debug)]
pub struct CvObjRef<'cv, T: CvObject> {
    cv: &'cv mut CellView,
    obj: T,
    committed: bool,
}
impl<'cv, T: CvObject> CvObjRef<'cv, T> {
    fn new(cv: &'cv mut CellView, obj: T, commit: bool) -> LayoutResult<Self> {
        let mut this = Self {
            cv,
            obj,
            committed: false,
        };
        if commit {
            this.obj.add_to(this.cv)?;
            this.committed = true;
            trace!("Committed {:?}", this.obj);
        }
        Ok(this)
    }
    pub fn get(&self) -> &T {
        &self.obj
    }
    /// Mutable access to the object. Committed objects can no longer be modified.
    pub fn get_mut(&mut self) -> LayoutResult<&mut T> {
        if self.committed {
            return Err(LayoutError::composition("Cannot modify a committed object"));
        }
        Ok(&mut self.obj)
    }
    pub fn is_committed(&self) -> bool {
        self.committed
    }
    pub fn cellview(&self) -> &CellView {
        &*self.cv
    }
    /// Insert the object into the cellview, and return it
    pub fn commit(mut self) -> LayoutResult<T> {
        if self.committed {
            return Err(LayoutError::composition("Object is already committed"));
        }
        self.obj.add_to(self.cv)?;
        trace!("Committed {:?}", self.obj);
        Ok(self.obj)
    }
    /// Release the object without inserting it. Committed objects stay committed.
    pub fn discard(self) -> T {
        self.obj
    }
}

/// # Cellview
///
/// Shapes live in one [Geometry] per [LayerKey], all of the cell's [GeometryMode].
/// Shapes of bound instance masters are recorded into the same geometries as they are added.
///
#[derive(Debug, Clone)]
pub struct CellView {
    pub(crate) tech: Ptr<Tech>,
    pub(crate) grid: Option<Ptr<RoutingGrid>>,
    pub(crate) cell_name: String,
    pub(crate) mode: GeometryMode,
    pub(crate) geo_map: BTreeMap<LayerKey, Geometry>,
    pub(crate) inst_map: BTreeMap<String, Instance>,
    pub(crate) pin_map: BTreeMap<LayerId, Vec<Pin>>,
    pub(crate) via_list: Vec<Via>,
    pub(crate) lay_block_map: BTreeMap<LayerId, Vec<Blockage>>,
    pub(crate) area_block_list: Vec<Blockage>,
    pub(crate) boundary_list: Vec<Boundary>,
    pub(crate) label_list: Vec<Label>,
    inst_name_cnt: usize,
}
impl CellView {
    /// Create a new, empty [CellView]
    pub fn new(tech: Ptr<Tech>, cell_name: impl Into<String>, mode: GeometryMode) -> Self {
        Self {
            tech,
            grid: None,
            cell_name: cell_name.into(),
            mode,
            geo_map: BTreeMap::new(),
            inst_map: BTreeMap::new(),
            pin_map: BTreeMap::new(),
            via_list: Vec::new(),
            lay_block_map: BTreeMap::new(),
            area_block_list: Vec::new(),
            boundary_list: Vec::new(),
            label_list: Vec::new(),
            inst_name_cnt: 0,
        }
    }
    /// Bind routing grid `grid`, which must share our technology
    pub fn with_grid(mut self, grid: Ptr<RoutingGrid>) -> LayoutResult<Self> {
        if !Ptr::ptr_eq(grid.tech(), &self.tech) {
            return Err(LayoutError::composition(format!(
                "Routing grid of cell {} uses a different technology",
                self.cell_name
            )));
        }
        self.grid = Some(grid);
        Ok(self)
    }
    pub fn tech(&self) -> &Ptr<Tech> {
        &self.tech
    }
    /// Our routing grid. Fails if none is bound.
    pub fn grid(&self) -> LayoutResult<&Ptr<RoutingGrid>> {
        self.grid
            .as_ref()
            .ok_or_else(|| LayoutError::not_found("routing grid", self.cell_name.clone()))
    }
    pub fn cell_name(&self) -> &str {
        &self.cell_name
    }
    pub fn set_cell_name(&mut self, name: impl Into<String>) {
        self.cell_name = name.into();
    }
    pub fn mode(&self) -> GeometryMode {
        self.mode
    }

    /// Bounding box of (`layer`, `purpose`), including all instances.
    /// Pairs undefined by our technology never hold shapes, and have an empty box.
    pub fn get_bbox(&self, layer: LayerId, purpose: PurposeId) -> BoundBox {
        let own = self
            .geo_map
            .get(&LayerKey::new(layer, purpose))
            .map_or_else(BoundBox::empty, Geometry::get_bbox);
        self.inst_map
            .values()
            .fold(own, |bbox, inst| inst.get_bbox(layer, purpose).union(&bbox))
    }
    /// Get all shapes on `key` touching `bbox`, grown by `spx` in x and `spy` in y
    pub fn intersect(
        &self,
        key: LayerKey,
        bbox: &BoundBox,
        spx: Int,
        spy: Int,
    ) -> Vec<&GeoObject> {
        match self.geo_map.get(&key) {
            Some(geo) => geo.intersect(bbox, spx, spy),
            None => Vec::new(),
        }
    }
    /// Boolean indication of whether nothing has been added
    pub fn is_empty(&self) -> bool {
        self.geo_map.values().all(Geometry::is_empty)
            && self.inst_map.is_empty()
            && self.pin_map.is_empty()
            && self.via_list.is_empty()
            && self.lay_block_map.is_empty()
            && self.area_block_list.is_empty()
            && self.boundary_list.is_empty()
            && self.label_list.is_empty()
    }
    /// Change the [GeometryMode] of every layer.
    /// Fails without changes if any non-empty geometry would lose generality.
    pub fn set_geometry_mode(&mut self, mode: GeometryMode) -> LayoutResult<()> {
        if mode < self.mode && self.geo_map.values().any(|g| !g.is_empty()) {
            return Err(LayoutError::representation(format!(
                "Cannot convert non-empty {} cell {} to {}",
                self.mode, self.cell_name, mode
            )));
        }
        for geo in self.geo_map.values_mut() {
            geo.reset_to_mode(mode)?;
        }
        self.mode = mode;
        Ok(())
    }

    /// Get the [Geometry] of `key`, if it has any
    pub fn geometry(&self, key: LayerKey) -> Option<&Geometry> {
        self.geo_map.get(&key)
    }
    /// Iterate over all (layer-key, geometry) pairs, in layer-key order
    pub fn geometries(&self) -> impl Iterator<Item = (&LayerKey, &Geometry)> {
        self.geo_map.iter()
    }
    /// Get the [Geometry] of `key`, creating it if necessary
    pub(crate) fn geometry_mut(&mut self, key: LayerKey) -> &mut Geometry {
        let mode = self.mode;
        self.geo_map
            .entry(key)
            .or_insert_with(|| Geometry::new(mode))
    }
    pub fn instance(&self, name: &str) -> LayoutResult<&Instance> {
        self.inst_map
            .get(name)
            .ok_or_else(|| LayoutError::not_found("instance", name))
    }
    /// Iterate over all instances, in name order
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.inst_map.values()
    }
    /// Bind instance `name` to `master`, replacing its current master.
    /// Shapes recorded from the old master are replaced by those of the new.
    pub fn set_instance_master(&mut self, name: &str, master: Ptr<CellView>) -> LayoutResult<()> {
        if !self.inst_map.contains_key(name) {
            return Err(LayoutError::not_found("instance", name));
        }
        self.check_master(name, &master)?;
        if let Some(inst) = self.inst_map.get_mut(name) {
            inst.set_master(master);
        }
        self.rebuild_geometry()
    }
    /// Set parameter `param` of reference instance `name`
    pub fn set_instance_param(
        &mut self,
        name: &str,
        param: impl Into<String>,
        val: impl Into<ParamValue>,
    ) -> LayoutResult<()> {
        self.inst_map
            .get_mut(name)
            .ok_or_else(|| LayoutError::not_found("instance", name))?
            .set_param(param, val)
    }
    pub fn rename_instance(&mut self, old: &str, new: impl Into<String>) -> LayoutResult<()> {
        let new = new.into();
        if old == new {
            return self.instance(old).map(|_| ());
        }
        if self.inst_map.contains_key(&new) {
            return Err(LayoutError::composition(format!(
                "Duplicate instance name {} in cell {}",
                new, self.cell_name
            )));
        }
        let mut inst = self
            .inst_map
            .remove(old)
            .ok_or_else(|| LayoutError::not_found("instance", old))?;
        inst.name = new.clone();
        self.inst_map.insert(new, inst);
        Ok(())
    }
    /// Check that bound `master` of instance `name` can be recorded into this cell
    pub(crate) fn check_master(&self, name: &str, master: &Ptr<CellView>) -> LayoutResult<()> {
        if !Ptr::ptr_eq(master.tech(), &self.tech) {
            return Err(LayoutError::composition(format!(
                "Master {} of instance {} uses a different technology",
                master.cell_name(),
                name
            )));
        }
        if master.mode() > self.mode {
            return Err(LayoutError::representation(format!(
                "Cannot record {} master {} in {} cell {}",
                master.mode(),
                master.cell_name(),
                self.mode,
                self.cell_name
            )));
        }
        Ok(())
    }
    /// Record the shapes of `inst`'s bound master, per array element, into our geometry
    pub(crate) fn record_instance(&mut self, inst: &Instance) -> LayoutResult<()> {
        let master = match inst.cellview() {
            Some(master) => master,
            None => return Ok(()),
        };
        let xforms = inst.element_xforms();
        for (key, geo) in master.geometries() {
            for xform in xforms.iter() {
                self.geometry_mut(*key).record_instance(geo, xform)?;
            }
        }
        Ok(())
    }
    /// Rebuild every geometry from our own shapes and the current instances
    fn rebuild_geometry(&mut self) -> LayoutResult<()> {
        for geo in self.geo_map.values_mut() {
            *geo = geo.without_instances()?;
        }
        let insts = std::mem::take(&mut self.inst_map);
        let recorded = insts
            .values()
            .try_for_each(|inst| self.record_instance(inst));
        self.inst_map = insts;
        recorded
    }
    /// Generate an instance name unused in this cell
    pub(crate) fn next_inst_name(&mut self) -> String {
        loop {
            let name = format!("X{}", self.inst_name_cnt);
            self.inst_name_cnt += 1;
            if !self.inst_map.contains_key(&name) {
                return name;
            }
        }
    }
    /// Get the pins on `layer`
    pub fn pins(&self, layer: LayerId) -> &[Pin] {
        self.pin_map.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }
    /// Iterate over all pins, in layer order
    pub fn all_pins(&self) -> impl Iterator<Item = &Pin> {
        self.pin_map.values().flatten()
    }
    pub fn vias(&self) -> &[Via] {
        &self.via_list
    }
    /// Get the blockages on `layer`
    pub fn blockages(&self, layer: LayerId) -> &[Blockage] {
        self.lay_block_map.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }
    /// Placement blockages, covering every layer
    pub fn area_blockages(&self) -> &[Blockage] {
        &self.area_block_list
    }
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundary_list
    }
    pub fn labels(&self) -> &[Label] {
        &self.label_list
    }
    /// All bound masters of our instances, recursively, in dependency order.
    /// Each master precedes every cell instantiating it, and appears once.
    pub fn masters(&self) -> LayoutResult<Vec<Ptr<CellView>>> {
        let roots: Vec<Ptr<CellView>> = self
            .instances()
            .filter_map(|inst| inst.cellview().cloned())
            .collect();
        MasterOrder::order(&roots)
    }

    // Object builders

    /// Add `shape` to layer-purpose `key`
    pub fn add_shape(
        &mut self,
        key: LayerKey,
        horiz: bool,
        shape: impl Into<Shape>,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        let obj = ShapeRef {
            key,
            shape: shape.into(),
            horiz,
        };
        CvObjRef::new(self, obj, commit)
    }
    pub fn add_rect(
        &mut self,
        key: LayerKey,
        horiz: bool,
        rect: Rect,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        self.add_shape(key, horiz, rect, commit)
    }
    /// Add `nx` by `ny` copies of `rect`, at pitches `spx` and `spy`
    pub fn add_rect_arr(
        &mut self,
        key: LayerKey,
        horiz: bool,
        rect: Rect,
        array: Array2d,
    ) -> LayoutResult<()> {
        for off in array.offsets() {
            let xform = Transform::translate(off.x, off.y);
            self.add_rect(key, horiz, rect.transform(&xform), true)?;
        }
        Ok(())
    }
    pub fn add_poly90(
        &mut self,
        key: LayerKey,
        horiz: bool,
        poly: Polygon90,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        self.add_shape(key, horiz, poly, commit)
    }
    pub fn add_poly45(
        &mut self,
        key: LayerKey,
        horiz: bool,
        poly: Polygon45,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        self.add_shape(key, horiz, poly, commit)
    }
    pub fn add_poly45_set(
        &mut self,
        key: LayerKey,
        horiz: bool,
        polys: Polygon45Set,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        self.add_shape(key, horiz, polys, commit)
    }
    pub fn add_poly(
        &mut self,
        key: LayerKey,
        horiz: bool,
        poly: Polygon,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        self.add_shape(key, horiz, poly, commit)
    }
    /// Add a path along `points`, `2 * half_width` wide, per [Geometry::make_path]
    #[allow(clippy::too_many_arguments)]
    pub fn add_path(
        &mut self,
        key: LayerKey,
        horiz: bool,
        points: &[Point],
        half_width: Int,
        style0: PathStyle,
        style1: PathStyle,
        stylem: PathStyle,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        let polys = Geometry::make_path(points, half_width, style0, style1, stylem)?;
        self.add_shape(key, horiz, polys, commit)
    }
    /// Add a bus of parallel paths along `points`, per [Geometry::make_path45_bus]
    #[allow(clippy::too_many_arguments)]
    pub fn add_path45_bus(
        &mut self,
        key: LayerKey,
        horiz: bool,
        points: &[Point],
        widths: &[Int],
        spaces: &[Int],
        style0: PathStyle,
        style1: PathStyle,
        stylem: PathStyle,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ShapeRef>> {
        let polys = Geometry::make_path45_bus(points, widths, spaces, style0, style1, stylem)?;
        self.add_shape(key, horiz, polys, commit)
    }
    pub fn add_blockage(
        &mut self,
        blockage: Blockage,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, Blockage>> {
        CvObjRef::new(self, blockage, commit)
    }
    pub fn add_boundary(
        &mut self,
        boundary: Boundary,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, Boundary>> {
        CvObjRef::new(self, boundary, commit)
    }
    /// Add `via`. With `dirs`, its enclosures are also drawn on its metal layers.
    pub fn add_via(
        &mut self,
        via: Via,
        dirs: Option<ViaLayerDirs>,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, ViaWrapper>> {
        CvObjRef::new(self, ViaWrapper { via, dirs }, commit)
    }
    /// Add copies of `via` per `array`, offset in parent coordinates
    pub fn add_via_arr(
        &mut self,
        via: Via,
        dirs: Option<ViaLayerDirs>,
        array: Array2d,
    ) -> LayoutResult<()> {
        // Check the via id once, before adding any copies
        self.tech.get_via_layers(&via.via_id)?;
        for off in array.offsets() {
            let copy = Via::new(via.xform.move_by(off.x, off.y), via.via_id.clone(), via.param);
            self.add_via(copy, dirs, true)?;
        }
        Ok(())
    }
    /// Add an instance of external cellview `cvref`. An empty `name` is auto-generated.
    pub fn add_prim_instance(
        &mut self,
        cvref: CellViewRef,
        name: impl Into<String>,
        xform: Transform,
        array: Array2d,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, Instance>> {
        let inst = Instance::new_ref(name, cvref, xform, array);
        CvObjRef::new(self, inst, commit)
    }
    /// Add an instance of bound `master`. An empty `name` is auto-generated.
    pub fn add_instance(
        &mut self,
        master: Ptr<CellView>,
        name: impl Into<String>,
        xform: Transform,
        array: Array2d,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, Instance>> {
        let inst = Instance::new(name, master, xform, array);
        CvObjRef::new(self, inst, commit)
    }
    pub fn add_label(
        &mut self,
        key: LayerKey,
        xform: Transform,
        text: impl Into<String>,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, Label>> {
        let label = Label {
            key,
            xform,
            text: text.into(),
        };
        CvObjRef::new(self, label, commit)
    }
    /// Add a pin of net `net` on `layer`
    pub fn add_pin(
        &mut self,
        layer: LayerId,
        net: impl Into<String>,
        label: impl Into<String>,
        bbox: BoundBox,
        commit: bool,
    ) -> LayoutResult<CvObjRef<'_, Pin>> {
        let pin = Pin {
            layer,
            net: net.into(),
            label: label.into(),
            bbox,
        };
        CvObjRef::new(self, pin, commit)
    }
    /// Add pins over `n` track bundles of routing level `level`.
    ///
    /// Bundle `i` is centered on half-track `htr + i * htr_pitch`, spans `ntr` tracks,
    /// and runs from `lower` to `upper` along the track.
    /// Each pin is drawn on the layer of its bundle's track color,
    /// as a single wire of the level's `ntr`-track width.
    ///
    #[allow(clippy::too_many_arguments)]
    pub fn add_pin_arr(
        &mut self,
        net: &str,
        label: &str,
        level: Level,
        htr: Htr,
        lower: Int,
        upper: Int,
        ntr: Int,
        n: Int,
        htr_pitch: Htr,
    ) -> LayoutResult<()> {
        let grid = self.grid()?.clone();
        let info = grid.track_info(level)?;
        let width = info.get_wire_width(ntr)?;
        for idx in 0..n {
            let cur_htr = htr + idx * htr_pitch;
            let key = grid.get_layer_key(level, cur_htr)?;
            let center = info.htr_to_coord(cur_htr);
            let rect = track_rect(info.direction(), lower, upper, center, width);
            self.add_pin(key.layer, net, label, rect.bbox(), true)?;
        }
        Ok(())
    }
    /// Draw the wires of `warr`, each on the layer of its track color
    pub fn add_warr(&mut self, warr: &WireArray) -> LayoutResult<()> {
        let grid = self.grid()?.clone();
        let tid = warr.track_id();
        let info = grid.track_info(tid.level())?;
        let width = info.get_wire_width(tid.ntr())?;
        let horiz = info.direction() == Dir::Horiz;
        for htr in tid.htrs() {
            let key = grid.get_layer_key(tid.level(), htr)?;
            let center = info.htr_to_coord(htr);
            let rect = track_rect(info.direction(), warr.lower(), warr.upper(), center, width);
            self.add_rect(key, horiz, rect, true)?;
        }
        Ok(())
    }
}

/// Dependency-ordering of bound instance masters
struct MasterOrder;
impl DepOrder for MasterOrder {
    type Item = Ptr<CellView>;
    type Error = LayoutError;

    fn process(item: &Ptr<CellView>, orderer: &mut DepOrderer<Self>) -> LayoutResult<()> {
        for inst in item.instances() {
            if let Some(master) = inst.cellview() {
                orderer.push(master)?;
            }
        }
        Ok(())
    }
    fn fail(item: &Ptr<CellView>) -> LayoutError {
        LayoutError::composition(format!("Cyclic instance hierarchy at {}", item.cell_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::SampleTech;

    fn m1(tech: &Tech) -> LayoutResult<LayerKey> {
        tech.layer_key("M1", None)
    }
    #[test]
    fn cellviews_are_send_and_sync() {
        fn is_send_sync<T: Send + Sync>() {}
        is_send_sync::<CellView>();
        is_send_sync::<Ptr<CellView>>();
        is_send_sync::<Ptr<Tech>>();
        is_send_sync::<Ptr<RoutingGrid>>();
    }
    #[test]
    fn deferred_commit() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);

        let mut handle = cv.add_rect(key, true, Rect::from_coords(0, 0, 10, 10), false)?;
        assert!(!handle.is_committed());
        assert!(handle.cellview().is_empty());
        // Modify before committing
        handle.get_mut()?.shape = Shape::Rect(Rect::from_coords(0, 0, 20, 10));
        let committed = handle.commit()?;
        assert_eq!(committed.shape, Shape::Rect(Rect::from_coords(0, 0, 20, 10)));
        assert_eq!(cv.get_bbox(key.layer, key.purpose), BoundBox::from_coords(0, 0, 20, 10));

        // Discarded handles leave no trace
        let handle = cv.add_rect(key, true, Rect::from_coords(100, 100, 110, 110), false)?;
        handle.discard();
        assert_eq!(cv.get_bbox(key.layer, key.purpose), BoundBox::from_coords(0, 0, 20, 10));
        Ok(())
    }
    #[test]
    fn immediate_commit() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);
        let mut handle = cv.add_rect(key, false, Rect::from_coords(0, 0, 5, 50), true)?;
        assert!(handle.is_committed());
        assert!(handle.get_mut().is_err());
        assert!(matches!(handle.commit(), Err(LayoutError::Composition(_))));
        assert!(!cv.is_empty());
        Ok(())
    }
    #[test]
    fn failed_commit_leaves_cell_unchanged() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);
        let tri = Polygon45::new(vec![Point::new(0, 0), Point::new(10, 0), Point::new(0, 10)])?;
        assert!(matches!(
            cv.add_poly45(key, true, tri.clone(), true),
            Err(LayoutError::Representation(_))
        ));
        assert!(cv.get_bbox(key.layer, key.purpose).is_empty());

        cv.set_geometry_mode(GeometryMode::Poly45)?;
        cv.add_poly45(key, true, tri, true)?;
        assert_eq!(cv.get_bbox(key.layer, key.purpose), BoundBox::from_coords(0, 0, 10, 10));
        assert!(cv.set_geometry_mode(GeometryMode::Poly90).is_err());
        assert_eq!(cv.mode(), GeometryMode::Poly45);
        Ok(())
    }
    #[test]
    fn rect_arrays() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);
        cv.add_rect_arr(key, true, Rect::from_coords(0, 0, 10, 10), Array2d::new(3, 2, 20, 30)?)?;
        let geo = cv.geometry(key).ok_or("missing geometry")?;
        assert_eq!(geo.shapes().count(), 6);
        assert_eq!(geo.area(), 600.0);
        assert_eq!(geo.get_bbox(), BoundBox::from_coords(0, 0, 50, 40));
        assert_eq!(cv.intersect(key, &BoundBox::from_coords(12, 0, 18, 5), 2, 0).len(), 2);
        Ok(())
    }
    #[test]
    fn blockages_and_boundaries() -> LayoutResult<()> {
        use crate::objects::{BlockageType, BoundaryType};
        let tech = SampleTech::tech()?;
        let m1 = tech.get_layer_id("M1")?;
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);
        let square = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ])?;
        cv.add_blockage(Blockage::new(BlockageType::Routing, Some(m1), square.clone())?, true)?;
        cv.add_blockage(Blockage::new(BlockageType::Placement, None, square.clone())?, true)?;
        cv.add_boundary(
            Boundary {
                btype: BoundaryType::PR,
                polygon: square,
            },
            true,
        )?;
        assert_eq!(cv.blockages(m1).len(), 1);
        assert_eq!(cv.area_blockages().len(), 1);
        assert_eq!(cv.boundaries().len(), 1);
        assert!(cv.blockages(m1 + 1).is_empty());
        // Blockages and boundaries are not geometry
        assert!(cv.get_bbox(m1, cv.tech().default_purpose()).is_empty());
        Ok(())
    }
    #[test]
    fn instance_names() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let mut cv = CellView::new(tech, "top", GeometryMode::Poly90);
        let cvref = CellViewRef::new("lib", "inv", "layout");
        cv.add_prim_instance(cvref.clone(), "X1", Transform::identity(), Array2d::single(), true)?;
        let x0 = cv
            .add_prim_instance(cvref.clone(), "", Transform::identity(), Array2d::single(), true)?
            .discard();
        assert_eq!(x0.name(), "X0");
        // Auto-naming skips names already in use
        let x2 = cv
            .add_prim_instance(cvref.clone(), "", Transform::identity(), Array2d::single(), false)?
            .commit()?;
        assert_eq!(x2.name(), "X2");
        assert!(matches!(
            cv.add_prim_instance(cvref, "X1", Transform::identity(), Array2d::single(), true),
            Err(LayoutError::Composition(_))
        ));
        assert_eq!(cv.instances().count(), 3);

        cv.rename_instance("X1", "inv1")?;
        assert!(cv.instance("X1").is_err());
        assert_eq!(cv.instance("inv1")?.name(), "inv1");
        cv.rename_instance("inv1", "inv1")?;
        assert_eq!(cv.instance("inv1")?.name(), "inv1");
        assert!(matches!(
            cv.rename_instance("nope", "nope"),
            Err(LayoutError::NotFound { .. })
        ));
        assert!(matches!(
            cv.rename_instance("X0", "inv1"),
            Err(LayoutError::Composition(_))
        ));
        assert!(matches!(
            cv.rename_instance("nope", "other"),
            Err(LayoutError::NotFound { .. })
        ));
        cv.set_instance_param("X0", "nf", 2 as Int)?;
        let params = cv.instance("X0")?.params().ok_or("missing params")?;
        assert_eq!(params.get("nf"), Some(&ParamValue::Int(2)));
        assert!(matches!(
            cv.set_instance_param("nope", "nf", 2 as Int),
            Err(LayoutError::NotFound { .. })
        ));
        Ok(())
    }
    #[test]
    fn instance_rebinding() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let square = |name: &str, size: Int| -> LayoutResult<Ptr<CellView>> {
            let mut cv = CellView::new(tech.clone(), name, GeometryMode::Poly90);
            cv.add_rect(key, true, Rect::from_coords(0, 0, size, size), true)?;
            Ok(Ptr::new(cv))
        };
        let (small, large) = (square("small", 10)?, square("large", 50)?);
        let mut top = CellView::new(tech.clone(), "top", GeometryMode::Poly90);
        top.add_rect(key, true, Rect::from_coords(-5, -5, 0, 0), true)?;
        let shifted = Transform::translate(1000, 0);
        top.add_instance(small, "I0", shifted, Array2d::single(), true)?;
        let cvref = CellViewRef::new("lib", "inv", "layout");
        top.add_prim_instance(cvref, "R0", Transform::identity(), Array2d::single(), true)?;
        let bbox = BoundBox::from_coords(-5, -5, 1010, 10);
        assert_eq!(top.get_bbox(key.layer, key.purpose), bbox);

        // Shapes recorded from the old master are replaced
        top.set_instance_master("I0", large.clone())?;
        let bbox = BoundBox::from_coords(-5, -5, 1050, 50);
        assert_eq!(top.get_bbox(key.layer, key.purpose), bbox);
        let geo = top.geometry(key).ok_or("missing geometry")?;
        assert_eq!(geo.get_bbox(), bbox);
        assert_eq!(geo.area(), 2525.0);
        assert_eq!(geo.shapes().count(), 1);

        // References are bound the same way
        top.set_instance_master("R0", large)?;
        assert!(!top.instance("R0")?.is_reference());
        assert_eq!(top.geometry(key).ok_or("missing geometry")?.area(), 5025.0);

        // Masters of other technologies or more general modes fail without changes
        let mut foreign = CellView::new(SampleTech::tech()?, "foreign", GeometryMode::Poly90);
        foreign.add_rect(key, true, Rect::from_coords(-500, -500, 0, 0), true)?;
        assert!(matches!(
            top.set_instance_master("I0", Ptr::new(foreign)),
            Err(LayoutError::Composition(_))
        ));
        let general = CellView::new(tech.clone(), "general", GeometryMode::Poly);
        assert!(matches!(
            top.set_instance_master("I0", Ptr::new(general)),
            Err(LayoutError::Representation(_))
        ));
        let empty = Ptr::new(CellView::new(tech, "empty", GeometryMode::Poly90));
        assert!(matches!(
            top.set_instance_master("nope", empty),
            Err(LayoutError::NotFound { .. })
        ));
        assert_eq!(top.get_bbox(key.layer, key.purpose), bbox);
        assert_eq!(top.instance("I0")?.cell_name(None), "large");
        assert_eq!(top.instance("I0")?.xform(), &shifted);
        Ok(())
    }
    #[test]
    fn undefined_layers_are_rejected() -> LayoutResult<()> {
        use crate::objects::BlockageType;
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let bogus = LayerKey::new(999, 999);
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);
        let rect = Rect::from_coords(0, 0, 10, 10);
        assert!(matches!(
            cv.add_rect(bogus, true, rect, true),
            Err(LayoutError::NotFound { .. })
        ));
        let bad_purpose = LayerKey::new(key.layer, 999);
        let pending = cv.add_rect(bad_purpose, true, rect, false)?;
        assert!(matches!(pending.commit(), Err(LayoutError::NotFound { .. })));
        assert!(matches!(
            cv.add_pin(999, "vdd", "vdd", rect.bbox(), true),
            Err(LayoutError::NotFound { .. })
        ));
        assert!(matches!(
            cv.add_label(bogus, Transform::identity(), "vdd", true),
            Err(LayoutError::NotFound { .. })
        ));
        let outline = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ])?;
        let blockage = Blockage::new(BlockageType::Routing, Some(999), outline)?;
        assert!(matches!(
            cv.add_blockage(blockage, true),
            Err(LayoutError::NotFound { .. })
        ));
        assert!(cv.is_empty());
        assert!(cv.get_bbox(999, 999).is_empty());
        Ok(())
    }
    #[test]
    fn general_polygons() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly45);
        let tri = Polygon45::new(vec![Point::new(0, 0), Point::new(10, 0), Point::new(0, 10)])?;
        let bar = Polygon45::new(vec![
            Point::new(5, 0),
            Point::new(15, 0),
            Point::new(15, 5),
            Point::new(5, 5),
        ])?;
        // Overlapping members merge: 50 + 50 - 12.5
        cv.add_poly45_set(key, true, Polygon45Set::new(vec![tri, bar])?, true)?;
        let geo = cv.geometry(key).ok_or("missing geometry")?;
        assert!((geo.area() - 87.5).abs() < 1e-6);
        assert_eq!(geo.get_bbox(), BoundBox::from_coords(0, 0, 15, 10));
        // Inside the set's bounding box, but outside both members
        assert!(cv.intersect(key, &BoundBox::from_coords(8, 6, 9, 7), 0, 0).is_empty());
        assert_eq!(cv.intersect(key, &BoundBox::from_coords(12, 4, 13, 6), 0, 0).len(), 1);

        let skewed = Polygon::new(vec![
            Point::new(100, 0),
            Point::new(110, 0),
            Point::new(100, 3),
        ])?;
        assert!(matches!(
            cv.add_poly(key, true, skewed.clone(), true),
            Err(LayoutError::Representation(_))
        ));
        cv.set_geometry_mode(GeometryMode::Poly)?;
        let corner = BoundBox::from_coords(100, 0, 101, 1);
        let pending = cv.add_poly(key, true, skewed.clone(), false)?;
        assert!(pending.cellview().intersect(key, &corner, 0, 0).is_empty());
        pending.discard();
        assert!(cv.intersect(key, &corner, 0, 0).is_empty());

        cv.add_poly(key, true, skewed, true)?;
        assert_eq!(cv.intersect(key, &corner, 0, 0).len(), 1);
        let geo = cv.geometry(key).ok_or("missing geometry")?;
        assert!((geo.area() - 102.5).abs() < 1e-6);
        Ok(())
    }
    #[test]
    fn paths() -> LayoutResult<()> {
        use PathStyle::*;
        let tech = SampleTech::tech()?;
        let key = m1(&tech)?;
        let line = [Point::new(0, 100), Point::new(100, 100)];
        let mut cv = CellView::new(tech, "cell", GeometryMode::Poly90);
        // Paths are 45-degree polygon sets
        assert!(matches!(
            cv.add_path(key, true, &line, 5, Extend, Extend, Truncate, true),
            Err(LayoutError::Representation(_))
        ));
        cv.set_geometry_mode(GeometryMode::Poly45)?;
        cv.add_path(key, true, &line, 5, Extend, Extend, Truncate, true)?;
        assert_eq!(cv.get_bbox(key.layer, key.purpose), BoundBox::from_coords(-5, 95, 105, 105));
        cv.add_path45_bus(key, true, &line, &[10, 10], &[10], Truncate, Truncate, Truncate, true)?;
        assert_eq!(cv.get_bbox(key.layer, key.purpose), BoundBox::from_coords(-5, 85, 105, 115));
        assert_eq!(cv.geometry(key).ok_or("missing geometry")?.shapes().count(), 2);
        Ok(())
    }
    #[test]
    fn grid_must_share_tech() -> LayoutResult<()> {
        let grid = Ptr::new(SampleTech::grid()?);
        let other_tech = SampleTech::tech()?;
        let cv = CellView::new(other_tech, "cell", GeometryMode::Poly90);
        assert!(matches!(cv.with_grid(grid.clone()), Err(LayoutError::Composition(_))));
        let cv = CellView::new(grid.tech().clone(), "cell", GeometryMode::Poly90).with_grid(grid)?;
        assert!(cv.grid().is_ok());
        let bare = CellView::new(SampleTech::tech()?, "bare", GeometryMode::Poly90);
        assert!(matches!(bare.grid(), Err(LayoutError::NotFound { .. })));
        Ok(())
    }
}
