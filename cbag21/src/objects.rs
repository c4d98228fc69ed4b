//!
//! # Cellview Objects
//!
//! Everything which can be added to a [CellView] through a [crate::CvObjRef] handle.
//! Each implements [CvObject], whose `add_to` inserts it, and fails without modifying the cell.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    bbox::BoundBox,
    cellview::CellView,
    error::{LayoutError, LayoutResult},
    geom::{Dir, Polygon, Rect, Shape, ShapeTrait, Transform},
    instance::Instance,
    tech::LayerKey,
    utils::{enumstr, EnumStr},
    via::Via,
    Int, LayerId,
};

///
/// # Cellview Object Trait
///
/// Objects which can be committed to a [CellView].
/// `add_to` may update the object, e.g. assigning an instance name,
/// so that the committed value is what its [crate::CvObjRef] returns.
///
pub trait CvObject: Clone + std::fmt::Debug {
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()>;
}

/// # Shape Reference
///
/// A shape on a single layer-purpose pair.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRef {
    pub key: LayerKey,
    pub shape: Shape,
    pub horiz: bool,
}
impl CvObject for ShapeRef {
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        cv.tech.check_layer_key(self.key)?;
        if self.shape.mode() > cv.mode {
            return Err(LayoutError::representation(format!(
                "Cannot add {} shape to {} cell {}",
                self.shape.mode(),
                cv.mode,
                cv.cell_name
            )));
        }
        cv.geometry_mut(self.key).add_shape(self.shape.clone(), self.horiz)
    }
}

/// # Pin
///
/// Connection-point of net `net` on layer `layer`, displayed as `label`.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub layer: LayerId,
    pub net: String,
    pub label: String,
    pub bbox: BoundBox,
}
impl CvObject for Pin {
    /// Technologies with `make_pin_obj` also draw the pin's box on their pin purpose
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        cv.tech.get_layer_name(self.layer)?;
        let rect = self.bbox.to_rect().ok_or_else(|| {
            LayoutError::representation(format!("Pin {} has an empty box", self.net))
        })?;
        if cv.tech.make_pin_obj() {
            let key = LayerKey::new(self.layer, cv.tech.pin_purpose());
            let horiz = rect.width() >= rect.height();
            cv.geometry_mut(key).add_shape(Shape::Rect(rect), horiz)?;
        }
        cv.pin_map.entry(self.layer).or_default().push(self.clone());
        Ok(())
    }
}

/// # Text Label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: LayerKey,
    pub xform: Transform,
    pub text: String,
}
impl CvObject for Label {
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        cv.tech.check_layer_key(self.key)?;
        cv.label_list.push(self.clone());
        Ok(())
    }
}

enumstr!(
    /// # Blockage Types
    BlockageType {
        Routing: "routing",
        Via: "via",
        Placement: "placement",
        Wiring: "wiring",
        Fill: "fill",
        Slot: "slot",
        Pin: "pin",
        Feedthru: "feedthru",
        Screen: "screen",
    }
);

/// # Blockage
///
/// Region excluded from routing, placement, fill, and the like.
/// Placement blockages cover every layer, and have none of their own.
/// All other types apply to a single layer.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blockage {
    btype: BlockageType,
    layer: Option<LayerId>,
    pub polygon: Polygon,
}
impl Blockage {
    /// Create a new [Blockage], checking that only non-placement types have a `layer`
    pub fn new(
        btype: BlockageType,
        layer: Option<LayerId>,
        polygon: Polygon,
    ) -> LayoutResult<Self> {
        match (btype, layer) {
            (BlockageType::Placement, Some(_)) => Err(LayoutError::representation(
                "Placement blockages cannot have a layer",
            )),
            (BlockageType::Placement, None) | (_, Some(_)) => Ok(Self {
                btype,
                layer,
                polygon,
            }),
            (_, None) => Err(LayoutError::representation(format!(
                "{} blockages require a layer",
                btype
            ))),
        }
    }
    pub fn btype(&self) -> BlockageType {
        self.btype
    }
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }
}
impl CvObject for Blockage {
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        match self.layer {
            Some(layer) => {
                cv.tech.get_layer_name(layer)?;
                cv.lay_block_map.entry(layer).or_default().push(self.clone());
            }
            None => cv.area_block_list.push(self.clone()),
        }
        Ok(())
    }
}

enumstr!(
    /// # Boundary Types
    BoundaryType {
        PR: "PR",
        Snap: "snap",
        Area: "area",
    }
);

/// # Cell Boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundary {
    pub btype: BoundaryType,
    pub polygon: Polygon,
}
impl CvObject for Boundary {
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        cv.boundary_list.push(self.clone());
        Ok(())
    }
}

/// Track directions of a via's bottom and top layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViaLayerDirs {
    pub bot_horiz: bool,
    pub top_horiz: bool,
}

/// # Via Wrapper
///
/// A [Via], and whether to also draw its enclosures on its metal layers.
/// With `dirs`, the bottom and top enclosure boxes are added to the via's layers,
/// on the default purpose, with the given orientation flags.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaWrapper {
    pub via: Via,
    pub dirs: Option<ViaLayerDirs>,
}
impl CvObject for ViaWrapper {
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        let (bot, top) = cv.tech.get_via_layers(&self.via.via_id)?;
        if let Some(dirs) = self.dirs {
            let purpose = cv.tech.default_purpose();
            let shapes = [
                (LayerKey::new(bot, purpose), self.via.bot_rect(), dirs.bot_horiz),
                (LayerKey::new(top, purpose), self.via.top_rect(), dirs.top_horiz),
            ];
            for (key, rect, horiz) in shapes {
                cv.geometry_mut(key).add_shape(Shape::Rect(rect), horiz)?;
            }
        }
        cv.via_list.push(self.via.clone());
        Ok(())
    }
}

impl CvObject for Instance {
    /// Empty names are replaced by a unique `X<n>` name.
    /// Bound masters also record their shapes, per array element, into our geometry.
    fn add_to(&mut self, cv: &mut CellView) -> LayoutResult<()> {
        if !self.name.is_empty() && cv.inst_map.contains_key(&self.name) {
            return Err(LayoutError::composition(format!(
                "Duplicate instance name {} in cell {}",
                self.name, cv.cell_name
            )));
        }
        if let Some(master) = self.cellview() {
            cv.check_master(&self.name, master)?;
        }
        if self.name.is_empty() {
            self.name = cv.next_inst_name();
        }
        cv.record_instance(self)?;
        cv.inst_map.insert(self.name.clone(), self.clone());
        Ok(())
    }
}

/// Rectangle of `width` centered on `center` across a track in direction `dir`,
/// spanning [`lower`, `upper`] along it
pub(crate) fn track_rect(dir: Dir, lower: Int, upper: Int, center: Int, width: Int) -> Rect {
    let lo = center - width / 2;
    Rect::from_dir(dir, lower, upper, lo, lo + width)
}
