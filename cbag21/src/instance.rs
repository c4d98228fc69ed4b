//!
//! # Instances
//!
//! Placements of other cells, either by reference to an externally-defined cellview,
//! or bound to an in-memory [CellView] master.
//!

// Std-Lib
use std::collections::{BTreeMap, HashMap};

// Crates.io
use derive_more::From;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    cellview::CellView,
    error::{LayoutError, LayoutResult},
    geom::{Array2d, Transform, TransformTrait},
    Int, LayerId, Ptr, PurposeId,
};

/// # Instance Parameter Value
#[derive(Debug, Clone, PartialEq, From, Serialize, Deserialize)]
pub enum ParamValue {
    Int(Int),
    Double(f64),
    Bool(bool),
    Str(String),
}

/// # Cellview Reference
///
/// (Library, cell, view) names of a cell defined outside this database,
/// and the parameters it is instantiated with.
///
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellViewRef {
    pub lib: String,
    pub cell: String,
    pub view: String,
    pub params: BTreeMap<String, ParamValue>,
}
impl CellViewRef {
    pub fn new(lib: impl Into<String>, cell: impl Into<String>, view: impl Into<String>) -> Self {
        Self {
            lib: lib.into(),
            cell: cell.into(),
            view: view.into(),
            params: BTreeMap::new(),
        }
    }
}

/// # Instance Master
#[derive(Debug, Clone, PartialEq, From)]
pub enum InstMaster {
    /// Reference to an external cellview
    Ref(CellViewRef),
    /// Bound in-memory master
    Master(Ptr<CellView>),
}

/// # Instance
///
/// A placement of `master` at `xform`, repeated per `array`.
/// Array offsets apply in parent coordinates.
///
/// Once committed to a [CellView], an instance changes only through its
/// `set_instance_master` and `set_instance_param` methods.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub(crate) name: String,
    master: InstMaster,
    xform: Transform,
    array: Array2d,
}
impl Instance {
    /// Create an [Instance] of a bound `master`
    pub fn new(
        name: impl Into<String>,
        master: Ptr<CellView>,
        xform: Transform,
        array: Array2d,
    ) -> Self {
        Self {
            name: name.into(),
            master: InstMaster::Master(master),
            xform,
            array,
        }
    }
    /// Create an [Instance] of external cellview `cvref`
    pub fn new_ref(
        name: impl Into<String>,
        cvref: CellViewRef,
        xform: Transform,
        array: Array2d,
    ) -> Self {
        Self {
            name: name.into(),
            master: InstMaster::Ref(cvref),
            xform,
            array,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn xform(&self) -> &Transform {
        &self.xform
    }
    pub fn array(&self) -> &Array2d {
        &self.array
    }
    pub fn master(&self) -> &InstMaster {
        &self.master
    }
    /// Boolean indication of whether we reference an external cellview
    pub fn is_reference(&self) -> bool {
        matches!(self.master, InstMaster::Ref(_))
    }
    /// Our bound master, if we have one
    pub fn cellview(&self) -> Option<&Ptr<CellView>> {
        match self.master {
            InstMaster::Master(ref cv) => Some(cv),
            InstMaster::Ref(_) => None,
        }
    }
    /// Library name. Bound masters are written to `output_lib`.
    pub fn lib_name<'a>(&'a self, output_lib: &'a str) -> &'a str {
        match self.master {
            InstMaster::Ref(ref r) => &r.lib,
            InstMaster::Master(_) => output_lib,
        }
    }
    /// Cell name. Bound master names are mapped through `rename`, where present.
    pub fn cell_name(&self, rename: Option<&HashMap<String, String>>) -> String {
        match self.master {
            InstMaster::Ref(ref r) => r.cell.clone(),
            InstMaster::Master(ref cv) => {
                let name = cv.cell_name();
                rename
                    .and_then(|map| map.get(name))
                    .map_or_else(|| name.to_string(), String::clone)
            }
        }
    }
    /// View name. Bound masters are written as `default_view`.
    pub fn view_name<'a>(&'a self, default_view: &'a str) -> &'a str {
        match self.master {
            InstMaster::Ref(ref r) => &r.view,
            InstMaster::Master(_) => default_view,
        }
    }
    /// Instance parameters. Only references have them.
    pub fn params(&self) -> Option<&BTreeMap<String, ParamValue>> {
        match self.master {
            InstMaster::Ref(ref r) => Some(&r.params),
            InstMaster::Master(_) => None,
        }
    }
    /// Bind to in-memory `master`, replacing any reference.
    /// Committed instances are rebound through [CellView::set_instance_master].
    pub fn set_master(&mut self, master: Ptr<CellView>) {
        self.master = InstMaster::Master(master);
    }
    /// Set a parameter of a reference instance
    pub fn set_param(
        &mut self,
        name: impl Into<String>,
        val: impl Into<ParamValue>,
    ) -> LayoutResult<()> {
        match self.master {
            InstMaster::Ref(ref mut r) => {
                r.params.insert(name.into(), val.into());
                Ok(())
            }
            InstMaster::Master(_) => Err(LayoutError::composition(format!(
                "Cannot set parameters of bound instance {}",
                self.name
            ))),
        }
    }
    /// Transforms of each array element, in parent coordinates
    pub fn element_xforms(&self) -> Vec<Transform> {
        self.array
            .offsets()
            .into_iter()
            .map(|off| self.xform.move_by(off.x, off.y))
            .collect()
    }
    /// Bounding box of the shapes on (`layer`, `purpose`), in parent coordinates.
    /// References have no known contents, and an empty box.
    pub fn get_bbox(&self, layer: LayerId, purpose: PurposeId) -> BoundBox {
        let cv = match self.master {
            InstMaster::Ref(_) => return BoundBox::empty(),
            InstMaster::Master(ref cv) => cv,
        };
        let bbox = cv.get_bbox(layer, purpose);
        if bbox.is_empty() {
            return bbox;
        }
        let first = bbox.transform(&self.xform);
        let span = self.array.span();
        let last = first.transform(&Transform::translate(span.x, span.y));
        first.union(&last)
    }
}
