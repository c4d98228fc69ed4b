//!
//! # cbag21 Layout Database Core
//!
//! The geometric core of an integrated-circuit layout database.
//!
//! * [Tech] holds the technology rules: layer and purpose ids, via layer-pairs,
//!   minimum-spacing tables, and via enclosure rules.
//! * [RoutingGrid] and its per-level [TrackInfo]s define the half-track coordinate system
//!   and the block pitches which placed objects align to.
//! * [Geometry] holds the shapes of a single layer-purpose pair, both as a merged [PolySet]
//!   and as a spatial index of the individual shapes.
//! * [CellView] composes geometry, instances, vias, pins, blockages, and boundaries into a cell.
//!   Its `add_*` builders return [CvObjRef] handles, which insert their object on `commit`.
//!
//! [Tech], [RoutingGrid], and finished [CellView] masters are shared read-only via [Ptr].
//!

// Internal modules & re-exports
pub use cbag21utils as utils;
pub use utils::Ptr;

pub mod error;
pub use error::*;

pub mod geom;
pub use geom::*;

pub mod bbox;
pub use bbox::*;

pub mod tech;
pub use tech::*;

pub mod via;
pub use via::*;

pub mod tracks;
pub use tracks::*;

pub mod grid;
pub use grid::*;

pub mod polyset;
pub use polyset::*;

pub mod geometry;
pub use geometry::*;

pub mod path;
pub use path::*;

pub mod instance;
pub use instance::*;

pub mod objects;
pub use objects::*;

pub mod cellview;
pub use cellview::*;


/// # Location Integer Type-Alias
/// Used for all layout spatial coordinates and counts.
pub type Int = isize;
/// Layer identifier, as assigned by the technology
pub type LayerId = i16;
/// Purpose identifier, as assigned by the technology
pub type PurposeId = i16;
/// Routing-grid level index
pub type Level = i32;
/// Half-track index
pub type Htr = Int;
