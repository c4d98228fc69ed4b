//!
//! # Routing Grid
//!
//! Per-level track rules, and the half-track coordinate system built on them.
//!
//! Each level's tracks sit at `offset + htr * pitch / 2` for integer half-track index `htr`.
//! Levels are partitioned, bottom to top, into *ignored*, *private*, and *public* ranges.
//! Ignored levels have no block pitch. Private and public levels each align to the
//! least-common-multiple of the pitches of same-direction levels below them, within their own range.
//!

// Std-Lib
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::path::Path;

// Crates.io
use log::debug;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    geom::Dir,
    tech::{LayerKey, SpaceType, Tech},
    utils::{ErrorContext, ErrorHelper, Ptr, SerdeFile, Unwrapper},
    Htr, Int, Level,
};

/// # Track Rule-File Record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackInfoSpec {
    pub direction: Dir,
    pub width: Int,
    pub space: Int,
    /// Coordinate of half-track zero. Defaults to half the pitch.
    #[serde(default)]
    pub offset: Option<Int>,
    /// Drawing (layer, purpose) names, one per color of multi-patterned levels
    pub layers: Vec<(String, String)>,
    /// Wire widths for bundles of more than one track, keyed by track count
    #[serde(default)]
    pub w_override: BTreeMap<Int, Int>,
}

/// # Routing-Grid Rule-File Record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GridSpec {
    /// Track rules per level. Levels must be contiguous.
    pub routing_grid: BTreeMap<Level, TrackInfoSpec>,
    #[serde(default)]
    pub top_ignore_layer: Option<Level>,
    #[serde(default)]
    pub top_private_layer: Option<Level>,
}
impl SerdeFile for GridSpec {}

/// # Block Pitch
///
/// Alignment unit for objects placed over a level: `full` for track-aligned placement,
/// `half` for half-track-aligned placement.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPitch {
    pub full: Int,
    pub half: Int,
}

/// # Track Info
///
/// Wire rules for a single routing level.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    dir: Dir,
    width: Int,
    space: Int,
    offset: Int,
    /// `None` on ignored levels
    blk_pitch: Option<BlockPitch>,
    w_override: BTreeMap<Int, Int>,
    layers: Vec<LayerKey>,
    layer_type: String,
}
impl TrackInfo {
    pub fn direction(&self) -> Dir {
        self.dir
    }
    pub fn width(&self) -> Int {
        self.width
    }
    pub fn space(&self) -> Int {
        self.space
    }
    /// Track-to-track pitch
    pub fn pitch(&self) -> Int {
        self.width + self.space
    }
    pub fn offset(&self) -> Int {
        self.offset
    }
    pub fn block_pitch(&self) -> Option<BlockPitch> {
        self.blk_pitch
    }
    /// Drawing layer keys, one per color
    pub fn layers(&self) -> &[LayerKey] {
        &self.layers
    }
    pub fn layer_type(&self) -> &str {
        &self.layer_type
    }
    /// Width of a wire spanning `ntr` tracks
    pub fn get_wire_width(&self, ntr: Int) -> LayoutResult<Int> {
        if ntr < 1 {
            return Err(LayoutError::out_of_range(format!(
                "Invalid track count {}",
                ntr
            )));
        }
        Ok(match self.w_override.get(&ntr) {
            Some(w) => *w,
            None => ntr * self.pitch() - self.space,
        })
    }
    /// Coordinate of half-track `htr`
    pub fn htr_to_coord(&self, htr: Htr) -> Int {
        self.offset + htr * (self.pitch() / 2)
    }
    /// Half-track index of `coord`.
    /// Fails if `coord` does not sit exactly on a half-track.
    pub fn coord_to_htr(&self, coord: Int) -> LayoutResult<Htr> {
        let delta = 2 * (coord - self.offset);
        if delta % self.pitch() != 0 {
            return Err(LayoutError::out_of_range(format!(
                "Coordinate {} is not on a half-track",
                coord
            )));
        }
        Ok(delta / self.pitch())
    }
}

/// Grid loader, tracking its position for error reporting
#[derive(Debug, Default)]
struct GridLoader {
    stack: Vec<ErrorContext>,
}
impl ErrorHelper for GridLoader {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Load {
            message: msg.into(),
            stack: self.stack.clone(),
        }
    }
}
impl GridLoader {
    fn track_info(&self, tech: &Tech, spec: &TrackInfoSpec) -> LayoutResult<TrackInfo> {
        self.assert(
            spec.width > 0 && spec.space > 0,
            "Track width and space must be positive",
        )?;
        let pitch = spec.width + spec.space;
        self.assert(
            pitch % 2 == 0,
            format!("Track pitch {} must be even", pitch),
        )?;
        self.assert(
            spec.w_override.iter().all(|(ntr, w)| *ntr >= 1 && *w > 0),
            "Width overrides must have positive track counts and widths",
        )?;
        self.assert(!spec.layers.is_empty(), "Track layers must be non-empty")?;
        let layers = spec
            .layers
            .iter()
            .map(|(lay, purp)| {
                tech.layer_key(lay, Some(purp))
                    .unwrapper(self, format!("Cannot resolve layer ({}, {})", lay, purp))
            })
            .collect::<LayoutResult<Vec<_>>>()?;
        let layer_type = tech
            .get_layer_type(layers[0].layer)
            .unwrapper(self, "Track layer has no layer type")?;
        Ok(TrackInfo {
            dir: spec.direction,
            width: spec.width,
            space: spec.space,
            offset: spec.offset.unwrap_or(pitch / 2),
            blk_pitch: None,
            w_override: spec.w_override.clone(),
            layers,
            layer_type: layer_type.to_string(),
        })
    }
}

/// # Routing Grid
///
/// Ordered [TrackInfo]s from `bot_layer` upward, and their ignored/private/public partition.
/// An empty ignored or private range is expressed by setting its top to `bot_layer - 1`.
///
#[derive(Debug, Clone)]
pub struct RoutingGrid {
    tech: Ptr<Tech>,
    bot_layer: Level,
    top_ignore_layer: Level,
    top_private_layer: Level,
    info_list: Vec<TrackInfo>,
}
impl RoutingGrid {
    /// Create a [RoutingGrid] from rule-file record `spec`, resolving its layers through `tech`
    pub fn new(tech: Ptr<Tech>, spec: &GridSpec) -> LayoutResult<Self> {
        let mut loader = GridLoader::default();
        loader.stack.push(ErrorContext::Grid);
        let bot_layer = *spec
            .routing_grid
            .keys()
            .next()
            .unwrapper(&loader, "Routing grid has no levels")?;
        let mut info_list = Vec::with_capacity(spec.routing_grid.len());
        for (idx, (level, tspec)) in spec.routing_grid.iter().enumerate() {
            loader.stack.push(ErrorContext::Level(*level));
            loader.assert(
                Level::try_from(idx).map(|i| bot_layer + i) == Ok(*level),
                format!("Routing grid levels must be contiguous from {}", bot_layer),
            )?;
            info_list.push(loader.track_info(&tech, tspec)?);
            loader.stack.pop();
        }
        let mut grid = Self {
            tech,
            bot_layer,
            top_ignore_layer: bot_layer - 1,
            top_private_layer: bot_layer - 1,
            info_list,
        };
        grid.set_partition(
            spec.top_ignore_layer.unwrap_or(bot_layer - 1),
            spec.top_private_layer.unwrap_or(bot_layer - 1),
        )?;
        Ok(grid)
    }
    /// Load from rule-file `fname`, with format inferred from its extension
    pub fn open(tech: Ptr<Tech>, fname: impl AsRef<Path>) -> LayoutResult<Self> {
        Self::new(tech, &GridSpec::open_any(fname)?)
    }
    /// Re-partition into ignored levels up to `top_ignore`, and private levels up to `top_private`.
    /// Re-derives every block pitch.
    pub fn with_partition(mut self, top_ignore: Level, top_private: Level) -> LayoutResult<Self> {
        self.set_partition(top_ignore, top_private)?;
        Ok(self)
    }
    fn set_partition(&mut self, top_ignore: Level, top_private: Level) -> LayoutResult<()> {
        let (bot, top) = (self.bot_layer, self.top_layer());
        if !(bot - 1 <= top_ignore && top_ignore <= top_private && top_private <= top) {
            return Err(LayoutError::out_of_range(format!(
                "Invalid grid partition: ignore through {}, private through {}, levels {} to {}",
                top_ignore, top_private, bot, top
            )));
        }
        self.top_ignore_layer = top_ignore;
        self.top_private_layer = top_private;
        self.update_block_pitch()
    }
    /// Derive block pitches for each range of the partition
    fn update_block_pitch(&mut self) -> LayoutResult<()> {
        let num_ignore = usize::try_from(self.top_ignore_layer + 1 - self.bot_layer)?;
        let private_end = usize::try_from(self.top_private_layer + 1 - self.bot_layer)?;
        for info in self.info_list[..num_ignore].iter_mut() {
            info.blk_pitch = None;
        }
        block_pitch_chain(&mut self.info_list[num_ignore..private_end]);
        block_pitch_chain(&mut self.info_list[private_end..]);
        debug!(
            "Block pitches: {:?}",
            self.info_list
                .iter()
                .map(|i| i.blk_pitch)
                .collect::<Vec<_>>()
        );
        Ok(())
    }
    pub fn tech(&self) -> &Ptr<Tech> {
        &self.tech
    }
    pub fn bot_layer(&self) -> Level {
        self.bot_layer
    }
    pub fn top_layer(&self) -> Level {
        self.bot_layer + self.info_list.len() as Level - 1
    }
    pub fn top_ignore_layer(&self) -> Level {
        self.top_ignore_layer
    }
    pub fn top_private_layer(&self) -> Level {
        self.top_private_layer
    }
    /// Get the [TrackInfo] of `level`
    pub fn track_info(&self, level: Level) -> LayoutResult<&TrackInfo> {
        usize::try_from(level - self.bot_layer)
            .ok()
            .and_then(|idx| self.info_list.get(idx))
            .ok_or_else(|| {
                LayoutError::out_of_range(format!("Undefined routing grid level: {}", level))
            })
    }
    pub fn get_direction(&self, level: Level) -> LayoutResult<Dir> {
        Ok(self.track_info(level)?.direction())
    }
    pub fn get_block_pitch(&self, level: Level) -> LayoutResult<Option<BlockPitch>> {
        Ok(self.track_info(level)?.block_pitch())
    }
    pub fn htr_to_coord(&self, level: Level, htr: Htr) -> LayoutResult<Int> {
        Ok(self.track_info(level)?.htr_to_coord(htr))
    }
    pub fn coord_to_htr(&self, level: Level, coord: Int) -> LayoutResult<Htr> {
        self.track_info(level)?.coord_to_htr(coord)
    }
    pub fn get_wire_width(&self, level: Level, ntr: Int) -> LayoutResult<Int> {
        self.track_info(level)?.get_wire_width(ntr)
    }
    /// Drawing layer of the track at half-track `htr`.
    /// Multi-colored levels cycle through their layers one track at a time.
    pub fn get_layer_key(&self, level: Level, htr: Htr) -> LayoutResult<LayerKey> {
        let layers = self.track_info(level)?.layers();
        let idx = htr.div_euclid(2).rem_euclid(layers.len() as Htr) as usize;
        Ok(layers[idx])
    }
    /// Number of half-tracks which must stay empty between two `num_tr`-track wires on `level`.
    ///
    /// Uses same-color spacing rules if `same_color`.
    /// If `even`, the center-to-center separation is rounded up to a whole number of tracks.
    pub fn get_min_space_htr(
        &self,
        level: Level,
        num_tr: Int,
        same_color: bool,
        even: bool,
    ) -> LayoutResult<Htr> {
        let info = self.track_info(level)?;
        let width = info.get_wire_width(num_tr)?;
        let sp_type = if same_color {
            SpaceType::SameColor
        } else {
            SpaceType::DiffColor
        };
        let space = self.tech.get_min_space(info.layer_type(), width, sp_type)?;
        let half_pitch = info.pitch() / 2;
        let mut sep = num_integer::Integer::div_ceil(&(space + width), &half_pitch);
        if even && sep % 2 != 0 {
            sep += 1;
        }
        Ok((sep - 2 * num_tr).max(0))
    }
}

/// Derive block pitches of a range of levels, in ascending order.
/// Each is the LCM of its own pitch with those of the same-direction levels below it.
fn block_pitch_chain(infos: &mut [TrackInfo]) {
    let mut chains = [BlockPitch { full: 1, half: 1 }; 2];
    for info in infos.iter_mut() {
        let raw = BlockPitch {
            full: info.pitch(),
            half: info.pitch() / 2,
        };
        let chain = &mut chains[info.dir.index()];
        chain.full = num_integer::lcm(chain.full, raw.full);
        chain.half = num_integer::lcm(chain.half, raw.half);
        info.blk_pitch = Some(*chain);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::SampleTech;

    fn pitch(full: Int, half: Int) -> Option<BlockPitch> {
        Some(BlockPitch { full, half })
    }
    #[test]
    fn levels_and_directions() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        assert_eq!(grid.bot_layer(), 1);
        assert_eq!(grid.top_layer(), 4);
        assert_eq!(grid.get_direction(1)?, Dir::Horiz);
        assert_eq!(grid.get_direction(2)?, Dir::Vert);
        assert!(matches!(grid.get_direction(0), Err(LayoutError::OutOfRange(_))));
        assert!(matches!(grid.get_direction(5), Err(LayoutError::OutOfRange(_))));
        Ok(())
    }
    #[test]
    fn block_pitch_all_public() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        assert_eq!(grid.get_block_pitch(1)?, pitch(80, 40));
        assert_eq!(grid.get_block_pitch(2)?, pitch(100, 50));
        assert_eq!(grid.get_block_pitch(3)?, pitch(240, 120));
        assert_eq!(grid.get_block_pitch(4)?, pitch(800, 400));
        Ok(())
    }
    #[test]
    fn block_pitch_partitioned() -> LayoutResult<()> {
        let grid = SampleTech::grid()?.with_partition(1, 2)?;
        assert_eq!(grid.get_block_pitch(1)?, None);
        assert_eq!(grid.get_block_pitch(2)?, pitch(100, 50));
        // Public levels restart their chains, inheriting nothing from private levels
        assert_eq!(grid.get_block_pitch(3)?, pitch(120, 60));
        assert_eq!(grid.get_block_pitch(4)?, pitch(160, 80));

        let grid = grid.with_partition(0, 4)?;
        assert_eq!(grid.get_block_pitch(4)?, pitch(800, 400));
        assert!(SampleTech::grid()?.with_partition(3, 2).is_err());
        assert!(SampleTech::grid()?.with_partition(-1, 0).is_err());
        assert!(SampleTech::grid()?.with_partition(0, 5).is_err());
        Ok(())
    }
    #[test]
    fn block_pitch_divides_raw_pitches() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        for level in grid.bot_layer()..=grid.top_layer() {
            let info = grid.track_info(level)?;
            let blk = grid.get_block_pitch(level)?.ok_or("missing block pitch")?;
            for lower in grid.bot_layer()..=level {
                let other = grid.track_info(lower)?;
                if other.direction() == info.direction() {
                    assert_eq!(blk.full % other.pitch(), 0);
                    assert_eq!(blk.half % (other.pitch() / 2), 0);
                }
            }
        }
        Ok(())
    }
    #[test]
    fn half_track_coords() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        assert_eq!(grid.htr_to_coord(1, 0)?, 40);
        assert_eq!(grid.htr_to_coord(1, 1)?, 80);
        assert_eq!(grid.htr_to_coord(1, -3)?, -80);
        for level in 1..=4 {
            for htr in -20..20 {
                let coord = grid.htr_to_coord(level, htr)?;
                assert_eq!(grid.coord_to_htr(level, coord)?, htr);
            }
        }
        assert!(matches!(
            grid.coord_to_htr(1, 100),
            Err(LayoutError::OutOfRange(_))
        ));
        assert!(grid.coord_to_htr(1, 41).is_err());
        Ok(())
    }
    #[test]
    fn wire_widths() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        assert_eq!(grid.get_wire_width(3, 1)?, 50);
        assert_eq!(grid.get_wire_width(3, 2)?, 180);
        assert_eq!(grid.get_wire_width(3, 4)?, 410);
        assert!(grid.get_wire_width(3, 0).is_err());
        Ok(())
    }
    #[test]
    fn layer_colors() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        let tech = grid.tech();
        let color1 = tech.layer_key("M3", Some("color1"))?;
        let color2 = tech.layer_key("M3", Some("color2"))?;
        assert_eq!(grid.get_layer_key(3, 0)?, color1);
        assert_eq!(grid.get_layer_key(3, 1)?, color1);
        assert_eq!(grid.get_layer_key(3, 2)?, color2);
        assert_eq!(grid.get_layer_key(3, -1)?, color2);
        assert_eq!(grid.get_layer_key(3, -3)?, color1);
        assert_eq!(grid.get_layer_key(1, 7)?, tech.layer_key("M1", None)?);
        Ok(())
    }
    #[test]
    fn min_space_htr() -> LayoutResult<()> {
        let grid = SampleTech::grid()?;
        // 40-wide wire, 32 spacing, 50 half-pitch: adjacent tracks suffice
        assert_eq!(grid.get_min_space_htr(2, 1, false, false)?, 0);
        // 180-wide wire, 96 same-color spacing, 60 half-pitch: 5 half-tracks apart
        assert_eq!(grid.get_min_space_htr(3, 2, true, false)?, 1);
        assert_eq!(grid.get_min_space_htr(3, 2, true, true)?, 2);
        // Different-color spacing of 48
        assert_eq!(grid.get_min_space_htr(3, 2, false, false)?, 0);
        Ok(())
    }
    #[test]
    fn invalid_grids() -> LayoutResult<()> {
        let tech = SampleTech::tech()?;
        let mut spec = SampleTech::grid_spec()?;
        let level4 = spec.routing_grid.remove(&4).ok_or("missing level 4")?;
        spec.routing_grid.insert(5, level4);
        assert!(matches!(
            RoutingGrid::new(tech.clone(), &spec),
            Err(LayoutError::Load { .. })
        ));

        let mut spec = SampleTech::grid_spec()?;
        if let Some(l1) = spec.routing_grid.get_mut(&1) {
            l1.space = 41;
        }
        assert!(RoutingGrid::new(tech.clone(), &spec).is_err());

        let mut spec = SampleTech::grid_spec()?;
        if let Some(l1) = spec.routing_grid.get_mut(&1) {
            l1.layers = vec![("M1".into(), "nope".into())];
        }
        match RoutingGrid::new(tech, &spec) {
            Err(LayoutError::Load { stack, .. }) => {
                assert_eq!(stack, vec![ErrorContext::Grid, ErrorContext::Level(1)]);
            }
            _ => panic!("Expected a load error"),
        }
        Ok(())
    }
}
