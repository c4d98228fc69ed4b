//!
//! # Track Identifiers and Wire Arrays
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    Htr, Int, Level,
};

/// # Track Id
///
/// `num` parallel wire bundles on routing level `level`.
/// The first bundle is centered at half-track `htr`, each spans `ntr` tracks,
/// and successive bundles are `pitch` half-tracks apart.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId {
    level: Level,
    htr: Htr,
    ntr: Int,
    num: Int,
    pitch: Htr,
}
impl TrackId {
    /// Create a new [TrackId].
    /// Single-bundle ids have no repetition, and their `pitch` is stored as zero.
    pub fn new(level: Level, htr: Htr, ntr: Int, num: Int, pitch: Htr) -> LayoutResult<Self> {
        if ntr < 1 || num < 1 {
            return Err(LayoutError::out_of_range(format!(
                "Invalid track width {} or count {}",
                ntr, num
            )));
        }
        let pitch = if num == 1 { 0 } else { pitch };
        Ok(Self {
            level,
            htr,
            ntr,
            num,
            pitch,
        })
    }
    pub fn level(&self) -> Level {
        self.level
    }
    pub fn htr(&self) -> Htr {
        self.htr
    }
    pub fn ntr(&self) -> Int {
        self.ntr
    }
    pub fn num(&self) -> Int {
        self.num
    }
    pub fn pitch(&self) -> Htr {
        self.pitch
    }
    /// Center half-track of each bundle
    pub fn htrs(&self) -> impl Iterator<Item = Htr> {
        let (htr, pitch) = (self.htr, self.pitch);
        (0..self.num).map(move |idx| htr + idx * pitch)
    }
}
impl std::fmt::Display for TrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "TrackID(layer={}, htr={}, ntr={}, num={}, pitch={})",
            self.level, self.htr, self.ntr, self.num, self.pitch
        )
    }
}

/// # Wire Array
///
/// The wires of a [TrackId], spanning [`lower`, `upper`] along their track direction.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireArray {
    tid: TrackId,
    lower: Int,
    upper: Int,
}
impl WireArray {
    pub fn new(tid: TrackId, lower: Int, upper: Int) -> LayoutResult<Self> {
        if lower > upper {
            return Err(LayoutError::out_of_range(format!(
                "Invalid wire extent [{}, {}]",
                lower, upper
            )));
        }
        Ok(Self { tid, lower, upper })
    }
    pub fn track_id(&self) -> &TrackId {
        &self.tid
    }
    pub fn lower(&self) -> Int {
        self.lower
    }
    pub fn upper(&self) -> Int {
        self.upper
    }
    /// Midpoint of the extent, rounded toward negative infinity
    pub fn middle(&self) -> Int {
        (self.lower + self.upper).div_euclid(2)
    }
}
impl std::fmt::Display for WireArray {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "WireArray({}, {}, {})", self.tid, self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn single_track_has_no_pitch() -> LayoutResult<()> {
        let a = TrackId::new(1, 4, 1, 1, 6)?;
        let b = TrackId::new(1, 4, 1, 1, 0)?;
        assert_eq!(a.pitch(), 0);
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert_ne!(TrackId::new(1, 4, 1, 2, 6)?, TrackId::new(1, 4, 1, 2, 8)?);
        assert!(TrackId::new(1, 4, 0, 1, 0).is_err());
        Ok(())
    }
    #[test]
    fn track_htrs() -> LayoutResult<()> {
        let tid = TrackId::new(2, -1, 2, 3, 4)?;
        assert_eq!(tid.htrs().collect::<Vec<_>>(), vec![-1, 3, 7]);
        assert_eq!(
            tid.to_string(),
            "TrackID(layer=2, htr=-1, ntr=2, num=3, pitch=4)"
        );
        Ok(())
    }
    #[test]
    fn wire_middle() -> LayoutResult<()> {
        let tid = TrackId::new(1, 0, 1, 1, 0)?;
        assert_eq!(WireArray::new(tid, 0, 10)?.middle(), 5);
        assert_eq!(WireArray::new(tid, -5, 0)?.middle(), -3);
        assert!(WireArray::new(tid, 10, 0).is_err());
        Ok(())
    }
}
