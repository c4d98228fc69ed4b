//!
//! # Vias and the Via-Parameter Solver
//!
//! A [Via] places an `nx` by `ny` array of cuts, described by its [ViaParam].
//! [Tech::get_via_param] picks the via and cut array for a requested bounding box,
//! from the via rules of the technology.
//!

// Crates.io
use log::debug;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    geom::{Dir, Point, Rect, Transform, TransformTrait},
    tech::{rule_dim, Tech, TechLoader},
    utils::{ErrorHelper, Unwrapper},
    Int, LayerId,
};

/// # Enclosure Bucket Rule-File Record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EncBucketSpec {
    /// Largest wire width to which this bucket applies. May be `.inf`.
    pub width: f64,
    /// Allowed (along-track, across-track) enclosure pairs
    pub enc: Vec<(Int, Int)>,
}

/// # Via Rule-File Record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViaRuleSpec {
    /// Cut (width, height)
    pub cut_dim: (Int, Int),
    /// Cut-to-cut (x, y) spacing
    pub sp: (Int, Int),
    /// Cut-to-cut spacing for arrays with more than one cut in both directions
    #[serde(default)]
    pub sp2: Option<(Int, Int)>,
    /// Bottom-layer enclosure buckets, in ascending width order
    pub bot_enc: Vec<EncBucketSpec>,
    /// Top-layer enclosure buckets, in ascending width order
    pub top_enc: Vec<EncBucketSpec>,
}

/// Enclosure options for wires up to `max_width`
#[derive(Debug, Clone, PartialEq, Eq)]
struct EncBucket {
    max_width: Int,
    options: Vec<(Int, Int)>,
}

/// # Via Rule
///
/// Cut geometry and per-layer enclosure options of a single via id.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaRule {
    cut_dim: Point,
    sp: Point,
    sp2: Option<Point>,
    /// Bottom and top enclosure buckets
    enc: [Vec<EncBucket>; 2],
}
impl ViaRule {
    /// Validate and convert rule-file record `spec`
    pub(crate) fn load(spec: &ViaRuleSpec, loader: &TechLoader) -> LayoutResult<Self> {
        loader.assert(
            spec.cut_dim.0 > 0 && spec.cut_dim.1 > 0,
            "Via cut dimensions must be positive",
        )?;
        let spacings = std::iter::once(spec.sp).chain(spec.sp2);
        for sp in spacings {
            loader.assert(sp.0 >= 0 && sp.1 >= 0, "Via cut spacing must be non-negative")?;
        }
        let buckets = |specs: &[EncBucketSpec]| -> LayoutResult<Vec<EncBucket>> {
            loader.assert(!specs.is_empty(), "Via enclosure rules must be non-empty")?;
            let mut rv: Vec<EncBucket> = Vec::with_capacity(specs.len());
            for b in specs.iter() {
                let max_width = rule_dim(b.width)
                    .unwrapper(loader, format!("Invalid enclosure width {}", b.width))?;
                if let Some(prev) = rv.last() {
                    loader.assert(
                        prev.max_width < max_width,
                        "Enclosure widths must be strictly ascending",
                    )?;
                }
                loader.assert(
                    !b.enc.is_empty() && b.enc.iter().all(|(a, p)| *a >= 0 && *p >= 0),
                    "Enclosure options must be non-empty and non-negative",
                )?;
                rv.push(EncBucket {
                    max_width,
                    options: b.enc.clone(),
                });
            }
            Ok(rv)
        };
        Ok(Self {
            cut_dim: spec.cut_dim.into(),
            sp: spec.sp.into(),
            sp2: spec.sp2.map(Point::from),
            enc: [buckets(&spec.bot_enc)?, buckets(&spec.top_enc)?],
        })
    }
    pub fn cut_dim(&self) -> Point {
        self.cut_dim
    }
    /// Solve for the largest cut array fitting in a `dim`-sized box.
    ///
    /// `dirs` are the (bottom, top) track directions.
    /// With `extend`, along-track enclosure may reach beyond `dim`.
    /// Returns `None` if no array and enclosure fits.
    ///
    /// Arrays of a single row use spacing `sp`, and all others `sp2`.
    /// Within each of those two regimes a fit for `ny` rows implies a fit for fewer,
    /// so each column count binary-searches its largest row count.
    pub fn solve(&self, dim: Point, dirs: [Dir; 2], extend: bool) -> Option<ViaParam> {
        // Bound the counts with the smaller of the two spacings
        let spmin = match self.sp2 {
            Some(sp2) => Point::new(self.sp.x.min(sp2.x), self.sp.y.min(sp2.y)),
            None => self.sp,
        };
        let nx_max = max_cuts(dim.x, self.cut_dim.x, spmin.x);
        let ny_max = max_cuts(dim.y, self.cut_dim.y, spmin.y);

        // Most cuts first, then widest
        let mut best: Option<ViaParam> = None;
        for nx in (1..=nx_max).rev() {
            let best_cuts = best.map_or(0, |p| p.num[0] * p.num[1]);
            if nx * ny_max <= best_cuts {
                break;
            }
            let multi = self.largest_fit(nx, 2, ny_max, dim, dirs, extend);
            let found = multi.or_else(|| self.fit(nx, 1, dim, dirs, extend));
            if let Some(param) = found {
                if param.num[0] * param.num[1] > best_cuts {
                    best = Some(param);
                }
            }
        }
        best
    }
    /// Largest-`ny` fit within rows [`lo`, `hi`], for `nx` columns
    fn largest_fit(
        &self,
        nx: Int,
        lo: Int,
        hi: Int,
        dim: Point,
        dirs: [Dir; 2],
        extend: bool,
    ) -> Option<ViaParam> {
        if lo > hi {
            return None;
        }
        let mut found = self.fit(nx, lo, dim, dirs, extend)?;
        let (mut lo, mut hi) = (lo + 1, hi);
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            match self.fit(nx, mid, dim, dirs, extend) {
                Some(param) => {
                    found = param;
                    lo = mid + 1;
                }
                None => hi = mid - 1,
            }
        }
        Some(found)
    }
    /// Fit an `nx` by `ny` cut array and its enclosures in a `dim`-sized box
    fn fit(
        &self,
        nx: Int,
        ny: Int,
        dim: Point,
        dirs: [Dir; 2],
        extend: bool,
    ) -> Option<ViaParam> {
        let sp = match self.sp2 {
            Some(sp2) if nx > 1 && ny > 1 => sp2,
            _ => self.sp,
        };
        let arr = Point::new(
            nx * self.cut_dim.x + (nx - 1) * sp.x,
            ny * self.cut_dim.y + (ny - 1) * sp.y,
        );
        if arr.x > dim.x || arr.y > dim.y {
            return None;
        }
        let (enc0, off0) = enclosure(&self.enc[0], dim, arr, dirs[0], extend)?;
        let (enc1, off1) = enclosure(&self.enc[1], dim, arr, dirs[1], extend)?;
        Some(ViaParam {
            num: [nx, ny],
            cut_dim: self.cut_dim,
            cut_spacing: Point::new(
                if nx > 1 { sp.x } else { 0 },
                if ny > 1 { sp.y } else { 0 },
            ),
            enc: [enc0, enc1],
            off: [off0, off1],
        })
    }
}

/// Largest number of `cut`-wide cuts at spacing `sp` fitting in `dim`
fn max_cuts(dim: Int, cut: Int, sp: Int) -> Int {
    if dim < cut {
        return 0;
    }
    (dim + sp) / (cut + sp)
}

/// Pick the enclosure of a cut array `arr` in a `dim`-sized box,
/// on a layer with track direction `dir`.
/// Returns the (lower/left enclosure, extra upper/right enclosure) pair in x/y coordinates.
fn enclosure(
    buckets: &[EncBucket],
    dim: Point,
    arr: Point,
    dir: Dir,
    extend: bool,
) -> Option<(Point, Point)> {
    let (dim_along, dim_perp) = (dim.coord(dir), dim.coord(!dir));
    let (avail_along, avail_perp) = (dim_along - arr.coord(dir), dim_perp - arr.coord(!dir));
    // The wire width is the box's extent across the track
    let bucket = buckets
        .iter()
        .find(|b| dim_perp <= b.max_width)
        .or_else(|| buckets.last())?;
    let (along, _perp) = bucket
        .options
        .iter()
        .filter(|(a, p)| 2 * p <= avail_perp && (extend || 2 * a <= avail_along))
        .min()
        .copied()?;

    // Across the track, fill the box
    let (perp_enc, perp_off) = (avail_perp / 2, avail_perp % 2);
    // Along the track, fill the box unless extending past it
    let (along_enc, along_off) = if extend && along > avail_along / 2 {
        (along, 0)
    } else {
        (avail_along / 2, avail_along % 2)
    };
    let enc = Point::offset(along_enc, dir) + Point::offset(perp_enc, !dir);
    let off = Point::offset(along_off, dir) + Point::offset(perp_off, !dir);
    Some((enc, off))
}

/// # Via Parameters
///
/// An `num[0]` by `num[1]` array of `cut_dim`-sized cuts, at `cut_spacing`.
/// `enc[i]` is the lower/left enclosure on the bottom (0) and top (1) layers.
/// `off[i]` is extra enclosure on the upper/right side of the same layer.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViaParam {
    pub num: [Int; 2],
    pub cut_dim: Point,
    pub cut_spacing: Point,
    pub enc: [Point; 2],
    pub off: [Point; 2],
}
impl ViaParam {
    /// Create a new [ViaParam], checking its counts and dimensions
    pub fn new(
        num: [Int; 2],
        cut_dim: Point,
        cut_spacing: Point,
        enc: [Point; 2],
        off: [Point; 2],
    ) -> LayoutResult<Self> {
        if num[0] < 1 || num[1] < 1 {
            return Err(LayoutError::out_of_range(format!(
                "Invalid via cut counts {:?}",
                num
            )));
        }
        if cut_dim.x <= 0 || cut_dim.y <= 0 {
            return Err(LayoutError::representation(format!(
                "Invalid via cut dimensions {:?}",
                cut_dim
            )));
        }
        Ok(Self {
            num,
            cut_dim,
            cut_spacing,
            enc,
            off,
        })
    }
    /// Size of the cut array
    pub fn arr_dim(&self) -> Point {
        Point::new(
            self.num[0] * self.cut_dim.x + (self.num[0] - 1) * self.cut_spacing.x,
            self.num[1] * self.cut_dim.y + (self.num[1] - 1) * self.cut_spacing.y,
        )
    }
    /// Cut-array box, centered on the origin
    fn arr_rect(&self) -> Rect {
        let arr = self.arr_dim();
        let p0 = Point::new(-arr.x / 2, -arr.y / 2);
        Rect::new(p0, p0 + arr)
    }
    /// Enclosure box of layer `idx` (0 for bottom, 1 for top), centered on the origin
    fn enc_rect(&self, idx: usize) -> Rect {
        let arr = self.arr_rect();
        let (enc, off) = (self.enc[idx], self.off[idx]);
        Rect::new(arr.p0 - enc, arr.p1 + enc + off)
    }
}

/// # Via
///
/// An instantiable via: transform, via id, and [ViaParam].
/// The cut array is centered on the transform's location.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Via {
    pub xform: Transform,
    pub via_id: String,
    pub param: ViaParam,
}
impl Via {
    pub fn new(xform: Transform, via_id: impl Into<String>, param: ViaParam) -> Self {
        Self {
            xform,
            via_id: via_id.into(),
            param,
        }
    }
    /// The cut-array box, in parent coordinates
    pub fn cut_rect(&self) -> Rect {
        self.param.arr_rect().transform(&self.xform)
    }
    /// The bottom-layer enclosure box, in parent coordinates
    pub fn bot_rect(&self) -> Rect {
        self.param.enc_rect(0).transform(&self.xform)
    }
    /// The top-layer enclosure box, in parent coordinates
    pub fn top_rect(&self) -> Rect {
        self.param.enc_rect(1).transform(&self.xform)
    }
}

impl Tech {
    /// # Via-Parameter Solver
    ///
    /// Find the via and cut array joining layers `bot` and `top` within a `dim`-sized box,
    /// maximizing the number of cuts. `bot_dir` and `top_dir` are the layers' track directions.
    /// With `extend`, along-track enclosure may reach beyond `dim` to meet the rules.
    ///
    /// Ties go to the first via id (alphabetically), then to the widest array.
    /// Fails with [LayoutError::Representation] when no via fits.
    ///
    pub fn get_via_param(
        &self,
        dim: Point,
        bot: LayerId,
        top: LayerId,
        bot_dir: Dir,
        top_dir: Dir,
        extend: bool,
    ) -> LayoutResult<(String, ViaParam)> {
        let mut best: Option<(Int, &str, ViaParam)> = None;
        for (via_id, rule) in self.via_rules() {
            if self.get_via_layers(via_id)? != (bot, top) {
                continue;
            }
            if let Some(param) = rule.solve(dim, [bot_dir, top_dir], extend) {
                let ncuts = param.num[0] * param.num[1];
                let better = match best {
                    None => true,
                    Some((n, _, _)) => ncuts > n,
                };
                if better {
                    best = Some((ncuts, via_id, param));
                }
            }
        }
        match best {
            Some((_, via_id, param)) => {
                debug!("Via {} with {:?} cuts fits in {:?}", via_id, param.num, dim);
                Ok((via_id.to_string(), param))
            }
            None => Err(LayoutError::representation(format!(
                "No via between layers {} and {} fits in {:?}",
                bot, top, dim
            ))),
        }
    }
}
