//!
//! # Paths
//!
//! Construction of 45-degree polygon sets from wire center-lines,
//! either as a single wire or as a bus of parallel wires.
//!

// Std-Lib
use std::f64::consts::SQRT_2;

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    geom::{Point, Polygon45, Polygon45Set},
    geometry::Geometry,
    utils::{enumstr, EnumStr},
    Int,
};

enumstr!(
    /// # Path End Styles
    ///
    /// Shapes either end of a path, and each of its interior vertices.
    PathStyle {
        Truncate: "truncate",
        Extend: "extend",
        Round: "round",
        Triangle: "triangle",
    }
);

impl Geometry {
    /// Build the polygons of a path along center-line `points`, `2 * half_width` wide.
    ///
    /// Every segment must be horizontal, vertical, or at 45 degrees.
    /// `style0` and `style1` shape the first and last ends, and `stylem` every interior vertex.
    /// Diagonal widths and extensions round to the nearest integral step.
    pub fn make_path(
        points: &[Point],
        half_width: Int,
        style0: PathStyle,
        style1: PathStyle,
        stylem: PathStyle,
    ) -> LayoutResult<Polygon45Set> {
        if half_width <= 0 {
            return Err(LayoutError::representation(format!(
                "Invalid path half-width {}",
                half_width
            )));
        }
        let points = center_line(points)?;
        let nseg = points.len() - 1;
        let mut polys = Vec::with_capacity(nseg);
        for (idx, seg) in points.windows(2).enumerate() {
            let start = if idx == 0 { style0 } else { stylem };
            let end = if idx + 1 == nseg { style1 } else { stylem };
            add_segment(seg[0], seg[1], half_width, [start, end], &mut polys)?;
        }
        Polygon45Set::new(polys)
    }
    /// Build a bus of parallel paths along center-line `points`.
    ///
    /// Wire `i` is `widths[i]` wide, and `spaces[i]` separates it from wire `i + 1`.
    /// The bus is centered on `points`, with wire 0 furthest right of the path's direction.
    /// Fails if a corner of any wire falls between integral coordinates.
    pub fn make_path45_bus(
        points: &[Point],
        widths: &[Int],
        spaces: &[Int],
        style0: PathStyle,
        style1: PathStyle,
        stylem: PathStyle,
    ) -> LayoutResult<Polygon45Set> {
        if widths.is_empty() || spaces.len() + 1 != widths.len() {
            return Err(LayoutError::representation(format!(
                "Bus of {} wires requires {} spaces, not {}",
                widths.len(),
                widths.len().saturating_sub(1),
                spaces.len()
            )));
        }
        if spaces.iter().any(|sp| *sp < 0) {
            return Err(LayoutError::representation("Bus spaces must be non-negative"));
        }
        let points = center_line(points)?;
        let total: Int = widths.iter().sum::<Int>() + spaces.iter().sum::<Int>();
        let mut polys = Vec::new();
        let mut prefix = 0;
        for (idx, width) in widths.iter().enumerate() {
            // Offset of this wire's center from the bus center, to the left
            let dist = (2 * prefix + width - total) / 2;
            let wire = offset_line(&points, dist)?;
            let set = Self::make_path(&wire, width / 2, style0, style1, stylem)?;
            polys.extend_from_slice(set.polys());
            prefix += width + spaces.get(idx).copied().unwrap_or(0);
        }
        Polygon45Set::new(polys)
    }
}

/// Drop repeated points, and check that at least one segment remains
fn center_line(points: &[Point]) -> LayoutResult<Vec<Point>> {
    let mut rv = points.to_vec();
    rv.dedup();
    if rv.len() < 2 {
        return Err(LayoutError::representation(format!(
            "Path requires two distinct points, got {:?}",
            points
        )));
    }
    Ok(rv)
}

fn scale(p: Point, k: Int) -> Point {
    Point::new(p.x * k, p.y * k)
}

/// Left-hand normal of unit step `d`
fn normal(d: Point) -> Point {
    Point::new(-d.y, d.x)
}

/// Unit step from `p0` towards `p1`, each component in {-1, 0, 1}
fn unit_step(p0: Point, p1: Point) -> LayoutResult<Point> {
    let (dx, dy) = (p1.x - p0.x, p1.y - p0.y);
    if !(dx == 0 || dy == 0 || dx.abs() == dy.abs()) {
        return Err(LayoutError::representation(format!(
            "Path segment from {:?} to {:?} is not at a multiple of 45 degrees",
            p0, p1
        )));
    }
    Ok(Point::new(dx.signum(), dy.signum()))
}

/// Number of unit steps along `d` spanning distance `dist`
fn steps(d: Point, dist: Int) -> Int {
    if d.x != 0 && d.y != 0 {
        ((dist as f64) / SQRT_2).round() as Int
    } else {
        dist
    }
}

/// Add the polygons of the segment from `p0` to `p1`, with (start, end) styles `styles`
fn add_segment(
    p0: Point,
    p1: Point,
    half_width: Int,
    styles: [PathStyle; 2],
    polys: &mut Vec<Polygon45>,
) -> LayoutResult<()> {
    let d = unit_step(p0, p1)?;
    let reach = steps(d, half_width);
    let n = scale(normal(d), reach);
    let ext = |style: PathStyle| match style {
        PathStyle::Extend => reach,
        _ => 0,
    };
    let a = p0 - scale(d, ext(styles[0]));
    let b = p1 + scale(d, ext(styles[1]));
    polys.push(Polygon45::new(vec![a - n, b - n, b + n, a + n])?);

    // Caps beyond either end, pointing away from the segment
    for (p, style, out) in [(p0, styles[0], scale(d, -1)), (p1, styles[1], d)] {
        match style {
            PathStyle::Round => polys.push(octagon(p, half_width)?),
            PathStyle::Triangle => {
                polys.push(Polygon45::new(vec![p - n, p + scale(out, reach), p + n])?)
            }
            PathStyle::Truncate | PathStyle::Extend => (),
        }
    }
    Ok(())
}

/// Octagon centered on `center`, with its flat edges `radius` from it
fn octagon(center: Point, radius: Int) -> LayoutResult<Polygon45> {
    let (r, c) = (radius, ((radius as f64) * (SQRT_2 - 1.0)).round() as Int);
    let corners = [
        (r, -c),
        (r, c),
        (c, r),
        (-c, r),
        (-r, c),
        (-r, -c),
        (-c, -r),
        (c, -r),
    ];
    let mut points: Vec<Point> = corners
        .iter()
        .map(|&(x, y)| center + Point::new(x, y))
        .collect();
    points.dedup();
    Polygon45::new(points)
}

/// Offset center-line `points` by `dist` to its left, mitering each corner
fn offset_line(points: &[Point], dist: Int) -> LayoutResult<Vec<Point>> {
    let dirs = points
        .windows(2)
        .map(|seg| unit_step(seg[0], seg[1]))
        .collect::<LayoutResult<Vec<Point>>>()?;
    let shift = |d: Point| scale(normal(d), steps(d, dist));

    let mut rv = Vec::with_capacity(points.len());
    rv.push(points[0] + shift(dirs[0]));
    for (idx, pair) in dirs.windows(2).enumerate() {
        let p = points[idx + 1];
        rv.push(miter(p + shift(pair[0]), pair[0], p + shift(pair[1]), pair[1])?);
    }
    rv.push(points[points.len() - 1] + shift(dirs[dirs.len() - 1]));
    Ok(rv)
}

/// Intersection of the line through `p0` along `d0` with that through `p1` along `d1`
fn miter(p0: Point, d0: Point, p1: Point, d1: Point) -> LayoutResult<Point> {
    let (n0, n1) = (normal(d0), normal(d1));
    let det = n0.x * n1.y - n0.y * n1.x;
    if det == 0 {
        if d0 == d1 {
            return Ok(p0);
        }
        return Err(LayoutError::representation(format!(
            "Path reverses direction at {:?}",
            p0
        )));
    }
    let c0 = n0.x * p0.x + n0.y * p0.y;
    let c1 = n1.x * p1.x + n1.y * p1.y;
    let (x, y) = (c0 * n1.y - c1 * n0.y, n0.x * c1 - n1.x * c0);
    if x % det != 0 || y % det != 0 {
        return Err(LayoutError::representation(format!(
            "Offset path corner near {:?} is off the integer grid",
            p0
        )));
    }
    Ok(Point::new(x / det, y / det))
}
