//! SVG path-string builders.
//!
//! Angles follow the sunburst convention: 0 at twelve o'clock, increasing
//! clockwise, so a point at `(r, a)` is `(r·sin a, −r·cos a)`. Coordinates
//! are rounded to two decimals so identical inputs always produce identical
//! strings.

use std::f64::consts::{PI, TAU};

/// Format a coordinate: two decimals, no trailing zeros, no negative zero.
pub fn num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let s = format!("{rounded:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Cartesian point for a polar coordinate.
pub fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

fn point((x, y): (f64, f64)) -> String {
    format!("{},{}", num(x), num(y))
}

/// Horizontal segment from `x0` to `x1` at `y`.
pub fn h_line(x0: f64, x1: f64, y: f64) -> String {
    format!("M{},{}H{}", num(x0), num(y), num(x1))
}

/// Vertical segment from `y0` to `y1` at `x`.
pub fn v_line(x: f64, y0: f64, y1: f64) -> String {
    format!("M{},{}V{}", num(x), num(y0), num(y1))
}

/// Closed annulus sector between two radii and two angles.
///
/// With `inner == 0` the sector is a pie slice closed at the centre.
pub fn annulus_sector(inner: f64, outer: f64, start: f64, end: f64) -> String {
    let (start, end) = if end < start { (end, start) } else { (start, end) };
    let sweep = end - start;
    if sweep >= TAU - 1e-9 {
        // Full ring: two half arcs per radius.
        let mid = start + PI;
        let mut path = format!(
            "M{}A{r},{r},0,1,1,{}A{r},{r},0,1,1,{}",
            point(polar(outer, start)),
            point(polar(outer, mid)),
            point(polar(outer, start)),
            r = num(outer),
        );
        if inner > 0.0 {
            path.push_str(&format!(
                "M{}A{r},{r},0,1,0,{}A{r},{r},0,1,0,{}",
                point(polar(inner, start)),
                point(polar(inner, mid)),
                point(polar(inner, start)),
                r = num(inner),
            ));
        }
        path.push('Z');
        return path;
    }

    let large = u8::from(sweep > PI);
    let mut path = format!(
        "M{}A{r},{r},0,{large},1,{}",
        point(polar(outer, start)),
        point(polar(outer, end)),
        r = num(outer),
    );
    if inner > 0.0 {
        path.push_str(&format!(
            "L{}A{r},{r},0,{large},0,{}",
            point(polar(inner, end)),
            point(polar(inner, start)),
            r = num(inner),
        ));
    } else {
        path.push_str("L0,0");
    }
    path.push('Z');
    path
}

/// Open arc at `radius` for text to follow.
///
/// Arcs centred in the lower half run anticlockwise so the text reads
/// upright.
pub fn label_arc(radius: f64, start: f64, end: f64) -> String {
    let mid = (start + end) / 2.0;
    let large = u8::from(end - start > PI);
    if mid.abs() > PI / 2.0 {
        format!(
            "M{}A{r},{r},0,{large},0,{}",
            point(polar(radius, end)),
            point(polar(radius, start)),
            r = num(radius),
        )
    } else {
        format!(
            "M{}A{r},{r},0,{large},1,{}",
            point(polar(radius, start)),
            point(polar(radius, end)),
            r = num(radius),
        )
    }
}

/// Straight radial line at `angle` for text to follow.
///
/// On the left half of the circle the line runs inward so the text is not
/// upside down.
pub fn label_radial(inner: f64, outer: f64, angle: f64) -> String {
    let (from, to) = if angle < 0.0 {
        (outer, inner)
    } else {
        (inner, outer)
    };
    format!(
        "M{}L{}",
        point(polar(from, angle)),
        point(polar(to, angle))
    )
}
