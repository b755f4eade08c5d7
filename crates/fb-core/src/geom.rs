//! Geometry helpers shared by picking, gestures, and painting.
//!
//! Pure functions over `kurbo` points; nothing here owns state.

use kurbo::{Line, Point};

/// Shortest distance from `p` to the segment `seg`.
///
/// A zero-length segment degrades to point distance.
pub fn distance_to_segment(p: Point, seg: Line) -> f64 {
    let d = seg.p1 - seg.p0;
    let len_sq = d.hypot2();
    if len_sq == 0.0 {
        return p.distance(seg.p0);
    }
    let t = ((p - seg.p0).dot(d) / len_sq).clamp(0.0, 1.0);
    p.distance(seg.p0 + d * t)
}

/// Barycentric point-in-triangle test. Points on an edge count as inside.
///
/// Degenerate (zero-area) triangles contain nothing.
pub fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let denom = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if denom == 0.0 {
        return false;
    }
    let u = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / denom;
    let v = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / denom;
    let w = 1.0 - u - v;
    u >= 0.0 && v >= 0.0 && w >= 0.0
}

/// Inclusive point-in-circle test.
pub fn point_in_circle(p: Point, center: Point, radius: f64) -> bool {
    p.distance(center) <= radius
}

// ─── Grid snapping ───────────────────────────────────────────────────────

/// Round `v` to the nearest multiple of `grid`.
pub fn snap(v: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return v;
    }
    (v / grid).round() * grid
}

/// Snap a point to the grid. Arrow points sit in the middle of a cell
/// (half-cell offset) so that lines run between grid lines.
pub fn snap_point(p: Point, grid: f64, arrow: bool) -> Point {
    if grid <= 0.0 {
        return p;
    }
    let offset = if arrow { grid / 2.0 } else { 0.0 };
    Point::new(snap(p.x, grid) + offset, snap(p.y, grid) + offset)
}
