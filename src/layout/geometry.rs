// Pure 2D primitives for leader-line label placement. Everything here is
// deterministic and total: degenerate inputs (zero-length vectors, boxes
// wider than the canvas) degrade to safe values instead of panicking.

use std::f32::consts::PI;

use super::{Point, Size};
use crate::config::Side;

/// Margin kept between a clamped label box and the canvas edge.
pub const CLAMP_MARGIN: f32 = 6.0;

pub fn deg_to_rad(deg: f32) -> f32 {
    deg * PI / 180.0
}

/// Unit vector for an angle in degrees. 0deg points along +x; positive
/// angles rotate toward +y (clockwise in SVG's y-down coordinates).
pub fn unit_from_angle(angle_deg: f32) -> (f32, f32) {
    let rad = deg_to_rad(angle_deg);
    (rad.cos(), rad.sin())
}

/// Rotates a vector by `turn_deg` and re-normalizes. The divisor falls back
/// to 1.0 when the rotated length is exactly zero, so a zero-length input
/// yields (0, 0) rather than NaN.
pub fn rotate_unit(ux: f32, uy: f32, turn_deg: f32) -> (f32, f32) {
    let th = deg_to_rad(turn_deg);
    let (sin, cos) = th.sin_cos();
    let rx = ux * cos - uy * sin;
    let ry = ux * sin + uy * cos;
    let len = rx.hypot(ry);
    let len = if len == 0.0 { 1.0 } else { len };
    (rx / len, ry / len)
}

/// Base unit vector for a placement side, tilted by `tilt_deg`.
pub fn unit_from_side(side: Side, tilt_deg: f32) -> (f32, f32) {
    let (bx, by) = match side {
        Side::Right => (1.0, 0.0),
        Side::Left => (-1.0, 0.0),
        Side::Top => (0.0, -1.0),
        Side::Bottom => (0.0, 1.0),
    };
    rotate_unit(bx, by, tilt_deg)
}

/// Parametric distance from the center of an axis-aligned `2*hw x 2*hh` box
/// to its boundary along the ray `(ux, uy)`. A zero component counts as
/// infinitely far, so the finite axis wins the min.
pub fn distance_to_rect_edge_along_dir(hw: f32, hh: f32, ux: f32, uy: f32) -> f32 {
    let tx = if ux != 0.0 { hw / ux.abs() } else { f32::INFINITY };
    let ty = if uy != 0.0 { hh / uy.abs() } else { f32::INFINITY };
    tx.min(ty)
}

/// Constrains a box center so the box, inflated by `margin`, stays inside
/// the extended canvas. The lower bound wins when the box is wider than the
/// canvas itself.
pub fn clamp_to_view(
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    margin: f32,
    view_w: f32,
    view_h: f32,
) -> Point {
    let hw = w / 2.0 + margin;
    let hh = h / 2.0 + margin;
    Point {
        x: x.min(view_w - hw).max(hw),
        y: y.min(view_h - hh).max(hh),
    }
}

/// Point on the label box boundary where the leader line attaches: the edge
/// midpoint on the side *opposite* the placement side, since the leader
/// approaches from the region. A label placed to the right connects on its
/// left edge. Host label configs are tuned against this rule.
pub fn border_point_for_side(center: Point, size: Size, side: Side) -> Point {
    let hw = size.w / 2.0;
    let hh = size.h / 2.0;
    match side {
        Side::Right => Point { x: center.x - hw, y: center.y },
        Side::Left => Point { x: center.x + hw, y: center.y },
        Side::Top => Point { x: center.x, y: center.y + hh },
        Side::Bottom => Point { x: center.x, y: center.y - hh },
    }
}
