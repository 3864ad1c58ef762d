// Leader-line construction: the 3-point polyline dot -> elbow -> label
// border. The terminal point always sits exactly on the label box edge.

use super::geometry::{border_point_for_side, distance_to_rect_edge_along_dir};
use super::{LabelNode, Point, Size};
use crate::config::ResolvedLabelCfg;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderPath {
    pub dot: Point,
    pub elbow: Point,
    pub border: Point,
}

impl LeaderPath {
    pub fn points(&self) -> [Point; 3] {
        [self.dot, self.elbow, self.border]
    }
}

pub fn build_leader_path(node: &LabelNode, cfg: &ResolvedLabelCfg) -> LeaderPath {
    let vx = node.x - node.elbow.x;
    let vy = node.y - node.elbow.y;
    let len = vx.hypot(vy);
    let len = if len == 0.0 { 1.0 } else { len };
    let ux = vx / len;
    let uy = vy / len;

    let center = Point { x: node.x, y: node.y };
    let border = match cfg.side {
        Some(side) => border_point_for_side(center, Size { w: node.w, h: node.h }, side),
        None => {
            // Walk back from the label center toward the elbow until the
            // box boundary.
            let t = distance_to_rect_edge_along_dir(node.w * 0.5, node.h * 0.5, ux, uy);
            // A degenerate direction (center on the elbow) makes t infinite;
            // collapse the border onto the center instead of emitting NaN.
            let t = if t.is_finite() { t } else { 0.0 };
            Point {
                x: node.x - ux * t,
                y: node.y - uy * t,
            }
        }
    };

    LeaderPath {
        dot: node.dot,
        elbow: node.elbow,
        border,
    }
}

/// SVG path data for a leader polyline.
pub fn leader_path_d(path: &LeaderPath) -> String {
    format!(
        "M{},{} L{},{} L{},{}",
        path.dot.x, path.dot.y, path.elbow.x, path.elbow.y, path.border.x, path.border.y
    )
}
