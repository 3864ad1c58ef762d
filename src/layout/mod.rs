//! Label layout: turns region centroids and per-region configuration into
//! fully resolved label nodes (anchor dot, elbow, clamped box position).
//!
//! The whole pass is synchronous and deterministic. Rendered-size
//! corrections arrive later through [`crate::feedback`] and only resize the
//! label container; they never feed back into this calculator.

pub mod geometry;
pub mod leader;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::config::{
    LABEL_CLAMP_EXTRA_H, LABEL_CLAMP_EXTRA_W, LABEL_FONT_SIZE, LABEL_FONT_WEIGHT, LABEL_GAP,
    LABEL_PAD_X, LABEL_PAD_Y, MapConfig, ResolvedLabelCfg, Side,
};
use crate::region::{Centroid, NameTable, RegionDatum, centroids};
use geometry::{
    CLAMP_MARGIN, clamp_to_view, distance_to_rect_edge_along_dir, rotate_unit, unit_from_angle,
    unit_from_side,
};
use text::TextMeasure;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

/// A fully placed label: text lines, padded box size, clamped center
/// position, and the two leader-line joints. Recomputed from scratch on
/// every layout pass, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelNode {
    pub key: String,
    pub lines: Vec<String>,
    pub w: f32,
    pub h: f32,
    pub x: f32,
    pub y: f32,
    pub elbow: Point,
    pub dot: Point,
}

/// Layout pass over a region set: derive centroids from path data, then
/// place one label per region. Node order follows region order.
pub fn compute_layout(
    regions: &[RegionDatum],
    config: &MapConfig,
    names: Option<&NameTable>,
    measure: &dyn TextMeasure,
) -> Vec<LabelNode> {
    let cents = centroids(regions, names, config.locale.as_deref());
    compute_label_nodes(&cents, config, measure)
}

pub fn compute_label_nodes(
    centroids: &[Centroid],
    config: &MapConfig,
    measure: &dyn TextMeasure,
) -> Vec<LabelNode> {
    centroids
        .iter()
        .map(|c| compute_label_node(c, config.resolve_label(&c.key), config, measure))
        .collect()
}

/// Value line first when present, then the name line.
pub fn label_lines(centroid: &Centroid) -> Vec<String> {
    match centroid.value {
        Some(value) => vec![format_value(value), centroid.name.clone()],
        None => vec![centroid.name.clone()],
    }
}

/// Stringifies a numeric value the way the host shows it: integral values
/// without a fractional part ("500"), others as plain decimals ("1.5").
pub fn format_value(value: f64) -> String {
    format!("{value}")
}

fn compute_label_node(
    centroid: &Centroid,
    cfg: ResolvedLabelCfg,
    config: &MapConfig,
    measure: &dyn TextMeasure,
) -> LabelNode {
    // Primary direction carries dot -> elbow; the secondary direction
    // carries elbow -> label. Deriving the secondary by rotating the
    // primary (rather than from its own absolute angle) is intentional:
    // turning the primary swings the whole assembly.
    let (ux1, uy1) = unit_from_angle(cfg.angle_deg);
    let (ux2, uy2) = match cfg.side {
        Some(side) => unit_from_side(side, cfg.tilt_deg),
        None => rotate_unit(ux1, uy1, cfg.turn_deg),
    };

    let lines = label_lines(centroid);
    let raw = measure.measure_lines(&lines, LABEL_FONT_SIZE, LABEL_FONT_WEIGHT);
    let w = raw.w + LABEL_PAD_X * 2.0;
    let h = raw.h + LABEL_PAD_Y * 2.0;
    let hw = w * 0.5;
    let hh = h * 0.5;

    let dot = Point {
        x: centroid.cx + cfg.dot_dx,
        y: centroid.cy + cfg.dot_dy,
    };
    let elbow = Point {
        x: dot.x + cfg.h * ux1,
        y: dot.y + cfg.h * uy1,
    };

    let center = label_center(&cfg, elbow, ux2, uy2, hw, hh);
    // Inflate the box a little extra before clamping to keep the canvas
    // margin visually generous.
    let clamped = clamp_to_view(
        center.x,
        center.y,
        w + LABEL_CLAMP_EXTRA_W,
        h + LABEL_CLAMP_EXTRA_H,
        CLAMP_MARGIN,
        config.view_w,
        config.view_h,
    );

    LabelNode {
        key: centroid.key.clone(),
        lines,
        w,
        h,
        x: clamped.x,
        y: clamped.y,
        elbow,
        dot,
    }
}

fn label_center(
    cfg: &ResolvedLabelCfg,
    elbow: Point,
    ux2: f32,
    uy2: f32,
    hw: f32,
    hh: f32,
) -> Point {
    let px = elbow.x + cfg.v * ux2;
    let py = elbow.y + cfg.v * uy2;

    match cfg.side {
        Some(Side::Right) => Point { x: px + (hw + LABEL_GAP), y: py },
        Some(Side::Left) => Point { x: px - (hw + LABEL_GAP), y: py },
        Some(Side::Top) => Point { x: px, y: py - (hh + LABEL_GAP) },
        Some(Side::Bottom) => Point { x: px, y: py + (hh + LABEL_GAP) },
        None => {
            // Free direction: push the label far enough out that its own
            // box, crossed along the ray, just clears the elbow plus gap.
            let edge = distance_to_rect_edge_along_dir(hw, hh, ux2, uy2);
            Point {
                x: elbow.x + (cfg.v + edge + LABEL_GAP) * ux2,
                y: elbow.y + (cfg.v + edge + LABEL_GAP) * uy2,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::text::FixedMeasure;
    use super::*;
    use crate::config::LabelCfg;

    fn centroid(key: &str, cx: f32, cy: f32) -> Centroid {
        Centroid {
            key: key.to_string(),
            cx,
            cy,
            name: format!("Region {key}"),
            value: None,
        }
    }

    fn measure() -> FixedMeasure {
        FixedMeasure::new(7.0)
    }

    #[test]
    fn dot_and_elbow_derivation() {
        let mut config = MapConfig::default();
        config.labels.insert(
            "9".to_string(),
            LabelCfg {
                dot_dx: Some(-50.0),
                dot_dy: Some(10.0),
                angle_deg: Some(120.0),
                h: Some(100.0),
                ..LabelCfg::default()
            },
        );
        let nodes = compute_label_nodes(&[centroid("9", 400.0, 200.0)], &config, &measure());
        let node = &nodes[0];

        assert_eq!(node.dot, Point { x: 350.0, y: 210.0 });
        let (ux1, uy1) = unit_from_angle(120.0);
        assert!((node.elbow.x - (350.0 + 100.0 * ux1)).abs() < 1e-4);
        assert!((node.elbow.y - (210.0 + 100.0 * uy1)).abs() < 1e-4);
    }

    #[test]
    fn side_right_offsets_by_half_width_plus_gap() {
        let mut config = MapConfig::default();
        config.labels.insert(
            "7".to_string(),
            LabelCfg {
                side: Some(Side::Right),
                h: Some(0.0),
                v: Some(40.0),
                ..LabelCfg::default()
            },
        );
        let nodes = compute_label_nodes(&[centroid("7", 500.0, 300.0)], &config, &measure());
        let node = &nodes[0];

        // side=right: (ux2, uy2) = (1, 0), so x = elbow.x + v + hw + 12.
        let hw = node.w * 0.5;
        assert!((node.x - (node.elbow.x + 40.0 + hw + LABEL_GAP)).abs() < 1e-3);
        assert!((node.y - node.elbow.y).abs() < 1e-3);
    }

    #[test]
    fn free_direction_uses_secondary_vector() {
        let mut config = MapConfig::default();
        config.labels.insert(
            "5".to_string(),
            LabelCfg {
                angle_deg: Some(0.0),
                turn_deg: Some(90.0),
                h: Some(30.0),
                v: Some(50.0),
                ..LabelCfg::default()
            },
        );
        let nodes = compute_label_nodes(&[centroid("5", 500.0, 300.0)], &config, &measure());
        let node = &nodes[0];

        // angle 0 -> elbow straight right; turn 90 -> label straight down.
        assert!((node.elbow.x - 530.0).abs() < 1e-3);
        assert!((node.elbow.y - 300.0).abs() < 1e-3);
        let hh = node.h * 0.5;
        assert!((node.x - node.elbow.x).abs() < 1e-2);
        assert!((node.y - (node.elbow.y + 50.0 + hh + LABEL_GAP)).abs() < 1e-2);
    }

    #[test]
    fn value_line_comes_first() {
        let c = Centroid {
            value: Some(500.0),
            ..centroid("3", 100.0, 100.0)
        };
        assert_eq!(label_lines(&c), vec!["500".to_string(), "Region 3".to_string()]);
    }

    #[test]
    fn format_value_trims_integrals() {
        assert_eq!(format_value(500.0), "500");
        assert_eq!(format_value(1.5), "1.5");
    }

    #[test]
    fn padding_applied_to_measured_box() {
        let config = MapConfig::default();
        let nodes = compute_label_nodes(&[centroid("1", 500.0, 300.0)], &config, &measure());
        let node = &nodes[0];
        // "Region 1" = 8 chars at 7px, plus 10px padding per side.
        assert_eq!(node.w, 8.0 * 7.0 + LABEL_PAD_X * 2.0);
        assert_eq!(node.h, LABEL_FONT_SIZE + LABEL_PAD_Y * 2.0);
    }

    #[test]
    fn layout_is_deterministic() {
        let mut config = MapConfig::default();
        config.labels.insert(
            "2".to_string(),
            LabelCfg {
                side: Some(Side::Bottom),
                angle_deg: Some(30.0),
                ..LabelCfg::default()
            },
        );
        let cents = [centroid("1", 120.0, 80.0), centroid("2", 700.0, 420.0)];
        let a = compute_label_nodes(&cents, &config, &measure());
        let b = compute_label_nodes(&cents, &config, &measure());
        assert_eq!(a, b);
    }

    #[test]
    fn nodes_respect_clamp_invariant() {
        let mut config = MapConfig::default();
        // A centroid far outside the canvas must still land inside it.
        config.labels.insert(
            "far".to_string(),
            LabelCfg {
                v: Some(5000.0),
                ..LabelCfg::default()
            },
        );
        let nodes = compute_label_nodes(&[centroid("far", 3990.0, 3990.0)], &config, &measure());
        let node = &nodes[0];
        let hw = (node.w + LABEL_CLAMP_EXTRA_W) / 2.0 + CLAMP_MARGIN;
        let hh = (node.h + LABEL_CLAMP_EXTRA_H) / 2.0 + CLAMP_MARGIN;
        assert!(node.x >= hw && node.x <= config.view_w - hw);
        assert!(node.y >= hh && node.y <= config.view_h - hh);
    }
}
