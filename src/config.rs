//! Map configuration: label placement overrides, colors, stroke, and the
//! built-in fallback constants. Merge order is deterministic and explicit:
//! per-region override, then the caller's global override, then the
//! constants — no shared mutable tables.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::region::MapError;
use crate::theme::Theme;

/// Leader-line horizontal reach (dot -> elbow) when unset.
pub const DEFAULT_H: f32 = 55.0;
/// Elbow -> label distance when unset.
pub const DEFAULT_V: f32 = 85.0;
/// Primary direction angle in degrees when unset.
pub const DEFAULT_ANGLE: f32 = 0.0;
/// Free-direction turn relative to the primary angle when unset.
pub const DEFAULT_TURN: f32 = 90.0;

pub const LABEL_FONT_SIZE: f32 = 12.0;
pub const LABEL_FONT_WEIGHT: u16 = 700;
/// Horizontal / vertical padding added per side around measured text.
pub const LABEL_PAD_X: f32 = 10.0;
pub const LABEL_PAD_Y: f32 = 8.0;
/// Gap between the leader endpoint and the label box edge.
pub const LABEL_GAP: f32 = 12.0;
/// Extra box inflation applied before viewport clamping.
pub const LABEL_CLAMP_EXTRA_W: f32 = 20.0;
pub const LABEL_CLAMP_EXTRA_H: f32 = 16.0;

/// Extended canvas used for label clamping, larger than the visible map so
/// far-flung labels stay addressable.
pub const EXTENT_W: f32 = 4000.0;
pub const EXTENT_H: f32 = 4000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Left,
    Top,
    Bottom,
}

/// Per-region label placement overrides. Sparse: any absent field falls
/// through the merge chain. Field names match the host's JSON keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelCfg {
    pub side: Option<Side>,
    pub tilt_deg: Option<f32>,
    pub angle_deg: Option<f32>,
    pub turn_deg: Option<f32>,
    pub h: Option<f32>,
    pub v: Option<f32>,
    pub dot_dx: Option<f32>,
    pub dot_dy: Option<f32>,
}

/// A label configuration after the merge: every numeric field concrete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLabelCfg {
    pub side: Option<Side>,
    pub tilt_deg: f32,
    pub angle_deg: f32,
    pub turn_deg: f32,
    pub h: f32,
    pub v: f32,
    pub dot_dx: f32,
    pub dot_dy: f32,
}

impl Default for ResolvedLabelCfg {
    fn default() -> Self {
        Self {
            side: None,
            tilt_deg: 0.0,
            angle_deg: DEFAULT_ANGLE,
            turn_deg: DEFAULT_TURN,
            h: DEFAULT_H,
            v: DEFAULT_V,
            dot_dx: 0.0,
            dot_dy: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScheme {
    pub default: Option<String>,
    pub hover: Option<String>,
    pub active: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeConfig {
    pub color: Option<String>,
    pub width: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColors {
    pub default: String,
    pub hover: String,
    pub active: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStroke {
    pub color: String,
    pub width: f32,
}

impl ColorScheme {
    pub fn resolve(&self, theme: &Theme) -> ResolvedColors {
        ResolvedColors {
            default: self.default.clone().unwrap_or_else(|| theme.fill_color.clone()),
            hover: self.hover.clone().unwrap_or_else(|| theme.hover_color.clone()),
            active: self.active.clone().unwrap_or_else(|| theme.active_color.clone()),
        }
    }
}

impl StrokeConfig {
    pub fn resolve(&self, theme: &Theme) -> ResolvedStroke {
        ResolvedStroke {
            color: self.color.clone().unwrap_or_else(|| theme.stroke_color.clone()),
            width: self.width.unwrap_or(theme.stroke_width),
        }
    }
}

/// Immutable per-instance configuration handed to the layout engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    /// Per-region label overrides, keyed by region id. Entries for keys not
    /// in the active region set are ignored.
    pub labels: BTreeMap<String, LabelCfg>,
    /// Caller-supplied override applied to every region, between the
    /// per-region entry and the built-in constants.
    pub label_override: LabelCfg,
    pub colors: ColorScheme,
    pub stroke: StrokeConfig,
    pub leader_color: Option<String>,
    pub locale: Option<String>,
    pub show_labels: bool,
    pub view_w: f32,
    pub view_h: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            labels: BTreeMap::new(),
            label_override: LabelCfg::default(),
            colors: ColorScheme::default(),
            stroke: StrokeConfig::default(),
            leader_color: None,
            locale: None,
            show_labels: true,
            view_w: EXTENT_W,
            view_h: EXTENT_H,
        }
    }
}

impl MapConfig {
    /// Merge chain for one region: per-region entry, global override,
    /// built-in constant.
    pub fn resolve_label(&self, key: &str) -> ResolvedLabelCfg {
        let per = self.labels.get(key);
        let global = &self.label_override;

        fn pick<T: Copy>(per: Option<T>, global: Option<T>, fallback: T) -> T {
            per.or(global).unwrap_or(fallback)
        }

        ResolvedLabelCfg {
            side: per.and_then(|c| c.side).or(global.side),
            tilt_deg: pick(per.and_then(|c| c.tilt_deg), global.tilt_deg, 0.0),
            angle_deg: pick(per.and_then(|c| c.angle_deg), global.angle_deg, DEFAULT_ANGLE),
            turn_deg: pick(per.and_then(|c| c.turn_deg), global.turn_deg, DEFAULT_TURN),
            h: pick(per.and_then(|c| c.h), global.h, DEFAULT_H),
            v: pick(per.and_then(|c| c.v), global.v, DEFAULT_V),
            dot_dx: pick(per.and_then(|c| c.dot_dx), global.dot_dx, 0.0),
            dot_dy: pick(per.and_then(|c| c.dot_dy), global.dot_dy, 0.0),
        }
    }

    pub fn leader_color<'a>(&'a self, theme: &'a Theme) -> &'a str {
        self.leader_color.as_deref().unwrap_or(&theme.leader_color)
    }

    /// Loads a config file. JSON5 is accepted (trailing commas, comments),
    /// matching the host's hand-maintained label tables.
    pub fn load(path: Option<&Path>) -> Result<Self, MapError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)?;
        json5::from_str(&contents).map_err(|e| MapError::Parse(e.to_string()))
    }
}
