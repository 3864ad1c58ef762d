//! Region data: the input datum, path-data bounding boxes, centroid
//! derivation, and locale-aware name resolution.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    Parse(String),
    #[error("region {key} has no drawable path data")]
    InvalidPath { key: String },
}

/// One region as supplied by the host. Immutable per render pass. Unknown
/// fields are retained so custom render hooks can read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionDatum {
    /// Unique id within the active region set.
    pub key: String,
    /// SVG path data for the region shape.
    pub d: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Geometric center of a region's bounding box. Ephemeral: recomputed on
/// every layout pass, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    pub key: String,
    pub cx: f32,
    pub cy: f32,
    pub name: String,
    pub value: Option<f64>,
}

/// External translation table: region key -> locale code -> display name.
pub type NameTable = BTreeMap<String, BTreeMap<String, String>>;

/// Display name fallback chain: explicit datum name, then the translation
/// table for the configured locale, then the region key.
pub fn resolve_name(datum: &RegionDatum, names: Option<&NameTable>, locale: Option<&str>) -> String {
    if let Some(name) = &datum.name
        && !name.is_empty()
    {
        return name.clone();
    }
    if let (Some(table), Some(locale)) = (names, locale)
        && let Some(by_locale) = table.get(&datum.key)
        && let Some(name) = by_locale.get(locale)
    {
        return name.clone();
    }
    datum.key.clone()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

// Path tokens: a command letter or a number. 'e'/'E' are excluded from the
// letter class so exponents stay attached to their number.
static PATH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-df-zA-DF-Z]|[-+]?(?:\d*\.\d+|\d+\.?)(?:[eE][-+]?\d+)?").unwrap()
});

enum Token {
    Cmd(char),
    Num(f32),
}

fn tokenize_path(d: &str) -> Vec<Token> {
    PATH_TOKEN
        .find_iter(d)
        .filter_map(|m| {
            let s = m.as_str();
            let c = s.chars().next()?;
            if s.len() == 1 && c.is_ascii_alphabetic() {
                Some(Token::Cmd(c))
            } else {
                s.parse::<f32>().ok().map(Token::Num)
            }
        })
        .collect()
}

/// Bounding box of SVG path data. Control points of curve segments are
/// included in the box (conservative: the box may exceed the tight curve
/// bounds); arc segments contribute their endpoints. Returns `None` when no
/// coordinates are present.
pub fn path_bbox(d: &str) -> Option<BBox> {
    let tokens = tokenize_path(d);
    let mut nums: Vec<f32> = Vec::new();
    let mut cmds: Vec<(char, Vec<f32>)> = Vec::new();
    let mut current: Option<char> = None;

    for token in tokens {
        match token {
            Token::Cmd(c) => {
                if let Some(cmd) = current.take() {
                    cmds.push((cmd, std::mem::take(&mut nums)));
                }
                current = Some(c);
            }
            Token::Num(n) => nums.push(n),
        }
    }
    if let Some(cmd) = current {
        cmds.push((cmd, nums));
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    let mut cur = (0.0f32, 0.0f32);
    let mut start = (0.0f32, 0.0f32);
    let mut seen = false;

    let mut include = |p: (f32, f32)| {
        min_x = min_x.min(p.0);
        min_y = min_y.min(p.1);
        max_x = max_x.max(p.0);
        max_y = max_y.max(p.1);
    };

    for (cmd, args) in cmds {
        let rel = cmd.is_ascii_lowercase();
        match cmd.to_ascii_uppercase() {
            'M' => {
                for (i, pair) in args.chunks_exact(2).enumerate() {
                    let p = if rel {
                        (cur.0 + pair[0], cur.1 + pair[1])
                    } else {
                        (pair[0], pair[1])
                    };
                    cur = p;
                    if i == 0 {
                        start = p;
                    }
                    include(p);
                    seen = true;
                }
            }
            'L' | 'T' => {
                for pair in args.chunks_exact(2) {
                    cur = if rel {
                        (cur.0 + pair[0], cur.1 + pair[1])
                    } else {
                        (pair[0], pair[1])
                    };
                    include(cur);
                    seen = true;
                }
            }
            'H' => {
                for x in &args {
                    cur.0 = if rel { cur.0 + x } else { *x };
                    include(cur);
                    seen = true;
                }
            }
            'V' => {
                for y in &args {
                    cur.1 = if rel { cur.1 + y } else { *y };
                    include(cur);
                    seen = true;
                }
            }
            'C' => {
                for seg in args.chunks_exact(6) {
                    let base = if rel { cur } else { (0.0, 0.0) };
                    include((base.0 + seg[0], base.1 + seg[1]));
                    include((base.0 + seg[2], base.1 + seg[3]));
                    cur = (base.0 + seg[4], base.1 + seg[5]);
                    include(cur);
                    seen = true;
                }
            }
            'S' | 'Q' => {
                for seg in args.chunks_exact(4) {
                    let base = if rel { cur } else { (0.0, 0.0) };
                    include((base.0 + seg[0], base.1 + seg[1]));
                    cur = (base.0 + seg[2], base.1 + seg[3]);
                    include(cur);
                    seen = true;
                }
            }
            'A' => {
                for seg in args.chunks_exact(7) {
                    let base = if rel { cur } else { (0.0, 0.0) };
                    cur = (base.0 + seg[5], base.1 + seg[6]);
                    include(cur);
                    seen = true;
                }
            }
            'Z' => {
                cur = start;
            }
            _ => {}
        }
    }

    if !seen {
        return None;
    }
    Some(BBox {
        x: min_x,
        y: min_y,
        w: max_x - min_x,
        h: max_y - min_y,
    })
}

/// Centroid of one region, or `None` when its path data has no
/// coordinates.
pub fn centroid_of(
    datum: &RegionDatum,
    names: Option<&NameTable>,
    locale: Option<&str>,
) -> Option<Centroid> {
    let bbox = path_bbox(&datum.d)?;
    Some(Centroid {
        key: datum.key.clone(),
        cx: bbox.x + bbox.w * 0.5,
        cy: bbox.y + bbox.h * 0.5,
        name: resolve_name(datum, names, locale),
        value: datum.value,
    })
}

/// Centroids for a region set, in input order. Regions with unparseable
/// path data are skipped with a warning; no region ever aborts the pass.
pub fn centroids(
    regions: &[RegionDatum],
    names: Option<&NameTable>,
    locale: Option<&str>,
) -> Vec<Centroid> {
    regions
        .iter()
        .filter_map(|datum| {
            let centroid = centroid_of(datum, names, locale);
            if centroid.is_none() {
                tracing::warn!(key = %datum.key, "region path has no coordinates; skipping label");
            }
            centroid
        })
        .collect()
}

pub fn load_regions(path: &std::path::Path) -> Result<Vec<RegionDatum>, MapError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| MapError::Parse(e.to_string()))
}

pub fn load_name_table(path: &std::path::Path) -> Result<NameTable, MapError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| MapError::Parse(e.to_string()))
}
