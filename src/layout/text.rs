// Text measurement seam. The layout core only sees the `TextMeasure`
// trait; the font-backed implementation lives behind it so layout tests can
// run with a deterministic fake.

use super::Size;
use crate::text_metrics;

/// Vertical advance between stacked label lines, matching the renderer's
/// tspan `dy`.
pub const LINE_ADVANCE: f32 = 16.0;

pub trait TextMeasure {
    /// Bounding box of `lines` laid out as a vertical stack at the given
    /// font size and weight.
    fn measure_lines(&self, lines: &[String], font_size: f32, font_weight: u16) -> Size;
}

fn stack_height(line_count: usize, font_size: f32) -> f32 {
    if line_count == 0 {
        0.0
    } else {
        font_size + LINE_ADVANCE * (line_count - 1) as f32
    }
}

/// Measures through the system font database. Falls back to a per-character
/// estimate when no face resolves, so layout never fails on a bare system.
pub struct FontMeasure {
    font_family: String,
}

impl FontMeasure {
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
        }
    }
}

impl TextMeasure for FontMeasure {
    fn measure_lines(&self, lines: &[String], font_size: f32, font_weight: u16) -> Size {
        let mut w = 0.0f32;
        for line in lines {
            let measured =
                text_metrics::measure_text_width(line, font_size, &self.font_family, font_weight)
                    .unwrap_or_else(|| fallback_line_width(line, font_size));
            w = w.max(measured);
        }
        Size {
            w,
            h: stack_height(lines.len(), font_size),
        }
    }
}

fn fallback_line_width(line: &str, font_size: f32) -> f32 {
    line.chars().count() as f32 * font_size * 0.56
}

/// Fixed-advance measurement for tests and benches: every character is
/// `char_w` wide.
#[derive(Debug, Clone, Copy)]
pub struct FixedMeasure {
    pub char_w: f32,
}

impl FixedMeasure {
    pub fn new(char_w: f32) -> Self {
        Self { char_w }
    }
}

impl TextMeasure for FixedMeasure {
    fn measure_lines(&self, lines: &[String], font_size: f32, _font_weight: u16) -> Size {
        let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        Size {
            w: widest as f32 * self.char_w,
            h: stack_height(lines.len(), font_size),
        }
    }
}
