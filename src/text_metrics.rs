//! Font-backed text width measurement used by the synthetic label
//! estimate. Faces are resolved once per (family, weight) through fontdb
//! and advance widths are cached per character.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Width of `text` at `font_size`, or `None` when no matching face can be
/// resolved on this system.
pub fn measure_text_width(
    text: &str,
    font_size: f32,
    font_family: &str,
    font_weight: u16,
) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, font_weight)
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, u16), Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(
        &mut self,
        text: &str,
        font_size: f32,
        font_family: &str,
        font_weight: u16,
    ) -> Option<f32> {
        let key = (normalize_family_key(font_family), font_weight);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family, font_weight);
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        let normalized = text.replace('\t', "    ");
        Some(face.measure_width(&normalized, font_size))
    }

    fn load_face(&mut self, font_family: &str, font_weight: u16) -> Option<FontFace> {
        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Option<Family<'static>>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Some(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    generics.push(Some(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => generics.push(Some(Family::Monospace)),
                "cursive" => generics.push(Some(Family::Cursive)),
                "fantasy" => generics.push(Some(Family::Fantasy)),
                _ => {
                    names.push(raw.to_string());
                    generics.push(None);
                }
            }
        }

        let mut families: Vec<Family<'_>> = Vec::with_capacity(generics.len().max(1));
        let mut name_iter = names.iter();
        for generic in &generics {
            match generic {
                Some(family) => families.push(*family),
                None => {
                    if let Some(name) = name_iter.next() {
                        families.push(Family::Name(name.as_str()));
                    }
                }
            }
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight(font_weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            loaded = FontFace::new(data.to_vec(), index);
        });
        loaded
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let mut width = 0.0f32;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                let a = self.ascii_advances[ch as usize];
                if a == 0 { None } else { Some(a) }
            } else {
                self.non_ascii_advance(ch)
            };
            width += match advance {
                Some(units) => units as f32 * scale,
                None => fallback,
            };
        }
        width.max(0.0)
    }

    // Non-ASCII glyphs re-parse the face lazily and cache the result.
    fn non_ascii_advance(&mut self, ch: char) -> Option<u16> {
        if let Some(cached) = self.advance_cache.get(&ch) {
            return *cached;
        }
        let advance = Face::parse(&self.data, self.index)
            .ok()
            .and_then(|face| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
        self.advance_cache.insert(ch, advance);
        advance
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
