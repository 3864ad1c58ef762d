use serde::{Deserialize, Serialize};

/// Visual defaults for the map surface. Everything here can be overridden
/// per instance through [`crate::config::MapConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub fill_color: String,
    pub hover_color: String,
    pub active_color: String,
    pub stroke_color: String,
    pub stroke_width: f32,
    pub leader_color: String,
    pub dot_fill: String,
    pub dot_stroke: String,
    pub label_background: String,
    pub label_text_color: String,
    /// SVG viewBox, "minX minY width height".
    pub viewbox: String,
    /// Map dimensions at original scale.
    pub map_w: f32,
    pub map_h: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            fill_color: "#B2C3EE".to_string(),
            hover_color: "#819feb".to_string(),
            active_color: "#325ECD".to_string(),
            stroke_color: "#FFFFFF".to_string(),
            stroke_width: 2.0,
            leader_color: "#717C8C".to_string(),
            dot_fill: "#D85050".to_string(),
            dot_stroke: "#FFF".to_string(),
            label_background: "#FFFFFF".to_string(),
            label_text_color: "#1C2430".to_string(),
            viewbox: "40 10 890 600".to_string(),
            map_w: 1000.0,
            map_h: 519.0,
        }
    }
}
