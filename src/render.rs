//! SVG assembly for the whole map: region layer, annotation layer (leader
//! lines and anchor dots), label layer. Every call produces the complete
//! document from scratch — there is no incremental patching across input
//! changes.

use std::path::Path;

use anyhow::Result;

use crate::config::{LABEL_FONT_SIZE, LABEL_FONT_WEIGHT, MapConfig};
use crate::layout::leader::{build_leader_path, leader_path_d};
use crate::layout::text::{LINE_ADVANCE, TextMeasure};
use crate::layout::{LabelNode, compute_layout};
use crate::region::{NameTable, RegionDatum};
use crate::theme::Theme;

/// Resolved per-path attribute overrides from the host's style hook. `None`
/// fields fall back to the instance defaults; `extra` entries are emitted
/// verbatim.
#[derive(Debug, Clone, Default)]
pub struct PathStyle {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f32>,
    pub extra: Vec<(String, String)>,
}

pub type GetPathStyle<'a> = &'a dyn Fn(&RegionDatum) -> PathStyle;
/// Custom label markup hook: returns SVG markup placed inside the label
/// group instead of the default box.
pub type LabelRender<'a> = &'a dyn Fn(&RegionDatum, &LabelNode) -> String;

#[derive(Default)]
pub struct RenderOptions<'a> {
    pub active_key: Option<&'a str>,
    pub names: Option<&'a NameTable>,
    pub get_path_style: Option<GetPathStyle<'a>>,
    pub label_render: Option<LabelRender<'a>>,
}

pub fn render_svg(
    regions: &[RegionDatum],
    config: &MapConfig,
    theme: &Theme,
    measure: &dyn TextMeasure,
    options: &RenderOptions,
) -> String {
    let colors = config.colors.resolve(theme);
    let stroke = config.stroke.resolve(theme);
    let leader_color = config.leader_color(theme);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{}\" width=\"100%\" height=\"100%\" preserveAspectRatio=\"xMidYMid meet\" role=\"img\" class=\"map-svg\">",
        theme.viewbox
    ));

    // Hover fill via a style rule: CSS rules outrank the fill presentation
    // attribute, and active regions keep their fill on hover.
    svg.push_str(&format!(
        "<style>.map-region:hover{{fill:{};}}.map-region-active:hover{{fill:{};}}</style>",
        escape_xml(&colors.hover),
        escape_xml(&colors.active)
    ));

    svg.push_str("<g class=\"regions\">");
    for region in regions {
        let is_active = options.active_key == Some(region.key.as_str());
        let custom = options.get_path_style.map(|f| f(region)).unwrap_or_default();
        let default_fill = if is_active { &colors.active } else { &colors.default };
        let fill = custom.fill.as_deref().unwrap_or(default_fill);
        let stroke_color = custom.stroke.as_deref().unwrap_or(&stroke.color);
        let stroke_width = custom.stroke_width.unwrap_or(stroke.width);
        let class = if is_active {
            "map-region region map-region-active"
        } else {
            "map-region region"
        };

        let mut extra = String::new();
        for (name, value) in &custom.extra {
            extra.push_str(&format!(" {}=\"{}\"", name, escape_xml(value)));
        }
        svg.push_str(&format!(
            "<path class=\"{}\" d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\" cursor=\"pointer\" data-key=\"{}\"{}/>",
            class,
            escape_xml(&region.d),
            escape_xml(fill),
            escape_xml(stroke_color),
            stroke_width,
            escape_xml(&region.key),
            extra
        ));
    }
    svg.push_str("</g>");

    if config.show_labels {
        let nodes = compute_layout(regions, config, options.names, measure);
        svg.push_str("<g class=\"annotations\">");
        for node in &nodes {
            let region = regions.iter().find(|r| r.key == node.key);
            render_annotation(&mut svg, node, region, config, theme, leader_color, options);
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn render_annotation(
    svg: &mut String,
    node: &LabelNode,
    region: Option<&RegionDatum>,
    config: &MapConfig,
    theme: &Theme,
    leader_color: &str,
    options: &RenderOptions,
) {
    svg.push_str("<g class=\"ann\">");

    let cfg = config.resolve_label(&node.key);
    let leader = build_leader_path(node, &cfg);
    svg.push_str(&format!(
        "<path class=\"leader\" fill=\"none\" stroke=\"{}\" stroke-dasharray=\"6 6\" stroke-linecap=\"round\" stroke-linejoin=\"round\" stroke-width=\"1.5\" d=\"{}\"/>",
        escape_xml(leader_color),
        leader_path_d(&leader)
    ));

    svg.push_str(&format!(
        "<circle cx=\"{}\" cy=\"{}\" r=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        node.dot.x,
        node.dot.y,
        escape_xml(&theme.dot_fill),
        escape_xml(&theme.dot_stroke)
    ));

    let is_active = options.active_key == Some(node.key.as_str());
    let class = if is_active { "label map-label-active" } else { "label" };
    svg.push_str(&format!("<g class=\"{}\" data-key=\"{}\">", class, escape_xml(&node.key)));

    let custom = options
        .label_render
        .and_then(|f| region.map(|r| f(r, node)));
    match custom {
        Some(markup) => svg.push_str(&markup),
        None => render_default_label(svg, node, theme),
    }

    svg.push_str("</g></g>");
}

fn render_default_label(svg: &mut String, node: &LabelNode, theme: &Theme) {
    let x = node.x - node.w * 0.5;
    let y = node.y - node.h * 0.5;
    svg.push_str(&format!(
        "<rect x=\"{x}\" y=\"{y}\" width=\"{}\" height=\"{}\" rx=\"6\" ry=\"6\" fill=\"{}\" fill-opacity=\"0.92\"/>",
        node.w,
        node.h,
        escape_xml(&theme.label_background)
    ));
    // Lines are centered vertically around node.y at the fixed advance.
    let count = node.lines.len() as f32;
    let first_y = node.y - LINE_ADVANCE * (count - 1.0) / 2.0;
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{first_y}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\">",
        node.x,
        escape_xml(&theme.font_family),
        LABEL_FONT_SIZE,
        LABEL_FONT_WEIGHT,
        escape_xml(&theme.label_text_color)
    ));
    for (i, line) in node.lines.iter().enumerate() {
        let dy = if i == 0 { 0.0 } else { LINE_ADVANCE };
        svg.push_str(&format!(
            "<tspan x=\"{}\" dy=\"{dy}\">{}</tspan>",
            node.x,
            escape_xml(line)
        ));
    }
    svg.push_str("</text>");
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(theme.map_w, theme.map_h)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
