use crate::config::MapConfig;
use crate::layout::text::FontMeasure;
use crate::region::{load_name_table, load_regions};
use crate::render::{RenderOptions, render_svg, write_output_svg};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "chmap", version, about = "SVG choropleth map renderer with leader-line labels")]
pub struct Args {
    /// Region data JSON (array of {key, d, name?, value?}) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Map config JSON/JSON5 file (label placements, colors, stroke)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Name translation table JSON ({key: {locale: name}})
    #[arg(short = 'n', long = "names")]
    pub names: Option<PathBuf>,

    /// Locale for name lookup
    #[arg(short = 'l', long = "locale")]
    pub locale: Option<String>,

    /// Highlighted region key
    #[arg(short = 'a', long = "active")]
    pub active: Option<String>,

    /// Render region shapes only, without labels
    #[arg(long = "no-labels")]
    pub no_labels: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();

    let regions = if args.input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        serde_json::from_str(&buf)?
    } else {
        load_regions(&args.input)?
    };

    let mut config = MapConfig::load(args.config.as_deref())?;
    if args.locale.is_some() {
        config.locale = args.locale.clone();
    }
    if args.no_labels {
        config.show_labels = false;
    }

    let names = args
        .names
        .as_deref()
        .map(load_name_table)
        .transpose()?;

    let theme = Theme::default();
    let measure = FontMeasure::new(theme.font_family.clone());
    let options = RenderOptions {
        active_key: args.active.as_deref(),
        names: names.as_ref(),
        ..RenderOptions::default()
    };

    let svg = render_svg(&regions, &config, &theme, &measure, &options);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = args
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_png(&svg, output, &theme)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    crate::render::write_output_png(svg, output, theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!(
        "png output requires the 'png' feature (resvg/usvg)"
    ))
}
