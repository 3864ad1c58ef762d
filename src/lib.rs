#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod feedback;
pub mod layout;
pub mod region;
pub mod render;
pub mod scene;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{LabelCfg, MapConfig, Side};
pub use layout::{LabelNode, compute_layout};
pub use region::RegionDatum;
pub use render::render_svg;
pub use theme::Theme;
