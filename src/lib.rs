#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod font;
pub mod layout;
pub mod project;
#[cfg(feature = "png")]
pub mod raster;
pub mod render;
pub mod text_metrics;

#[cfg(feature = "cli")]
pub use cli::run;
pub use color::{FillSpec, TargetSpace, resolve_fill};
pub use config::{
    AnimationKind, AnimationSettings, ColorMode, ColorSettings, Config, GradientSettings,
    PLACEHOLDER_TEXT, TypographySettings,
};
pub use error::SpecimenError;
pub use font::{FontAsset, FontLibrary};
pub use layout::{Layout, LineLayout, compute_layout};
pub use project::{ProjectFile, deserialize_project, load_project, serialize_project};
#[cfg(feature = "png")]
pub use raster::render_png;
pub use render::{render_svg, write_output_svg};
pub use text_metrics::{MeasureText, SystemMetrics};
