use crate::config::{AnimationKind, ColorMode, Config};
use crate::error::SpecimenError;
use crate::font::{FontAsset, FontLibrary};
use crate::layout::compute_layout;
use crate::project::{load_project, serialize_project};
use crate::render::{render_svg, write_output_svg};
use crate::text_metrics::SystemMetrics;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "fsr", version, about = "Font specimen renderer (SVG/PNG/project export)")]
pub struct Args {
    /// Text to render; overrides --input and any project text
    #[arg(short = 't', long = "text")]
    pub text: Option<String>,

    /// Text file to render, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file or directory. SVG defaults to stdout; PNG and project
    /// exports fall back to their standard filenames.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Project JSON file to start the session from
    #[arg(short = 'c', long = "project")]
    pub project: Option<PathBuf>,

    /// Font file (.ttf/.otf) to load; repeatable, the last one becomes current
    #[arg(short = 'f', long = "font")]
    pub fonts: Vec<PathBuf>,

    /// Select the current font by index after loading
    #[arg(long = "font-index")]
    pub font_index: Option<usize>,

    /// Font size in pixels
    #[arg(long = "font-size")]
    pub font_size: Option<f32>,

    /// Line height multiplier
    #[arg(long = "line-height")]
    pub line_height: Option<f32>,

    /// Letter spacing in pixels (may be negative)
    #[arg(long = "letter-spacing", allow_negative_numbers = true)]
    pub letter_spacing: Option<f32>,

    /// Solid fill color as hex; selects solid mode
    #[arg(long = "color")]
    pub color: Option<String>,

    /// Gradient fill as 'START,END' hex pair; selects gradient mode
    #[arg(long = "gradient")]
    pub gradient: Option<String>,

    /// Gradient direction in degrees
    #[arg(long = "gradient-angle")]
    pub gradient_angle: Option<u32>,

    /// Animation effect stored with the project
    #[arg(long = "animation", value_enum)]
    pub animation: Option<AnimationKind>,

    /// Animation duration in seconds
    #[arg(long = "animation-speed")]
    pub animation_speed: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Project,
}

impl OutputFormat {
    fn default_file_name(self) -> &'static str {
        match self {
            Self::Svg => "字体效果.svg",
            Self::Png => "字体效果.png",
            Self::Project => "藏文字体预览项目.json",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let (mut library, mut config) = load_project(args.project.as_deref())?;

    for path in &args.fonts {
        let font = library.add_font_file(path)?;
        eprintln!("loaded font '{}'", font.name());
    }
    if let Some(index) = args.font_index {
        library
            .select(index)
            .map_err(|_| anyhow::anyhow!("font index {index} out of range (0..{})", library.len()))?;
    }

    apply_overrides(&mut config, &args)?;
    if let Some(text) = &args.text {
        config.text = text.clone();
    } else if let Some(path) = &args.input {
        config.text = read_input(path)?;
    }

    match args.output_format {
        OutputFormat::Svg => {
            let font = current_font(&library)?;
            let layout = compute_layout(
                config.preview_text(),
                &config.typography,
                font.family_chain(),
                &SystemMetrics,
            );
            let svg = render_svg(&layout, &config.color, font, &config.typography);
            let output = resolve_output(args.output.as_deref(), args.output_format);
            write_output_svg(&svg, output.as_deref())?;
            if let Some(path) = output {
                eprintln!("wrote {}", path.display());
            }
        }
        OutputFormat::Png => {
            #[cfg(feature = "png")]
            {
                let font = current_font(&library)?;
                let layout = compute_layout(
                    config.preview_text(),
                    &config.typography,
                    font.family_chain(),
                    &SystemMetrics,
                );
                let bytes = crate::raster::render_png(&layout, &config.color, font, &config.typography)?;
                let output = resolve_output(args.output.as_deref(), args.output_format)
                    .unwrap_or_else(|| PathBuf::from(args.output_format.default_file_name()));
                crate::raster::write_output_png(&bytes, &output)?;
                eprintln!("wrote {}", output.display());
            }
            #[cfg(not(feature = "png"))]
            anyhow::bail!("this build lacks the 'png' feature");
        }
        OutputFormat::Project => {
            let json = serialize_project(&library, &config)?;
            let output = resolve_output(args.output.as_deref(), args.output_format)
                .unwrap_or_else(|| PathBuf::from(args.output_format.default_file_name()));
            std::fs::write(&output, json)?;
            eprintln!("wrote {}", output.display());
        }
    }

    Ok(())
}

fn current_font(library: &FontLibrary) -> Result<&FontAsset> {
    library
        .current()
        .ok_or_else(|| SpecimenError::MissingFont.into())
}

fn apply_overrides(config: &mut Config, args: &Args) -> Result<()> {
    if let Some(font_size) = args.font_size {
        if !font_size.is_finite() || font_size <= 0.0 {
            anyhow::bail!("font size must be a positive number");
        }
        config.typography.font_size = font_size;
    }
    if let Some(line_height) = args.line_height {
        if !line_height.is_finite() || line_height <= 0.0 {
            anyhow::bail!("line height must be a positive number");
        }
        config.typography.line_height = line_height;
    }
    if let Some(letter_spacing) = args.letter_spacing {
        if !letter_spacing.is_finite() {
            anyhow::bail!("letter spacing must be a finite number");
        }
        config.typography.letter_spacing = letter_spacing;
    }
    if let Some(color) = &args.color {
        config.color.mode = ColorMode::Solid;
        config.color.solid = color.clone();
    }
    if let Some(gradient) = &args.gradient {
        let (start, end) = gradient
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("expected --gradient START,END (e.g. '#667eea,#764ba2')"))?;
        config.color.mode = ColorMode::Gradient;
        config.color.gradient.color_start = start.trim().to_string();
        config.color.gradient.color_end = end.trim().to_string();
    }
    if let Some(angle) = args.gradient_angle {
        config.color.gradient.angle_deg = angle;
    }
    if let Some(kind) = args.animation {
        config.animation.kind = kind;
    }
    if let Some(speed) = args.animation_speed {
        if !speed.is_finite() || speed <= 0.0 {
            anyhow::bail!("animation speed must be a positive number");
        }
        config.animation.speed_seconds = speed;
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// A directory output takes the format's standard filename; a bare SVG
/// export streams to stdout.
fn resolve_output(output: Option<&Path>, format: OutputFormat) -> Option<PathBuf> {
    match output {
        Some(path) if path.is_dir() => Some(path.join(format.default_file_name())),
        Some(path) => Some(path.to_path_buf()),
        None => match format {
            OutputFormat::Svg => None,
            OutputFormat::Png | OutputFormat::Project => {
                Some(PathBuf::from(format.default_file_name()))
            }
        },
    }
}
