use crate::color::{FillSpec, TargetSpace, parse_hex_color, resolve_fill};
use crate::config::{ColorSettings, TypographySettings};
use crate::error::SpecimenError;
use crate::font::FontAsset;
use crate::layout::Layout;
use crate::text_metrics;
use anyhow::Result;
use std::path::Path;
use tiny_skia::{
    Color, FillRule, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap, PixmapMut, Point,
    Shader, SpreadMode, Transform,
};
use ttf_parser::Face;

/// Draws the layout onto a pixel surface and encodes it as PNG bytes.
///
/// Missing faces degrade instead of failing: the system sans-serif stands in,
/// and if no face resolves at all the canvas stays blank but still encodes.
pub fn render_png(
    layout: &Layout,
    color: &ColorSettings,
    font: &FontAsset,
    typography: &TypographySettings,
) -> Result<Vec<u8>, SpecimenError> {
    let width = layout.canvas_width.max(1);
    let height = layout.canvas_height.max(1);
    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
        SpecimenError::ExportFailure(format!("could not allocate a {width}x{height} surface"))
    })?;
    pixmap.fill(Color::WHITE);

    let fill = resolve_fill(color, TargetSpace::Raster, width as f32, height as f32);
    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.shader = fill_shader(&fill)?;

    {
        let mut canvas = pixmap.as_mut();
        if !draw_lines(&mut canvas, layout, font.family_chain(), typography, &paint) {
            draw_lines(&mut canvas, layout, "sans-serif", typography, &paint);
        }
    }

    pixmap
        .encode_png()
        .map_err(|err| SpecimenError::ExportFailure(err.to_string()))
}

fn fill_shader(fill: &FillSpec) -> Result<Shader<'static>, SpecimenError> {
    match fill {
        FillSpec::Solid(hex) => Ok(Shader::SolidColor(hex_color(hex)?)),
        FillSpec::RasterGradient {
            from,
            to,
            start,
            end,
        } => {
            let start = hex_color(start)?;
            let end = hex_color(end)?;
            let shader = LinearGradient::new(
                Point::from_xy(from.0, from.1),
                Point::from_xy(to.0, to.1),
                vec![GradientStop::new(0.0, start), GradientStop::new(1.0, end)],
                SpreadMode::Pad,
                Transform::identity(),
            );
            // A degenerate gradient line (1x1 canvas) collapses to the start color.
            Ok(shader.unwrap_or(Shader::SolidColor(start)))
        }
        FillSpec::SvgGradient { start, .. } => Ok(Shader::SolidColor(hex_color(start)?)),
    }
}

fn hex_color(hex: &str) -> Result<Color, SpecimenError> {
    let (r, g, b) = parse_hex_color(hex)
        .ok_or_else(|| SpecimenError::ExportFailure(format!("invalid color '{hex}'")))?;
    Ok(Color::from_rgba8(r, g, b, 255))
}

fn draw_lines(
    canvas: &mut PixmapMut<'_>,
    layout: &Layout,
    family: &str,
    typography: &TypographySettings,
    paint: &Paint<'_>,
) -> bool {
    text_metrics::with_face(family, |face, units_per_em| {
        let font_size = typography.font_size;
        let scale = font_size / units_per_em as f32;
        for (index, line) in layout.lines.iter().enumerate() {
            match layout.char_offsets.as_ref().and_then(|all| all.get(index)) {
                // Nonzero letter-spacing: no bulk primitive supports it, so
                // each character lands at its precomputed offset.
                Some(offsets) => {
                    for (ch, &x) in line.text.chars().zip(offsets) {
                        draw_glyph(canvas, face, ch, scale, font_size, x, line.y, paint);
                    }
                }
                None => {
                    let mut x = layout.padding;
                    for ch in line.text.chars() {
                        x += draw_glyph(canvas, face, ch, scale, font_size, x, line.y, paint);
                    }
                }
            }
        }
    })
    .is_some()
}

/// Fills one glyph outline at `(x, y)` and returns its natural advance.
#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    canvas: &mut PixmapMut<'_>,
    face: &Face<'_>,
    ch: char,
    scale: f32,
    font_size: f32,
    x: f32,
    y: f32,
    paint: &Paint<'_>,
) -> f32 {
    let Some(glyph) = face.glyph_index(ch) else {
        return font_size * 0.56;
    };
    let advance = face
        .glyph_hor_advance(glyph)
        .map(|units| units as f32 * scale)
        .unwrap_or(font_size * 0.56);

    let mut sink = OutlineSink {
        builder: PathBuilder::new(),
    };
    // Outlines arrive in y-up design units; the transform scales to pixels,
    // flips Y and lands the origin on the baseline.
    if face.outline_glyph(glyph, &mut sink).is_some()
        && let Some(path) = sink.builder.finish()
        && let Some(path) = path.transform(Transform::from_row(scale, 0.0, 0.0, -scale, x, y))
    {
        canvas.fill_path(&path, paint, FillRule::Winding, Transform::identity(), None);
    }
    advance
}

struct OutlineSink {
    builder: PathBuilder,
}

impl ttf_parser::OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

pub fn write_output_png(bytes: &[u8], output: &Path) -> Result<()> {
    std::fs::write(output, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, Config};
    use crate::font::FontLibrary;
    use crate::layout::compute_layout;
    use crate::text_metrics::MeasureText;

    const PNG_MAGIC: [u8; 4] = [0x89, b'P', b'N', b'G'];

    struct FixedMetrics;

    impl MeasureText for FixedMetrics {
        fn text_width(&self, text: &str, _font_size: f32, _font_family: &str) -> Option<f32> {
            Some(text.chars().count() as f32 * 10.0)
        }
    }

    fn export(config: &Config) -> Result<Vec<u8>, SpecimenError> {
        let library = FontLibrary::with_default();
        let font = library.current().unwrap();
        let layout = compute_layout(
            config.preview_text(),
            &config.typography,
            font.family_chain(),
            &FixedMetrics,
        );
        render_png(&layout, &config.color, font, &config.typography)
    }

    #[test]
    fn solid_export_encodes_a_png() {
        let config = Config {
            text: "test".to_string(),
            ..Config::default()
        };
        let bytes = export(&config).unwrap();
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn gradient_export_encodes_a_png() {
        let mut config = Config {
            text: "test".to_string(),
            ..Config::default()
        };
        config.color.mode = ColorMode::Gradient;
        let bytes = export(&config).unwrap();
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn letter_spacing_path_draws_without_panicking() {
        let mut config = Config {
            text: "spaced out".to_string(),
            ..Config::default()
        };
        config.typography.letter_spacing = 4.0;
        let bytes = export(&config).unwrap();
        assert_eq!(&bytes[..4], &PNG_MAGIC);
    }

    #[test]
    fn invalid_solid_color_is_an_export_failure() {
        let mut config = Config {
            text: "test".to_string(),
            ..Config::default()
        };
        config.color.solid = "not-a-color".to_string();
        let err = export(&config).unwrap_err();
        assert!(matches!(err, SpecimenError::ExportFailure(_)));
    }

    #[test]
    fn solid_shader_uses_the_configured_color() {
        let shader = fill_shader(&FillSpec::Solid("#2d3748".to_string())).unwrap();
        match shader {
            Shader::SolidColor(color) => {
                assert_eq!(color.to_color_u8().red(), 0x2d);
                assert_eq!(color.to_color_u8().green(), 0x37);
                assert_eq!(color.to_color_u8().blue(), 0x48);
            }
            _ => panic!("expected solid shader"),
        }
    }

    #[test]
    fn degenerate_gradient_line_collapses_to_start_color() {
        let fill = FillSpec::RasterGradient {
            from: (0.0, 0.0),
            to: (0.0, 0.0),
            start: "#667eea".to_string(),
            end: "#764ba2".to_string(),
        };
        match fill_shader(&fill).unwrap() {
            Shader::SolidColor(color) => assert_eq!(color.to_color_u8().red(), 0x66),
            _ => panic!("expected start-color fallback"),
        }
    }
}
