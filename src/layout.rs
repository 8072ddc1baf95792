use crate::config::TypographySettings;
use crate::text_metrics::MeasureText;

/// One laid-out line: its raw text, baseline Y and effective width.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    pub text: String,
    pub y: f32,
    pub width: f32,
}

/// Geometric description shared by the preview and both exporters.
#[derive(Debug, Clone)]
pub struct Layout {
    pub lines: Vec<LineLayout>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub padding: f32,
    /// Cumulative X position of every character per line, present only when
    /// letter-spacing is nonzero (the raster exporter draws per character).
    pub char_offsets: Option<Vec<Vec<f32>>>,
}

/// Computes line positions and canvas dimensions for `text` under the given
/// typography. Never fails: degenerate input yields a minimal-but-valid
/// bounding box, and missing metrics fall back to a width heuristic.
pub fn compute_layout(
    text: &str,
    typography: &TypographySettings,
    font_family: &str,
    metrics: &dyn MeasureText,
) -> Layout {
    let font_size = typography.font_size;
    let line_height = typography.line_height;
    let spacing = typography.letter_spacing;
    let padding = (font_size * 0.8).max(30.0);

    let mut lines = Vec::new();
    let mut max_width = 0.0f32;
    for (index, raw) in split_lines(text).into_iter().enumerate() {
        let char_count = raw.chars().count();
        // Spacing sits between characters, never after the last one.
        let width = text_width(raw, font_size, font_family, metrics)
            + char_count.saturating_sub(1) as f32 * spacing;
        max_width = max_width.max(width);
        let y = padding + font_size + index as f32 * font_size * line_height;
        lines.push(LineLayout {
            text: raw.to_string(),
            y,
            width,
        });
    }

    let canvas_width = (max_width + padding * 2.0).ceil() as u32;
    let canvas_height =
        (lines.len() as f32 * font_size * line_height + padding * 2.0 + font_size * 0.5).ceil()
            as u32;

    let char_offsets = (spacing != 0.0).then(|| {
        lines
            .iter()
            .map(|line| {
                let mut offsets = Vec::with_capacity(line.text.chars().count());
                let mut x = padding;
                let mut buf = [0u8; 4];
                for ch in line.text.chars() {
                    offsets.push(x);
                    let glyph = ch.encode_utf8(&mut buf);
                    x += text_width(glyph, font_size, font_family, metrics) + spacing;
                }
                offsets
            })
            .collect()
    });

    Layout {
        lines,
        canvas_width,
        canvas_height,
        padding,
        char_offsets,
    }
}

/// Splits on line breaks and drops blank lines entirely; they are not
/// rendered as vertical gaps. Surviving lines keep their raw content.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}

pub(crate) fn text_width(
    text: &str,
    font_size: f32,
    font_family: &str,
    metrics: &dyn MeasureText,
) -> f32 {
    metrics
        .text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

// Coarse per-class advance factors for when no face can be resolved.
fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.31,
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' => 0.28,
        'f' | 'r' | 't' => 0.34,
        'm' | 'M' | 'w' | 'W' | '@' | '%' | '&' => 0.9,
        _ if ch.is_ascii() => 0.568,
        _ => 1.0,
    }
}
