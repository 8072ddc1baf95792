use crate::color::{FillSpec, TargetSpace, resolve_fill};
use crate::config::{ColorSettings, TypographySettings};
use crate::font::FontAsset;
use crate::layout::Layout;
use anyhow::Result;
use base64::Engine as _;
use std::path::Path;

/// Serializes a layout into a self-contained SVG document. Pure string
/// assembly; the only binary work is base64-inlining an uploaded font.
pub fn render_svg(
    layout: &Layout,
    color: &ColorSettings,
    font: &FontAsset,
    typography: &TypographySettings,
) -> String {
    let width = layout.canvas_width;
    let height = layout.canvas_height;
    let fill = resolve_fill(color, TargetSpace::Svg, width as f32, height as f32);

    let mut svg = String::new();
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg width=\"{width}\" height=\"{height}\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\">"
    ));

    svg.push_str("<defs>");
    // The default font relies on system availability; restored uploads carry
    // no binary, so only live uploads get embedded.
    if let Some(data) = font.data() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        let family = escape_css_quotes(font.name());
        svg.push_str(&format!(
            "<style type=\"text/css\">@font-face {{ font-family: '{family}'; src: url(data:font/ttf;base64,{encoded}); font-weight: normal; font-style: normal; }}</style>"
        ));
    }
    if let FillSpec::SvgGradient {
        x1,
        y1,
        x2,
        y2,
        start,
        end,
    } = &fill
    {
        svg.push_str(&format!(
            "<linearGradient id=\"textGradient\" x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\"><stop offset=\"0%\" stop-color=\"{start}\"/><stop offset=\"100%\" stop-color=\"{end}\"/></linearGradient>"
        ));
    }
    svg.push_str("</defs>");

    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>");

    let fill_attr = match &fill {
        FillSpec::Solid(hex) => hex.clone(),
        _ => "url(#textGradient)".to_string(),
    };
    let family_attr = svg_font_family(font);
    for line in &layout.lines {
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}px\" letter-spacing=\"{}px\" fill=\"{}\" dominant-baseline=\"alphabetic\">{}</text>",
            layout.padding,
            line.y,
            family_attr,
            typography.font_size,
            typography.letter_spacing,
            fill_attr,
            escape_xml(&line.text)
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// The default chain is emitted as-is with double quotes downgraded; an
/// uploaded font is referenced by its single-quoted name.
fn svg_font_family(font: &FontAsset) -> String {
    if font.is_default() {
        font.family_chain().replace('"', "'")
    } else {
        format!("'{}'", escape_css_quotes(font.name()))
    }
}

fn escape_css_quotes(name: &str) -> String {
    name.replace('\'', "\\'")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, Config, GradientSettings};
    use crate::font::{FontAsset, FontLibrary};
    use crate::layout::compute_layout;
    use crate::text_metrics::MeasureText;

    struct FixedMetrics;

    impl MeasureText for FixedMetrics {
        fn text_width(&self, text: &str, _font_size: f32, _font_family: &str) -> Option<f32> {
            Some(text.chars().count() as f32 * 10.0)
        }
    }

    fn render(config: &Config, font: &FontAsset) -> String {
        let layout = compute_layout(
            config.preview_text(),
            &config.typography,
            font.family_chain(),
            &FixedMetrics,
        );
        render_svg(&layout, &config.color, font, &config.typography)
    }

    #[test]
    fn solid_export_has_one_text_element_and_no_gradient() {
        let library = FontLibrary::with_default();
        let font = library.current().unwrap();
        let config = Config {
            text: "test".to_string(),
            ..Config::default()
        };
        let svg = render(&config, font);
        assert_eq!(svg.matches("<text ").count(), 1);
        assert!(svg.contains("fill=\"#2d3748\""));
        assert!(!svg.contains("<linearGradient"));
        assert!(svg.contains("font-size=\"48px\""));
        assert!(svg.contains("letter-spacing=\"0px\""));
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"white\"/>"));
    }

    #[test]
    fn gradient_export_references_the_gradient_def() {
        let library = FontLibrary::with_default();
        let font = library.current().unwrap();
        let mut config = Config {
            text: "test".to_string(),
            ..Config::default()
        };
        config.color.mode = ColorMode::Gradient;
        config.color.gradient = GradientSettings {
            color_start: "#667eea".to_string(),
            color_end: "#764ba2".to_string(),
            angle_deg: 135,
        };
        let svg = render(&config, font);
        assert!(svg.contains(
            "<linearGradient id=\"textGradient\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"100%\">"
        ));
        assert!(svg.contains("stop-color=\"#667eea\""));
        assert!(svg.contains("stop-color=\"#764ba2\""));
        assert!(svg.contains("fill=\"url(#textGradient)\""));
    }

    #[test]
    fn text_content_is_xml_escaped() {
        let library = FontLibrary::with_default();
        let font = library.current().unwrap();
        let config = Config {
            text: "a<b & \"c\"".to_string(),
            ..Config::default()
        };
        let svg = render(&config, font);
        assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
        let body = svg.split("dominant-baseline=\"alphabetic\">").nth(1).unwrap();
        let content = body.split("</text>").next().unwrap();
        assert!(!content.contains('<'));
        assert!(!content.contains('"'));
        // every '&' left is the start of an entity
        for (idx, _) in content.match_indices('&') {
            assert!(content[idx..].starts_with("&amp;")
                || content[idx..].starts_with("&lt;")
                || content[idx..].starts_with("&gt;")
                || content[idx..].starts_with("&quot;")
                || content[idx..].starts_with("&apos;"));
        }
    }

    #[test]
    fn default_font_is_not_embedded() {
        let library = FontLibrary::with_default();
        let font = library.current().unwrap();
        let config = Config::default();
        let svg = render(&config, font);
        assert!(!svg.contains("@font-face"));
        assert!(svg.contains("Tibetan Machine Uni"));
    }

    #[test]
    fn uploaded_font_is_embedded_as_data_uri() {
        let font = FontAsset::Uploaded {
            name: "MyFont".to_string(),
            family_chain: "MyFont".to_string(),
            data: Some(vec![1, 2, 3]),
        };
        let config = Config {
            text: "x".to_string(),
            ..Config::default()
        };
        let svg = render(&config, &font);
        assert!(svg.contains("@font-face"));
        assert!(svg.contains("font-family: 'MyFont'"));
        assert!(svg.contains("data:font/ttf;base64,AQID"));
        assert!(svg.contains("font-family=\"'MyFont'\""));
    }

    #[test]
    fn restored_upload_without_binary_skips_embedding() {
        let font = FontAsset::Uploaded {
            name: "MyFont".to_string(),
            family_chain: "MyFont".to_string(),
            data: None,
        };
        let config = Config::default();
        let svg = render(&config, &font);
        assert!(!svg.contains("@font-face"));
        assert!(svg.contains("font-family=\"'MyFont'\""));
    }

    #[test]
    fn single_quotes_in_font_names_are_escaped() {
        let font = FontAsset::Uploaded {
            name: "O'Brien".to_string(),
            family_chain: "O'Brien".to_string(),
            data: Some(vec![0]),
        };
        let config = Config::default();
        let svg = render(&config, &font);
        assert!(svg.contains("font-family: 'O\\'Brien'"));
        assert!(svg.contains("font-family=\"'O\\'Brien'\""));
    }

    #[test]
    fn one_text_element_per_layout_line() {
        let library = FontLibrary::with_default();
        let font = library.current().unwrap();
        let config = Config {
            text: "first\n\nsecond\nthird".to_string(),
            ..Config::default()
        };
        let svg = render(&config, font);
        assert_eq!(svg.matches("<text ").count(), 3);
    }
}
