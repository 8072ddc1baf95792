use crate::config::{ColorMode, ColorSettings};

/// Coordinate convention of the consumer asking for a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpace {
    /// Percentage-based `x1/y1/x2/y2` gradient endpoints.
    Svg,
    /// Literal pixel endpoints scaled to the canvas.
    Raster,
}

/// A paint specification resolved for one target space. Gradients always
/// carry two stops, at offsets 0 and 1.
#[derive(Debug, Clone, PartialEq)]
pub enum FillSpec {
    Solid(String),
    SvgGradient {
        x1: &'static str,
        y1: &'static str,
        x2: &'static str,
        y2: &'static str,
        start: String,
        end: String,
    },
    RasterGradient {
        from: (f32, f32),
        to: (f32, f32),
        start: String,
        end: String,
    },
}

/// Maps the color configuration to a fill usable by the requested target.
/// Solid colors pass through verbatim. Gradient directions outside the
/// canonical set snap to the 135° diagonal rather than erroring.
pub fn resolve_fill(color: &ColorSettings, target: TargetSpace, width: f32, height: f32) -> FillSpec {
    match color.mode {
        ColorMode::Solid => FillSpec::Solid(color.solid.clone()),
        ColorMode::Gradient => {
            let gradient = &color.gradient;
            match target {
                TargetSpace::Svg => {
                    let (x1, y1, x2, y2) = svg_gradient_coords(gradient.angle_deg);
                    FillSpec::SvgGradient {
                        x1,
                        y1,
                        x2,
                        y2,
                        start: gradient.color_start.clone(),
                        end: gradient.color_end.clone(),
                    }
                }
                TargetSpace::Raster => {
                    let (from, to) = pixel_gradient_line(gradient.angle_deg, width, height);
                    FillSpec::RasterGradient {
                        from,
                        to,
                        start: gradient.color_start.clone(),
                        end: gradient.color_end.clone(),
                    }
                }
            }
        }
    }
}

/// Percentage endpoints for the canonical directions; everything else takes
/// the 135° top-left to bottom-right diagonal.
pub fn svg_gradient_coords(angle_deg: u32) -> (&'static str, &'static str, &'static str, &'static str) {
    match angle_deg {
        0 => ("0%", "0%", "100%", "0%"),
        45 => ("0%", "100%", "100%", "0%"),
        90 => ("0%", "100%", "0%", "0%"),
        180 => ("100%", "0%", "0%", "0%"),
        270 => ("0%", "0%", "0%", "100%"),
        _ => ("0%", "0%", "100%", "100%"),
    }
}

/// Pixel-space endpoints for the same direction set, scaled to the canvas.
pub fn pixel_gradient_line(angle_deg: u32, width: f32, height: f32) -> ((f32, f32), (f32, f32)) {
    match angle_deg {
        0 => ((0.0, 0.0), (width, 0.0)),
        45 => ((0.0, height), (width, 0.0)),
        90 => ((0.0, height), (0.0, 0.0)),
        180 => ((width, 0.0), (0.0, 0.0)),
        270 => ((0.0, 0.0), (0.0, height)),
        _ => ((0.0, 0.0), (width, height)),
    }
}

/// Parses `#rgb` or `#rrggbb` into RGB components.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    match digits.len() {
        3 => {
            let mut out = [0u8; 3];
            for (slot, ch) in out.iter_mut().zip(digits.chars()) {
                let nibble = ch.to_digit(16)? as u8;
                *slot = nibble << 4 | nibble;
            }
            Some((out[0], out[1], out[2]))
        }
        6 => {
            let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
            let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
            let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
            Some((r, g, b))
        }
        _ => None,
    }
}
