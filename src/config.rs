use serde::{Deserialize, Serialize};

/// Fallback sentence shown when the preview text is empty.
pub const PLACEHOLDER_TEXT: &str =
    "བོད་ཡིག་ཡིག་གཟུགས་ལྟ་ཞིབ་ཡོ་བྱད། འདི་ནི་བོད་ཡིག་ཡིག་གཟུགས་ལྟ་ཞིབ་བྱེད་པའི་ཡོ་བྱད་ཞིག་ཡིན།";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographySettings {
    /// Pixel size; must stay finite and strictly positive.
    pub font_size: f32,
    /// Unitless multiplier; must stay finite and strictly positive.
    pub line_height: f32,
    /// Pixels between adjacent characters; may be negative.
    pub letter_spacing: f32,
}

impl Default for TypographySettings {
    fn default() -> Self {
        Self {
            font_size: 48.0,
            line_height: 1.5,
            letter_spacing: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Solid,
    Gradient,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientSettings {
    pub color_start: String,
    pub color_end: String,
    pub angle_deg: u32,
}

impl Default for GradientSettings {
    fn default() -> Self {
        Self {
            color_start: "#667eea".to_string(),
            color_end: "#764ba2".to_string(),
            angle_deg: 135,
        }
    }
}

/// Both sub-structures stay populated regardless of the active mode, so
/// switching between solid and gradient never discards the other's values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSettings {
    pub mode: ColorMode,
    pub solid: String,
    pub gradient: GradientSettings,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            mode: ColorMode::Solid,
            solid: "#2d3748".to_string(),
            gradient: GradientSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "camelCase")]
pub enum AnimationKind {
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    FadeIn,
    ZoomIn,
    RotateIn,
    BounceIn,
    Typewriter,
    Wave,
    Glow,
    Shake,
}

impl AnimationKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SlideLeft => "左滑入场",
            Self::SlideRight => "右滑入场",
            Self::SlideUp => "上滑入场",
            Self::SlideDown => "下滑入场",
            Self::FadeIn => "淡入效果",
            Self::ZoomIn => "缩放入场",
            Self::RotateIn => "旋转入场",
            Self::BounceIn => "弹跳入场",
            Self::Typewriter => "打字机效果",
            Self::Wave => "波浪效果",
            Self::Glow => "发光效果",
            Self::Shake => "摇摆效果",
        }
    }
}

/// Preview-only presentation settings. Carried through the configuration and
/// project file but never consulted by the exporters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSettings {
    pub kind: AnimationKind,
    pub speed_seconds: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            kind: AnimationKind::SlideLeft,
            speed_seconds: 0.6,
        }
    }
}

/// The configuration model: pure data, owned by the application shell and
/// passed by reference into the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub text: String,
    pub typography: TypographySettings,
    pub color: ColorSettings,
    pub animation: AnimationSettings,
}

impl Config {
    /// The text the preview and exporters operate on. Empty input falls back
    /// to the built-in placeholder sentence.
    pub fn preview_text(&self) -> &str {
        if self.text.is_empty() {
            PLACEHOLDER_TEXT
        } else {
            &self.text
        }
    }
}
