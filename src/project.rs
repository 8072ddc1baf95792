use crate::config::{
    AnimationKind, AnimationSettings, ColorMode, ColorSettings, Config, GradientSettings,
    TypographySettings,
};
use crate::font::FontLibrary;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Font metadata as persisted in a project file. The binary is deliberately
/// excluded; the user re-supplies it on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontRecord {
    pub name: String,
    pub family: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(deserialize_with = "flexible_f32")]
    pub font_size: f32,
    #[serde(deserialize_with = "flexible_f32")]
    pub line_height: f32,
    #[serde(deserialize_with = "flexible_f32")]
    pub letter_spacing: f32,
    pub text: String,
    pub animation_type: AnimationKind,
    pub animation_speed: f32,
    pub color_type: ColorMode,
    pub font_color: String,
    pub gradient_color1: String,
    pub gradient_color2: String,
    #[serde(deserialize_with = "flexible_angle")]
    pub gradient_direction: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    pub fonts: Vec<FontRecord>,
    pub current_font_index: usize,
    pub settings: ProjectSettings,
    pub timestamp: DateTime<Utc>,
}

impl ProjectFile {
    /// Reconstructs the configuration model. Uploaded fonts come back
    /// without their binaries, per the save-file contract.
    pub fn restore(&self) -> (FontLibrary, Config) {
        let library = FontLibrary::restore_metadata(
            self.fonts
                .iter()
                .map(|font| (font.name.clone(), font.family.clone(), font.is_default)),
            self.current_font_index,
        );
        let settings = &self.settings;
        let config = Config {
            text: settings.text.clone(),
            typography: TypographySettings {
                font_size: settings.font_size,
                line_height: settings.line_height,
                letter_spacing: settings.letter_spacing,
            },
            color: ColorSettings {
                mode: settings.color_type,
                solid: settings.font_color.clone(),
                gradient: GradientSettings {
                    color_start: settings.gradient_color1.clone(),
                    color_end: settings.gradient_color2.clone(),
                    angle_deg: settings.gradient_direction,
                },
            },
            animation: AnimationSettings {
                kind: settings.animation_type,
                speed_seconds: settings.animation_speed,
            },
        };
        (library, config)
    }
}

/// Snapshots the current session into the project-file shape.
pub fn snapshot(library: &FontLibrary, config: &Config, timestamp: DateTime<Utc>) -> ProjectFile {
    ProjectFile {
        fonts: library
            .iter()
            .map(|font| FontRecord {
                name: font.name().to_string(),
                family: font.family_chain().to_string(),
                is_default: font.is_default(),
            })
            .collect(),
        current_font_index: library.current_index(),
        settings: ProjectSettings {
            font_size: config.typography.font_size,
            line_height: config.typography.line_height,
            letter_spacing: config.typography.letter_spacing,
            text: config.text.clone(),
            animation_type: config.animation.kind,
            animation_speed: config.animation.speed_seconds,
            color_type: config.color.mode,
            font_color: config.color.solid.clone(),
            gradient_color1: config.color.gradient.color_start.clone(),
            gradient_color2: config.color.gradient.color_end.clone(),
            gradient_direction: config.color.gradient.angle_deg,
        },
        timestamp,
    }
}

pub fn serialize_project(library: &FontLibrary, config: &Config) -> Result<String> {
    let project = snapshot(library, config, Utc::now());
    Ok(serde_json::to_string_pretty(&project)?)
}

pub fn deserialize_project(json: &str) -> serde_json::Result<ProjectFile> {
    serde_json::from_str(json)
}

/// Loads a project file, or the default session when no path is given.
pub fn load_project(path: Option<&Path>) -> Result<(FontLibrary, Config)> {
    let Some(path) = path else {
        return Ok((FontLibrary::with_default(), Config::default()));
    };
    let contents = std::fs::read_to_string(path)?;
    let project = deserialize_project(&contents)?;
    Ok(project.restore())
}

// The original tool saved typography values as raw input strings; accept
// both that legacy shape and plain numbers.
fn flexible_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f32),
        String(String),
    }
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(value) => value
            .trim()
            .parse::<f32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid number '{value}'"))),
    }
}

// Legacy files store the direction as a CSS token like "135deg".
fn flexible_angle<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AngleValue {
        Number(u32),
        String(String),
    }
    match AngleValue::deserialize(deserializer)? {
        AngleValue::Number(value) => Ok(value),
        AngleValue::String(value) => value
            .trim()
            .trim_end_matches("deg")
            .parse::<u32>()
            .map_err(|_| serde::de::Error::custom(format!("invalid angle '{value}'"))),
    }
}
