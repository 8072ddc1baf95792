use std::path::Path;

use crate::error::SpecimenError;
use crate::text_metrics;

pub const DEFAULT_FONT_NAME: &str = "默认藏文字体";
pub const DEFAULT_FONT_FAMILY: &str = "Tibetan Machine Uni, Microsoft Himalaya, Jomolhari, DDC Uchen, Monlam Uni Sans Serif, Qomolangma-Uchen Sarchen, Qomolangma-Uchen Sarchung, Qomolangma-Edict, Qomolangma-Dunhuang, BabelStone Tibetan, Noto Sans Tibetan, serif";

/// A font available for preview and export. Never mutated after creation.
#[derive(Debug, Clone)]
pub enum FontAsset {
    /// The built-in fallback chain; nothing to embed, the host resolves it.
    Default { name: String, family_chain: String },
    /// A user-supplied binary. `data` is `None` for assets restored from a
    /// project file, where the binary is deliberately not persisted.
    Uploaded {
        name: String,
        family_chain: String,
        data: Option<Vec<u8>>,
    },
}

impl FontAsset {
    pub fn name(&self) -> &str {
        match self {
            Self::Default { name, .. } | Self::Uploaded { name, .. } => name,
        }
    }

    pub fn family_chain(&self) -> &str {
        match self {
            Self::Default { family_chain, .. } | Self::Uploaded { family_chain, .. } => {
                family_chain
            }
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default { .. })
    }

    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Default { .. } => None,
            Self::Uploaded { data, .. } => data.as_deref(),
        }
    }
}

/// Ordered collection of loaded fonts with a current selection.
///
/// Invariant: `current` is in bounds whenever `fonts` is non-empty. An empty
/// library means no preview or export is possible.
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    fonts: Vec<FontAsset>,
    current: usize,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A library seeded with the built-in default font, the state the
    /// application starts in.
    pub fn with_default() -> Self {
        let mut library = Self::new();
        library.fonts.push(FontAsset::Default {
            name: DEFAULT_FONT_NAME.to_string(),
            family_chain: DEFAULT_FONT_FAMILY.to_string(),
        });
        library
    }

    /// Loads a font file, validates it and makes it the current selection.
    /// On any failure the library is left unchanged.
    pub fn add_font_file(&mut self, path: &Path) -> Result<&FontAsset, SpecimenError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if !has_font_extension(path) {
            return Err(SpecimenError::InvalidFontFormat(file_name));
        }
        let bytes = std::fs::read(path)
            .map_err(|err| SpecimenError::FontLoadFailure(file_name.clone(), err.to_string()))?;
        let name = path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or(&file_name)
            .to_string();
        self.add_font_bytes(name, bytes)
    }

    /// Registers an in-memory font binary. The registered family (from the
    /// font's name table) becomes the asset's family chain; the display name
    /// stays caller-supplied. When registrations overlap, the last one to
    /// complete is the one the preview reflects.
    pub fn add_font_bytes(
        &mut self,
        name: String,
        bytes: Vec<u8>,
    ) -> Result<&FontAsset, SpecimenError> {
        ttf_parser::Face::parse(&bytes, 0)
            .map_err(|err| SpecimenError::FontLoadFailure(name.clone(), err.to_string()))?;
        let family_chain =
            text_metrics::register_font_bytes(bytes.clone()).unwrap_or_else(|| name.clone());
        self.fonts.push(FontAsset::Uploaded {
            name,
            family_chain,
            data: Some(bytes),
        });
        self.current = self.fonts.len() - 1;
        Ok(&self.fonts[self.current])
    }

    /// Re-creates the collection from project-file metadata. Uploaded fonts
    /// come back without their binaries until the user re-supplies them.
    pub fn restore_metadata<I>(records: I, current: usize) -> Self
    where
        I: IntoIterator<Item = (String, String, bool)>,
    {
        let fonts: Vec<FontAsset> = records
            .into_iter()
            .map(|(name, family_chain, is_default)| {
                if is_default {
                    FontAsset::Default { name, family_chain }
                } else {
                    FontAsset::Uploaded {
                        name,
                        family_chain,
                        data: None,
                    }
                }
            })
            .collect();
        let current = if fonts.is_empty() {
            0
        } else {
            current.min(fonts.len() - 1)
        };
        Self { fonts, current }
    }

    pub fn current(&self) -> Option<&FontAsset> {
        self.fonts.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn select(&mut self, index: usize) -> Result<(), SpecimenError> {
        if index >= self.fonts.len() {
            return Err(SpecimenError::MissingFont);
        }
        self.current = index;
        Ok(())
    }

    /// Moves the selection one step; out-of-range steps are ignored rather
    /// than wrapping, matching the preview navigation buttons.
    pub fn navigate(&mut self, step: isize) {
        if self.fonts.len() <= 1 {
            return;
        }
        let target = self.current as isize + step;
        if target < 0 || target >= self.fonts.len() as isize {
            return;
        }
        self.current = target as usize;
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FontAsset> {
        self.fonts.iter()
    }
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_library_starts_on_builtin_font() {
        let library = FontLibrary::with_default();
        let current = library.current().unwrap();
        assert!(current.is_default());
        assert_eq!(current.name(), DEFAULT_FONT_NAME);
        assert!(current.family_chain().ends_with("serif"));
        assert!(current.data().is_none());
    }

    #[test]
    fn rejects_non_font_extensions() {
        let mut library = FontLibrary::with_default();
        let err = library
            .add_font_file(&PathBuf::from("notes.txt"))
            .unwrap_err();
        assert!(matches!(err, SpecimenError::InvalidFontFormat(_)));
        // no state change on rejection
        assert_eq!(library.len(), 1);
        assert_eq!(library.current_index(), 0);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_font_extension(Path::new("a.TTF")));
        assert!(has_font_extension(Path::new("b.Otf")));
        assert!(!has_font_extension(Path::new("c.woff2")));
        assert!(!has_font_extension(Path::new("ttf")));
    }

    #[test]
    fn invalid_binary_leaves_library_unchanged() {
        let mut library = FontLibrary::with_default();
        let err = library
            .add_font_bytes("broken".to_string(), vec![0u8; 16])
            .unwrap_err();
        assert!(matches!(err, SpecimenError::FontLoadFailure(_, _)));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut library = FontLibrary::restore_metadata(
            [
                ("默认藏文字体".to_string(), "serif".to_string(), true),
                ("Custom".to_string(), "Custom".to_string(), false),
            ],
            1,
        );
        library.navigate(1);
        assert_eq!(library.current_index(), 1);
        library.navigate(-1);
        assert_eq!(library.current_index(), 0);
        library.navigate(-1);
        assert_eq!(library.current_index(), 0);
    }

    #[test]
    fn navigation_is_inert_with_single_font() {
        let mut library = FontLibrary::with_default();
        library.navigate(1);
        library.navigate(-1);
        assert_eq!(library.current_index(), 0);
    }

    #[test]
    fn restored_uploads_have_no_binary() {
        let library = FontLibrary::restore_metadata(
            [("Custom".to_string(), "Custom".to_string(), false)],
            0,
        );
        let font = library.current().unwrap();
        assert!(!font.is_default());
        assert!(font.data().is_none());
    }

    #[test]
    fn restore_clamps_out_of_range_index() {
        let library = FontLibrary::restore_metadata(
            [("默认藏文字体".to_string(), "serif".to_string(), true)],
            7,
        );
        assert_eq!(library.current_index(), 0);
    }

    #[test]
    fn select_out_of_bounds_is_an_error() {
        let mut library = FontLibrary::with_default();
        assert!(library.select(3).is_err());
        assert!(library.select(0).is_ok());
    }
}
