use thiserror::Error;

/// Errors are terminal for the single requested operation only; the session
/// state (loaded fonts, settings) stays untouched by any failing path.
#[derive(Debug, Error)]
pub enum SpecimenError {
    #[error("unsupported font file '{0}': only .ttf and .otf files are accepted")]
    InvalidFontFormat(String),

    #[error("font '{0}' could not be loaded: {1}")]
    FontLoadFailure(String, String),

    #[error("no fonts loaded")]
    MissingFont,

    #[error("export failed: {0}")]
    ExportFailure(String),
}
