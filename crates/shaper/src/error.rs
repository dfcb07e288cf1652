//! Error types for the shaping facade

use thiserror::Error;

/// Result type alias using [`ShapeError`]
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Errors that can occur while shaping or consolidating reports
#[derive(Debug, Error)]
pub enum ShapeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File-format error
    #[error(transparent)]
    Xlsx(#[from] shaper_xlsx::XlsxError),

    /// Grid-model error
    #[error(transparent)]
    Core(#[from] shaper_core::Error),

    /// A document with no sheets where one was expected
    #[error("No sheets in document: {0}")]
    EmptyDocument(String),

    /// Unsupported file extension
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}
