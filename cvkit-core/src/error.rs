/*!
Error types for the CVKit core engine.
*/

use thiserror::Error;

/// Result type used throughout the CVKit core.
pub type Result<T> = std::result::Result<T, CvError>;

/// Errors that can occur while editing, persisting or exporting a résumé.
///
/// Field validation failures are not represented here: they live in a form's
/// error map and never travel as `Err`.
#[derive(Error, Debug)]
pub enum CvError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key-value substrate errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A string-keyed field lookup named a field the form does not have
    #[error("Unknown field '{field}' for {form} form")]
    UnknownField { form: &'static str, field: String },

    /// Export format that cannot be produced with the current setup
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Failure inside an export renderer
    #[error("Render error: {0}")]
    Render(String),

    /// Configuration or input validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CvError {
    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new unknown field error
    pub fn unknown_field<S: Into<String>>(form: &'static str, field: S) -> Self {
        Self::UnknownField {
            form,
            field: field.into(),
        }
    }

    /// Create a new unsupported format error
    pub fn unsupported_format<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(msg: S) -> Self {
        Self::Render(msg.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}
