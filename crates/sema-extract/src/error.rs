//! Error types for content extraction.

use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The declared extension is not in the supported set. This is a
    /// client error and is never retried.
    #[error("Unsupported file format: '{extension}'. Supported formats: pdf, txt, doc, docx, xls, xlsx, json")]
    UnsupportedFormat { extension: String },

    /// The bytes do not parse as the declared format (corrupt or
    /// truncated file).
    #[error("Malformed document: {message}")]
    Malformed { message: String },
}

impl ExtractError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        ExtractError::Malformed {
            message: message.into(),
        }
    }
}
