//! Error types for the core crate.

use thiserror::Error;

/// Maximum number of bytes of an offending document echoed into an error.
const MAX_DOCUMENT_DISPLAY_LEN: usize = 64;

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An encoding or decoding error occurred.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Document bytes could not be parsed at all.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A document path could not be parsed.
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    /// The number of attribute values does not match the configuration.
    #[error("expected {expected} attribute values, got {actual}")]
    ArityMismatch {
        /// Number of values the configuration declares.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// A validation error occurred.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Creates a malformed document error, echoing a truncated prefix of the input.
    #[must_use]
    pub fn malformed_document(document: &[u8], reason: impl std::fmt::Display) -> Self {
        let shown = &document[..document.len().min(MAX_DOCUMENT_DISPLAY_LEN)];
        let ellipsis = if document.len() > MAX_DOCUMENT_DISPLAY_LEN { "..." } else { "" };
        Self::MalformedDocument(format!(
            "{reason} (document: {}{ellipsis})",
            String::from_utf8_lossy(shown)
        ))
    }
}
