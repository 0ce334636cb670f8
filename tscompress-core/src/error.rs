//! Error types for tscompress

use thiserror::Error;

/// Result type alias for tscompress operations
pub type Result<T> = std::result::Result<T, TsError>;

/// tscompress error types
#[derive(Error, Debug)]
pub enum TsError {
    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input file or textual encoding
    #[error("Invalid format: {0}")]
    Format(String),

    /// Method name outside the supported set
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// An encode or decode step of a codec failed
    #[error("Codec error: {0}")]
    Codec(String),

    /// Decoded series differs from the original
    #[error("Verification failed for {method}: decoded series differs at sample {index}")]
    VerificationMismatch { method: String, index: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TsError {
    /// Check if error comes from malformed input
    pub fn is_format(&self) -> bool {
        matches!(self, TsError::Format(_))
    }

    /// Check if error is a round-trip mismatch
    pub fn is_mismatch(&self) -> bool {
        matches!(self, TsError::VerificationMismatch { .. })
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        TsError::Format(msg.into())
    }

    pub(crate) fn codec(msg: impl Into<String>) -> Self {
        TsError::Codec(msg.into())
    }
}
