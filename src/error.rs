//! Error types for image decoding

use thiserror::Error;

/// Main error type for image operations
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Truncated stream: {0}")]
    Truncated(String),

    #[error("Invalid precision code: {0} (expected 4 or 8)")]
    InvalidPrecision(i32),

    #[error("Invalid plane code: {0} (expected 0, 1 or 2)")]
    InvalidPlane(i32),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Unknown mode code {code} for {kind} images")]
    UnknownMode { code: i32, kind: String },

    #[error("Unknown quantity kind: {0}")]
    UnknownQuantityKind(String),

    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Specialized Result type for image operations
pub type Result<T> = std::result::Result<T, FormatError>;

impl From<std::io::Error> for FormatError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FormatError::Truncated(err.to_string())
        } else {
            FormatError::Io(err)
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        FormatError::Configuration(err.to_string())
    }
}
