//! Centralized error types for sparkpayload.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the sparkpayload library.
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The message has no `to` or `cc` address. Bcc-only messages land here too.
    #[error("Cannot send message without a recipient address")]
    NoRecipient,

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A message description file could not be understood.
    #[error("Invalid message file '{path}': {reason}")]
    InvalidMessage { path: PathBuf, reason: String },

    /// A raw RFC 5322 message could not be parsed.
    #[error("EML parse error: {0}")]
    Eml(String),

    /// The payload could not be serialized to JSON.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, PayloadError>`.
pub type Result<T> = std::result::Result<T, PayloadError>;

impl PayloadError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// A `NotFound` error becomes [`PayloadError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::Io { path, source }
        }
    }

    /// Create an `InvalidMessage` variant.
    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMessage {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
