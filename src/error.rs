//! Error types for the media identifier.

use std::path::Path;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the media identifier.
#[derive(Error, Debug)]
pub enum Error {
    // Source errors
    #[error("Source '{source_id}' failed: {message}")]
    Source { source_id: String, message: String },

    #[error("Source '{source_id}' did not answer before the deadline")]
    SourceTimeout { source_id: String },

    // Store errors
    #[error("Store '{store_id}' failed: {message}")]
    Store { store_id: String, message: String },

    // Configuration errors
    #[error("Invalid configuration for {dir}: {message}")]
    Config { dir: String, message: String },

    #[error("Invalid rename pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create a source error.
    pub fn source_failed<S: Into<String>, M: Into<String>>(source_id: S, message: M) -> Self {
        Error::Source {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create a store error.
    pub fn store_failed<S: Into<String>, M: Into<String>>(store_id: S, message: M) -> Self {
        Error::Store {
            store_id: store_id.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error for a media directory.
    pub fn config<M: Into<String>>(dir: &Path, message: M) -> Self {
        Error::Config {
            dir: dir.display().to_string(),
            message: message.into(),
        }
    }

    /// Create a pattern error.
    pub fn pattern<P: Into<String>, M: Into<String>>(pattern: P, message: M) -> Self {
        Error::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from a metadata source (including timeouts).
    pub fn is_source_error(&self) -> bool {
        matches!(self, Error::Source { .. } | Error::SourceTimeout { .. })
    }
}
