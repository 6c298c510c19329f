//! Error types for catalog filters.

use std::path::PathBuf;

use thiserror::Error;

/// The only error a filter parse can produce.
///
/// It carries no position or reason: callers branch on success or failure
/// and show a generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid query")]
pub struct InvalidQuery;

/// Errors raised around the parser: key registry, configuration, record loading.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A filter key that cannot appear in a query.
    #[error("Invalid filter key: '{0}'. Keys must be non-empty and use only letters, digits, '_', '-' or '.'")]
    InvalidKey(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be read.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML configuration.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON records.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an IO error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for filter operations outside the parser.
pub type FilterResult<T> = Result<T, FilterError>;
