//! Error types for GameScore.
//!
//! Library crates use [`GameScoreError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all GameScore operations.
#[derive(Debug, thiserror::Error)]
pub enum GameScoreError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching the listing or a detail page.
    #[error("network error: {0}")]
    Network(String),

    /// The detail site answered 403. Halts the whole run.
    #[error(
        "access denied (HTTP 403) at {url}: the server doesn't authorize traffic, \
         wait a few minutes and run again"
    )]
    AccessDenied { url: String },

    /// HTML parsing or selector error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Score cache read/write error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Spreadsheet report error.
    #[error("report error: {0}")]
    Report(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (duplicate cache key, invalid value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GameScoreError>;

impl GameScoreError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must stop the run immediately.
    pub fn is_fatal_response(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = GameScoreError::config("list_url still points at the placeholder");
        assert_eq!(
            err.to_string(),
            "config error: list_url still points at the placeholder"
        );

        let err = GameScoreError::validation("duplicate cache key");
        assert!(err.to_string().contains("duplicate cache key"));
    }

    #[test]
    fn access_denied_is_fatal() {
        let err = GameScoreError::AccessDenied {
            url: "https://critic.example.com/game/x".into(),
        };
        assert!(err.is_fatal_response());
        assert!(err.to_string().contains("403"));
        assert!(!GameScoreError::Network("boom".into()).is_fatal_response());
    }
}
