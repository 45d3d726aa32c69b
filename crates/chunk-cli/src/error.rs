//! Error types for chunk-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from chunk-core
    #[error(transparent)]
    Core(#[from] chunk_core::Error),

    /// File could not be read or written
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the file lock
    #[error("Failed to lock {}", path.display())]
    LockFailed { path: PathBuf },

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Logging could not be set up
    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_names_the_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err = CliError::file("track.chunk", source);
        assert_eq!(err.to_string(), "track.chunk: not found");
        assert!(std::error::Error::source(&err).is_some());
    }
}
