//! Error types for chunk-core

use crate::host::ObjectHandle;

/// Result type for chunk-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chunk-core operations.
///
/// A missing tag, field or occurrence is not an error: locate operations
/// report it as `None` or `false`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse chunk text at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Malformed chunk at line {line}: {message}")]
    MalformedChunk { line: usize, message: String },

    #[error("Line index {index} out of range (chunk has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    #[error("Edit does not match the chunk text at line {line}")]
    EditMismatch { line: usize },

    #[error("Host rejected state for {handle}: {reason}")]
    HostRejected { handle: ObjectHandle, reason: String },

    #[error("Unknown object: {0}")]
    UnknownObject(ObjectHandle),

    #[error("State of {0} changed since the session read it")]
    StaleObject(ObjectHandle),

    #[error("Session is not bound to a host object")]
    Detached,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedChunk {
            line,
            message: message.into(),
        }
    }

    /// Whether this error means the source text itself is not a valid chunk
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedChunk { .. })
    }
}

/// Failures reported by a host's object state accessors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("no live object for {0}")]
    UnknownObject(ObjectHandle),

    #[error("{0}")]
    Rejected(String),
}

impl HostError {
    pub(crate) fn into_error(self, handle: ObjectHandle) -> Error {
        match self {
            Self::UnknownObject(h) => Error::UnknownObject(h),
            Self::Rejected(reason) => Error::HostRejected { handle, reason },
        }
    }
}
