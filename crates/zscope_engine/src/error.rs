//! Error types for engine operations.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur inside an engine.
///
/// The session layer passes these through unchanged in kind; it never
/// recovers or retries on the engine's behalf.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A storage backend could not be opened.
    #[error("storage unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A commit could not be applied, typically a write conflict.
    #[error("transaction conflict: {reason}")]
    Conflict {
        /// Description of the conflict.
        reason: String,
    },

    /// The database is closed.
    #[error("database is closed")]
    DatabaseClosed,

    /// The connection is closed.
    #[error("connection is closed")]
    ConnectionClosed,

    /// Any other engine-specific failure.
    #[error("engine error: {reason}")]
    Other {
        /// Description of the failure.
        reason: String,
    },
}

impl EngineError {
    /// Creates a storage-unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a transaction-conflict error.
    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    /// Creates a generic engine error.
    pub fn other(reason: impl Into<String>) -> Self {
        Self::Other {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EngineError::unavailable("file missing");
        assert_eq!(err.to_string(), "storage unavailable: file missing");

        let err = EngineError::DatabaseClosed;
        assert_eq!(err.to_string(), "database is closed");

        let err = EngineError::conflict("concurrent write to `x`");
        assert_eq!(
            err.to_string(),
            "transaction conflict: concurrent write to `x`"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = EngineError::from(io_err);
        assert!(matches!(err, EngineError::Io(_)));
    }
}
