//! Error types for session operations.

use thiserror::Error;
use zscope_engine::EngineError;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by the session layer.
///
/// Only [`MalformedUri`] and [`Codec`] originate here; everything else is
/// an engine failure, either passed through unchanged ([`Engine`]) or
/// tagged with the lifecycle step it interrupted ([`StorageUnavailable`],
/// [`CommitFailed`], [`CloseFailed`]). Nothing is recovered or retried at
/// this layer.
///
/// [`MalformedUri`]: SessionError::MalformedUri
/// [`Codec`]: SessionError::Codec
/// [`Engine`]: SessionError::Engine
/// [`StorageUnavailable`]: SessionError::StorageUnavailable
/// [`CommitFailed`]: SessionError::CommitFailed
/// [`CloseFailed`]: SessionError::CloseFailed
#[derive(Debug, Error)]
pub enum SessionError {
    /// A `zeo://` URI did not split into a host and a numeric port.
    #[error("malformed storage URI `{uri}`: {reason}")]
    MalformedUri {
        /// The URI as given.
        uri: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The engine failed to open a storage backend.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] EngineError),

    /// The engine refused a commit on scope exit.
    #[error("commit failed: {0}")]
    CommitFailed(#[source] EngineError),

    /// A handle failed to close on an otherwise clean scope exit.
    #[error("close failed: {0}")]
    CloseFailed(#[source] EngineError),

    /// A typed root value failed to encode or decode.
    #[error("codec error: {message}")]
    Codec {
        /// Description of the failure.
        message: String,
    },

    /// Any other engine failure, passed through unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SessionError {
    /// Creates a malformed-URI error.
    pub(crate) fn malformed_uri(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedUri {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Creates a codec error.
    pub(crate) fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }
}
