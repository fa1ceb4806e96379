//! Error types for the relay core.

use thiserror::Error;

use crate::entities::ConnectionId;

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Main error type for the relay core
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound frame did not decode into an envelope, carried an unknown
    /// kind, or violated a shape invariant. Dropped: not broadcast, not
    /// persisted.
    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    /// `sent_at` was not an absolute ISO-8601 timestamp. Dropped like a
    /// malformed envelope.
    #[error("invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    /// An operation referenced a connection that was never opened or was
    /// already closed. This is a transport-adapter integration bug, surfaced
    /// to the caller rather than swallowed.
    #[error("unknown session: {connection}")]
    UnknownSession { connection: ConnectionId },
}

impl RelayError {
    /// Create a malformed-envelope error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            reason: reason.into(),
        }
    }

    /// Create an invalid-timestamp error
    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
        }
    }

    /// Create an unknown-session error
    pub fn unknown_session(connection: ConnectionId) -> Self {
        Self::UnknownSession { connection }
    }
}
