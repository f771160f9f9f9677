//! Error types for the conversation session.

use docent_core::error::DocentError;

/// Errors surfaced to callers of the conversation session.
///
/// Network and storage failures during a send or a history load are not
/// errors at this boundary: they become a fallback reply or a log line,
/// and the operation still completes. These variants cover the cases
/// where the operation is refused up front.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The query was empty after trimming whitespace.
    #[error("query cannot be empty")]
    EmptyQuery,
    /// A send or history load is already in flight.
    #[error("a request is already in flight")]
    Busy,
    /// The local cache could not be read while restoring.
    #[error("storage error: {0}")]
    Storage(String),
    /// A session lock was poisoned by a panicking holder.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DocentError> for SessionError {
    fn from(err: DocentError) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<SessionError> for DocentError {
    fn from(err: SessionError) -> Self {
        DocentError::Session(err.to_string())
    }
}
