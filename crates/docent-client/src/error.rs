//! Error types for the answer backend boundary.

use docent_core::error::DocentError;

/// Errors from the answer client, classified by where the failure occurred.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure: DNS, refused connection, dropped socket.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("server returned status {status}")]
    Server { status: u16 },
    /// The server answered 2xx but the body did not match the contract.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<ClientError> for DocentError {
    fn from(err: ClientError) -> Self {
        DocentError::Client(err.to_string())
    }
}
