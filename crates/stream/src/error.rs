use thiserror::Error;

/// Errors reported by a stream transport.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// Connection bring-up or tear-down failed.
    #[error("Stream connection failed: {0}")]
    Connection(String),

    /// An operation was attempted on a transport that is not connected.
    #[error("Stream is not connected")]
    NotConnected,

    /// The transport has no record handler to deliver to.
    #[error("No record handler registered")]
    NoHandler,
}
