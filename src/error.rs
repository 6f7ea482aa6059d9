//! obs-websocket client error types.
//!
//! Errors are layered the same way the connection is:
//!
//! - [`TransportError`]: the WebSocket could not be opened, written, read
//!   or closed.
//! - [`AuthError`]: the handshake failed, either because the transport
//!   failed underneath it (the cause is kept as `#[source]`) or because the
//!   peer answered with something the handshake cannot use.
//! - [`ObsError`]: the top-level error returned by [`crate::Client`] and the
//!   configuration loaders.
//!
//! Nothing is retried. Every failure reaches the caller with its cause
//! chain intact.

use thiserror::Error;

/// Boxed error used to carry transport-specific causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Transport-level failures.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The peer was unreachable, refused the connection, or the WebSocket
    /// upgrade failed.
    #[error("Connection error: {url}: {source}")]
    Connection {
        /// URL that was dialed.
        url: String,
        /// Underlying cause.
        #[source]
        source: BoxError,
    },

    /// Writing a message failed.
    #[error("Send error: {0}")]
    Send(#[source] BoxError),

    /// Reading a message failed.
    #[error("Receive error: {0}")]
    Receive(#[source] BoxError),

    /// A received payload was not valid JSON.
    #[error("Receive error: malformed payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// Closing the connection failed.
    #[error("Close error: {0}")]
    Close(#[source] BoxError),

    /// The connection is closed, locally or by the peer.
    #[error("Connection closed")]
    Closed,
}

/// Handshake steps, used to tag transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    /// Writing `GetAuthRequired`.
    WriteGetAuthRequired,
    /// Reading the `GetAuthRequired` response.
    ReadGetAuthRequired,
    /// Writing `Authenticate`.
    WriteAuthenticate,
    /// Reading the `Authenticate` response (confirmation mode only).
    ReadAuthenticate,
}

impl std::fmt::Display for HandshakeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WriteGetAuthRequired => "write GetAuthRequired",
            Self::ReadGetAuthRequired => "read GetAuthRequired",
            Self::WriteAuthenticate => "write Authenticate",
            Self::ReadAuthenticate => "read Authenticate",
        };
        f.write_str(s)
    }
}

/// Handshake failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Transport failure during a handshake step.
    #[error("{step}: {source}")]
    Transport {
        /// Step that was in progress.
        step: HandshakeStep,
        /// Transport cause.
        #[source]
        source: TransportError,
    },

    /// A response was missing required fields or had the wrong shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The peer answered a request with `status: "error"`.
    #[error("{request} failed: {error}")]
    RequestFailed {
        /// Request type that failed.
        request: &'static str,
        /// Error text reported by the peer.
        error: String,
    },

    /// A response did not correlate with the outstanding request.
    #[error("Unexpected message id: expected {expected}, got {actual}")]
    UnexpectedMessageId {
        /// Id of the outstanding request.
        expected: String,
        /// Id carried by the response.
        actual: String,
    },

    /// The peer rejected the credential (confirmation mode only).
    #[error("Authentication rejected: {0}")]
    Rejected(String),

    /// The handshake was driven out of order.
    #[error("Invalid handshake state: {0}")]
    InvalidState(String),
}

impl AuthError {
    /// Wrap a transport failure with the step it happened in.
    pub fn transport(step: HandshakeStep, source: TransportError) -> Self {
        Self::Transport { step, source }
    }
}

/// Top-level errors.
#[derive(Error, Debug)]
pub enum ObsError {
    /// Transport failure outside the handshake (open, close).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Handshake failure.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The caller-supplied deadline elapsed.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error (reading a config file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ObsError>;

impl From<toml::de::Error> for ObsError {
    fn from(err: toml::de::Error) -> Self {
        ObsError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_auth_error_keeps_transport_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = AuthError::transport(
            HandshakeStep::WriteAuthenticate,
            TransportError::Send(Box::new(io)),
        );

        assert_eq!(err.to_string(), "write Authenticate: Send error: pipe closed");

        let transport = err.source().unwrap();
        assert!(transport.to_string().starts_with("Send error"));
        let io = transport.source().unwrap();
        assert_eq!(io.to_string(), "pipe closed");
    }

    #[test]
    fn test_obs_error_from_auth() {
        let err: ObsError = AuthError::MalformedResponse("missing salt".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Authentication error: Malformed response: missing salt"
        );
    }
}
