//! Transport session for obs-websocket.
//!
//! A [`Session`] owns one open, full-duplex connection to `ws://host:port`
//! and exposes send/receive of JSON messages plus close. The wire itself is
//! behind the [`MessageTransport`] trait so the handshake can be driven over
//! a real WebSocket ([`WebSocketTransport`]) or an in-memory peer.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           protocol::authenticate         │
//! │         (Transport-Agnostic)            │
//! └──────────────────┬──────────────────────┘
//!                    │
//!          ┌─────────┴─────────┐
//!          │     Session<T>     │  open/closed state, message ids
//!          └─────────┬─────────┘
//!                    ▼
//!          ┌───────────────────┐
//!          │ WebSocketTransport │  tokio-tungstenite
//!          └───────────────────┘
//! ```
//!
//! No operation here retries or times out. Callers wanting a deadline wrap
//! the futures in `tokio::time::timeout`.

mod websocket;

pub use websocket::WebSocketTransport;

use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::error::TransportError;

/// URI scheme used for every connection.
pub const URL_SCHEME: &str = "ws";

/// Build the connection URL for a peer.
pub fn connection_url(host: &str, port: u16) -> String {
    format!("{}://{}:{}", URL_SCHEME, host, port)
}

/// Message-oriented transport backing a [`Session`].
///
/// Implementations deliver whole messages: a send is either fully written
/// or fails, and a receive yields one complete decoded message.
pub trait MessageTransport: Send {
    /// Serialize and write one message.
    fn send(&mut self, message: &Value) -> BoxFuture<'_, Result<(), TransportError>>;

    /// Wait for the next complete message.
    fn receive(&mut self) -> BoxFuture<'_, Result<Value, TransportError>>;

    /// Release the connection.
    fn close(&mut self) -> BoxFuture<'_, Result<(), TransportError>>;
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connection open
    Open,
    /// Connection closed
    Closed,
}

/// Per-session correlation id source.
///
/// Monotonic and owned by one session, so ids never collide within a
/// session and no state is shared between sessions.
#[derive(Debug, Clone)]
pub struct MessageIdGenerator {
    next: u64,
}

impl MessageIdGenerator {
    /// Create a generator starting at 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Return the next id
    pub fn next_id(&mut self) -> String {
        let id = self.next;
        self.next += 1;
        id.to_string()
    }
}

impl Default for MessageIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// One open connection to an obs-websocket peer.
///
/// Single owner: a session is not shared between concurrent callers.
pub struct Session<T = WebSocketTransport> {
    transport: T,
    state: SessionState,
    ids: MessageIdGenerator,
}

impl Session<WebSocketTransport> {
    /// Connect to `ws://host:port`.
    pub async fn open(host: &str, port: u16) -> Result<Self, TransportError> {
        let transport = WebSocketTransport::connect(host, port).await?;
        Ok(Self::new(transport))
    }
}

impl<T: MessageTransport> Session<T> {
    /// Wrap an already connected transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Open,
            ids: MessageIdGenerator::new(),
        }
    }

    /// Get current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the connection is still open
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Allocate a correlation id for the next request.
    pub fn next_message_id(&mut self) -> String {
        self.ids.next_id()
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send one message.
    pub async fn send(&mut self, message: &Value) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        let result = self.transport.send(message).await;
        self.observe(result)
    }

    /// Serialize and send a typed message.
    pub async fn send_message<M: Serialize>(&mut self, message: &M) -> Result<(), TransportError> {
        let value =
            serde_json::to_value(message).map_err(|e| TransportError::Send(Box::new(e)))?;
        self.send(&value).await
    }

    /// Wait for the next message.
    pub async fn receive(&mut self) -> Result<Value, TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        let result = self.transport.receive().await;
        self.observe(result)
    }

    /// Close the connection. Closing an already closed session is a no-op.
    pub async fn close(&mut self) -> Result<(), TransportError> {
        if !self.is_open() {
            return Ok(());
        }
        self.state = SessionState::Closed;
        tracing::debug!("closing session");
        self.transport.close().await
    }

    /// Track peer-initiated closes.
    fn observe<R>(&mut self, result: Result<R, TransportError>) -> Result<R, TransportError> {
        if let Err(TransportError::Closed) = result {
            self.state = SessionState::Closed;
        }
        result
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}
