//! # obsws - obs-websocket client handshake
//!
//! Opens a WebSocket session to an obs-websocket 4.x server and runs the
//! challenge/response authentication handshake. The shared password never
//! leaves the client; only a credential derived from it and the
//! server-issued salt and challenge is sent.
//!
//! ## Protocol Overview
//!
//! ```text
//! Client                                  obs-websocket
//!    |                                          |
//!    |====== WebSocket upgrade (ws://h:p) =====>|
//!    |                                          |
//!    |------ GetAuthRequired ------------------>|
//!    |<----- authRequired / salt / challenge ---|
//!    |                                          |
//!    |------ Authenticate (derived auth) ------>|  only when required
//!    |                                          |
//! ```
//!
//! `Authenticate` has no defined acknowledgement, so a session reporting
//! [`AuthOutcome::Submitted`] has sent its credential but has no proof the
//! server accepted it. Use [`Confirmation::AwaitResponse`] to read the
//! server's reply where one is sent.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use obsws::{Client, ConnectionConfig};
//!
//! let config = ConnectionConfig {
//!     password: "secret".to_string(),
//!     ..Default::default()
//! };
//! let mut client = Client::connect(&config).await?;
//! println!("{:?}", client.outcome());
//! client.close().await?;
//! ```
//!
//! ## Lower Level
//!
//! ```rust,ignore
//! use obsws::protocol::{authenticate, derive_credential};
//! use obsws::transport::Session;
//!
//! let session = Session::open("localhost", 4444).await?;
//! let authed = authenticate(session, "secret").await?;
//!
//! assert_eq!(
//!     derive_credential("password", "salt", "challenge"),
//!     "zTM5ki6L2vVvBQiTG9ckH1Lh64AbnCf6XZ226UmnkIA="
//! );
//! ```
//!
//! ## Modules
//!
//! - [`transport`]: WebSocket session (open, send, receive, close)
//! - [`protocol`]: Handshake state machine and credential derivation
//! - [`client`]: Open + authenticate with an optional deadline
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use client::Client;
pub use config::{Config, ConnectionConfig, ConnectionOverrides};
pub use error::{AuthError, ObsError, Result, TransportError};
pub use protocol::{
    authenticate, authenticate_with, derive_credential, AuthOutcome, AuthenticatedSession,
    Confirmation, Handshake, HandshakeState,
};
pub use transport::{MessageTransport, Session, SessionState, WebSocketTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
