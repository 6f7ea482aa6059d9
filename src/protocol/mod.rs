//! obs-websocket authentication handshake.
//!
//! Implements the client side of the obs-websocket 4.x bootstrap: ask the
//! peer whether it requires authentication and, if it does, answer its
//! challenge with a credential derived from the shared password. The
//! password itself never goes on the wire.
//!
//! # Protocol Overview
//!
//! ## Message Flow
//!
//! ```text
//! Client                                 Server
//!    |                                     |
//!    |--- GetAuthRequired (message-id) --->|
//!    |<-- authRequired, salt, challenge ---|
//!    |                                     |
//!    |--- Authenticate (auth) ------------>|  only if authRequired
//!    |                                     |
//! ```
//!
//! ## State Machine
//!
//! ```text
//!                  create_query()
//!     [Start] ─────────────────────> [AwaitingCapabilityResponse]
//!                                        │              │
//!                    authRequired=false  │              │ authRequired=true
//!                                        v              v
//!                [Authenticated(NotRequired)]   [ChallengeReceived]
//!                                                       │ create_submission()
//!                                                       v
//!                                          [SubmittingCredential]
//!                                                       │ submission_sent()
//!                          Confirmation::None           │       AwaitResponse
//!                  ┌────────────────────────────────────┴──────────┐
//!                  v                                               v
//!       [Authenticated(Submitted)]                    [AwaitingConfirmation]
//!                                                                  │ status ok
//!                                                                  v
//!                                                 [Authenticated(Confirmed)]
//!
//!  Any transport failure or bad response ──> [Failed]
//! ```
//!
//! ## Credential
//!
//! | Step | Value                                    |
//! |------|------------------------------------------|
//! | 1    | `base64(sha256(password ‖ salt))`        |
//! | 2    | `base64(sha256(step1 ‖ challenge))`      |
//!
//! # Usage
//!
//! ```rust,ignore
//! use obsws::protocol::authenticate;
//! use obsws::transport::Session;
//!
//! let session = Session::open("localhost", 4444).await?;
//! let mut authed = authenticate(session, "secret").await?;
//! println!("{:?}", authed.outcome());
//! authed.close().await?;
//! ```

mod credential;
mod handshake;
mod message;

pub use credential::derive_credential;
pub use handshake::{
    authenticate, authenticate_with, AuthOutcome, AuthenticatedSession, Confirmation, Handshake,
    HandshakeState,
};
pub use message::{
    is_event, AuthChallenge, AuthResponse, CapabilityQuery, CapabilityResponse,
    CredentialSubmission, RequestType, ResponseStatus,
};

/// Default obs-websocket port
pub const DEFAULT_PORT: u16 = 4444;
