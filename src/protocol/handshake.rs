//! Authentication handshake.
//!
//! [`Handshake`] is the synchronous state machine: it builds requests,
//! checks responses and tracks where the exchange is. [`authenticate`]
//! drives it over a [`Session`], strictly in order: the query is fully
//! round-tripped before any credential is sent.
//!
//! The protocol has no positive acknowledgement for `Authenticate`. By
//! default the exchange ends in `Authenticated(AuthOutcome::Submitted)`,
//! meaning the credential went out but the peer never said it accepted
//! it. A wrong password only shows up later, when the peer refuses
//! requests or drops the connection. [`Confirmation::AwaitResponse`] opts
//! into reading the `Authenticate` response for peers that send one.

use serde_json::Value;

use super::message::{
    is_event, message_id, AuthChallenge, AuthResponse, CapabilityQuery, CapabilityResponse,
    CredentialSubmission, RequestType, ResponseStatus,
};
use crate::error::{AuthError, HandshakeStep, TransportError};
use crate::transport::{MessageTransport, Session, WebSocketTransport};

/// Whether to wait for a reply to `Authenticate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Confirmation {
    /// Fire and forget (default)
    #[default]
    None,
    /// Read the `Authenticate` response and fail on `status: "error"`
    AwaitResponse,
}

/// How a handshake reached [`HandshakeState::Authenticated`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The peer does not require authentication
    NotRequired,
    /// Credential sent, acceptance unknown
    Submitted,
    /// Credential sent and acknowledged with `status: "ok"`
    Confirmed,
}

/// Handshake state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing sent yet
    Start,
    /// `GetAuthRequired` built, waiting for its response
    AwaitingCapabilityResponse {
        /// Id of the outstanding query
        message_id: String,
    },
    /// Peer requires auth, salt/challenge handed out
    ChallengeReceived,
    /// `Authenticate` built, not yet written
    SubmittingCredential {
        /// Id of the submission
        message_id: String,
    },
    /// `Authenticate` written, waiting for its response
    AwaitingConfirmation {
        /// Id of the outstanding submission
        message_id: String,
    },
    /// Terminal success
    Authenticated(AuthOutcome),
    /// Terminal failure
    Failed,
}

/// Client side of the authentication handshake.
#[derive(Debug, Clone)]
pub struct Handshake {
    state: HandshakeState,
    confirmation: Confirmation,
}

impl Handshake {
    /// Create a handshake in [`HandshakeState::Start`]
    pub fn new(confirmation: Confirmation) -> Self {
        Self {
            state: HandshakeState::Start,
            confirmation,
        }
    }

    /// Get current state
    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// Check if the handshake reached its terminal success state
    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, HandshakeState::Authenticated(_))
    }

    /// Outcome once authenticated
    pub fn outcome(&self) -> Option<AuthOutcome> {
        match self.state {
            HandshakeState::Authenticated(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Build the `GetAuthRequired` query.
    pub fn create_query(&mut self, message_id: String) -> Result<CapabilityQuery, AuthError> {
        if self.state != HandshakeState::Start {
            return Err(self.invalid("create GetAuthRequired"));
        }

        self.state = HandshakeState::AwaitingCapabilityResponse {
            message_id: message_id.clone(),
        };
        Ok(CapabilityQuery::new(message_id))
    }

    /// Process the `GetAuthRequired` response.
    ///
    /// Returns the challenge when the peer requires authentication, or
    /// `None` after moving to `Authenticated(NotRequired)`.
    pub fn process_capability_response(
        &mut self,
        response: Value,
    ) -> Result<Option<AuthChallenge>, AuthError> {
        let expected = match &self.state {
            HandshakeState::AwaitingCapabilityResponse { message_id } => message_id.clone(),
            _ => return Err(self.invalid("process GetAuthRequired response")),
        };

        match self.check_capability_response(&expected, response) {
            Ok(None) => {
                self.state = HandshakeState::Authenticated(AuthOutcome::NotRequired);
                Ok(None)
            },
            Ok(Some(challenge)) => {
                self.state = HandshakeState::ChallengeReceived;
                Ok(Some(challenge))
            },
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Build the `Authenticate` request from the challenge.
    pub fn create_submission(
        &mut self,
        message_id: String,
        secret: &str,
        challenge: AuthChallenge,
    ) -> Result<CredentialSubmission, AuthError> {
        if self.state != HandshakeState::ChallengeReceived {
            return Err(self.invalid("create Authenticate"));
        }

        self.state = HandshakeState::SubmittingCredential {
            message_id: message_id.clone(),
        };
        Ok(CredentialSubmission::new(message_id, secret, challenge))
    }

    /// Record that the `Authenticate` request was written.
    pub fn submission_sent(&mut self) -> Result<(), AuthError> {
        let message_id = match &self.state {
            HandshakeState::SubmittingCredential { message_id } => message_id.clone(),
            _ => return Err(self.invalid("complete Authenticate")),
        };

        self.state = match self.confirmation {
            Confirmation::None => HandshakeState::Authenticated(AuthOutcome::Submitted),
            Confirmation::AwaitResponse => HandshakeState::AwaitingConfirmation { message_id },
        };
        Ok(())
    }

    /// Process the `Authenticate` response (confirmation mode only).
    pub fn process_auth_response(&mut self, response: Value) -> Result<(), AuthError> {
        let expected = match &self.state {
            HandshakeState::AwaitingConfirmation { message_id } => message_id.clone(),
            _ => return Err(self.invalid("process Authenticate response")),
        };

        let result = check_message_id(&expected, &response)
            .and_then(|()| AuthResponse::from_value(response))
            .and_then(|response| match response.status {
                ResponseStatus::Ok => Ok(()),
                ResponseStatus::Error => Err(AuthError::Rejected(
                    response.error.unwrap_or_else(|| "no reason given".to_string()),
                )),
            });

        match result {
            Ok(()) => {
                self.state = HandshakeState::Authenticated(AuthOutcome::Confirmed);
                Ok(())
            },
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Move to [`HandshakeState::Failed`] and hand back the error.
    pub fn fail(&mut self, err: AuthError) -> AuthError {
        self.state = HandshakeState::Failed;
        err
    }

    fn check_capability_response(
        &self,
        expected: &str,
        response: Value,
    ) -> Result<Option<AuthChallenge>, AuthError> {
        check_message_id(expected, &response)?;

        let response = CapabilityResponse::from_value(response)?;
        if response.status == ResponseStatus::Error {
            return Err(AuthError::RequestFailed {
                request: RequestType::GetAuthRequired.as_str(),
                error: response.error.unwrap_or_default(),
            });
        }

        response.into_challenge()
    }

    fn invalid(&mut self, action: &str) -> AuthError {
        let err = AuthError::InvalidState(format!("cannot {} in state {:?}", action, self.state));
        self.fail(err)
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new(Confirmation::default())
    }
}

/// Responses without an id are left for the decoder to reject.
fn check_message_id(expected: &str, response: &Value) -> Result<(), AuthError> {
    match message_id(response) {
        Some(actual) if actual != expected => Err(AuthError::UnexpectedMessageId {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }),
        _ => Ok(()),
    }
}

/// A session that completed the handshake.
pub struct AuthenticatedSession<T = WebSocketTransport> {
    session: Session<T>,
    outcome: AuthOutcome,
}

impl<T> std::fmt::Debug for AuthenticatedSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedSession")
            .field("session", &self.session)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl<T: MessageTransport> AuthenticatedSession<T> {
    /// How authentication concluded
    pub fn outcome(&self) -> AuthOutcome {
        self.outcome
    }

    /// Check if the peer explicitly acknowledged the credential
    pub fn is_confirmed(&self) -> bool {
        self.outcome == AuthOutcome::Confirmed
    }

    /// Borrow the session
    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    /// Borrow the session mutably for post-handshake traffic
    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Give up the authenticated wrapper
    pub fn into_session(self) -> Session<T> {
        self.session
    }

    /// Close the underlying connection
    pub async fn close(&mut self) -> Result<(), TransportError> {
        self.session.close().await
    }
}

/// Run the handshake without waiting for an `Authenticate` response.
pub async fn authenticate<T: MessageTransport>(
    session: Session<T>,
    secret: &str,
) -> Result<AuthenticatedSession<T>, AuthError> {
    authenticate_with(session, secret, Confirmation::None).await
}

/// Run the handshake.
///
/// On failure the session is closed before the error is returned.
pub async fn authenticate_with<T: MessageTransport>(
    mut session: Session<T>,
    secret: &str,
    confirmation: Confirmation,
) -> Result<AuthenticatedSession<T>, AuthError> {
    let mut handshake = Handshake::new(confirmation);

    match drive(&mut session, &mut handshake, secret).await {
        Ok(outcome) => Ok(AuthenticatedSession { session, outcome }),
        Err(err) => {
            if let Err(close_err) = session.close().await {
                tracing::warn!("close after failed handshake: {}", close_err);
            }
            Err(err)
        },
    }
}

async fn drive<T: MessageTransport>(
    session: &mut Session<T>,
    handshake: &mut Handshake,
    secret: &str,
) -> Result<AuthOutcome, AuthError> {
    if !session.is_open() {
        return Err(handshake.fail(AuthError::transport(
            HandshakeStep::WriteGetAuthRequired,
            TransportError::Closed,
        )));
    }

    let query = handshake.create_query(session.next_message_id())?;
    tracing::debug!(message_id = %query.message_id, "sending GetAuthRequired");
    session.send_message(&query).await.map_err(|e| {
        handshake.fail(AuthError::transport(HandshakeStep::WriteGetAuthRequired, e))
    })?;

    let response = receive_response(session, handshake, HandshakeStep::ReadGetAuthRequired).await?;
    let challenge = match handshake.process_capability_response(response)? {
        Some(challenge) => challenge,
        None => {
            tracing::info!("no authentication required");
            return Ok(AuthOutcome::NotRequired);
        },
    };

    let submission = handshake.create_submission(session.next_message_id(), secret, challenge)?;
    tracing::debug!(message_id = %submission.message_id, "sending Authenticate");
    session.send_message(&submission).await.map_err(|e| {
        handshake.fail(AuthError::transport(HandshakeStep::WriteAuthenticate, e))
    })?;
    handshake.submission_sent()?;

    if matches!(handshake.state(), HandshakeState::AwaitingConfirmation { .. }) {
        let response = receive_response(session, handshake, HandshakeStep::ReadAuthenticate).await?;
        handshake.process_auth_response(response)?;
    }

    let outcome = match handshake.outcome() {
        Some(outcome) => outcome,
        None => return Err(handshake.invalid("finish handshake")),
    };
    if outcome == AuthOutcome::Confirmed {
        tracing::info!("logged in");
    } else {
        tracing::info!("logged in (credential not acknowledged by peer)");
    }
    Ok(outcome)
}

/// Read the next response, skipping unsolicited events.
async fn receive_response<T: MessageTransport>(
    session: &mut Session<T>,
    handshake: &mut Handshake,
    step: HandshakeStep,
) -> Result<Value, AuthError> {
    loop {
        let value = session
            .receive()
            .await
            .map_err(|e| handshake.fail(AuthError::transport(step, e)))?;

        if is_event(&value) {
            tracing::debug!(update_type = ?value.get("update-type"), "skipping event during handshake");
            continue;
        }
        return Ok(value);
    }
}
