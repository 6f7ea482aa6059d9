//! Handshake wire messages.
//!
//! Defines the `GetAuthRequired` and `Authenticate` requests and their
//! responses as they appear on the wire (obs-websocket 4.x field names).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::credential::derive_credential;
use crate::error::AuthError;

/// Request types used by the handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    /// Ask whether the peer requires authentication
    GetAuthRequired,
    /// Submit a derived credential
    Authenticate,
}

impl RequestType {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetAuthRequired => "GetAuthRequired",
            Self::Authenticate => "Authenticate",
        }
    }
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// Request succeeded
    Ok,
    /// Request failed, see the `error` field
    Error,
}

/// `GetAuthRequired` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityQuery {
    /// Correlation id
    #[serde(rename = "message-id")]
    pub message_id: String,
    /// Always [`RequestType::GetAuthRequired`]
    #[serde(rename = "request-type")]
    pub request_type: RequestType,
}

impl CapabilityQuery {
    /// Create a query with the given correlation id
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            request_type: RequestType::GetAuthRequired,
        }
    }
}

/// `GetAuthRequired` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityResponse {
    /// Correlation id of the query this answers
    #[serde(rename = "message-id")]
    pub message_id: String,
    /// Request status
    pub status: ResponseStatus,
    /// Error text when `status` is `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether the peer requires authentication
    #[serde(rename = "authRequired", default, skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
    /// Server-issued challenge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<String>,
    /// Server-issued salt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
}

impl CapabilityResponse {
    /// Decode a response, mapping shape errors to [`AuthError::MalformedResponse`].
    pub fn from_value(value: Value) -> Result<Self, AuthError> {
        serde_json::from_value(value).map_err(|e| {
            AuthError::MalformedResponse(format!("GetAuthRequired response: {e}"))
        })
    }

    /// Take the salt/challenge pair out of a response that requires auth.
    ///
    /// Returns `Ok(None)` when the peer does not require authentication,
    /// and an error when `authRequired` is missing or when it is set but
    /// the salt or challenge is absent.
    pub fn into_challenge(self) -> Result<Option<AuthChallenge>, AuthError> {
        match self.auth_required {
            Some(true) => {},
            Some(false) => return Ok(None),
            None => {
                return Err(AuthError::MalformedResponse(
                    "GetAuthRequired response without authRequired".to_string(),
                ))
            },
        }

        let salt = self.salt.ok_or_else(|| {
            AuthError::MalformedResponse("authRequired without salt".to_string())
        })?;
        let challenge = self.challenge.ok_or_else(|| {
            AuthError::MalformedResponse("authRequired without challenge".to_string())
        })?;

        Ok(Some(AuthChallenge { salt, challenge }))
    }
}

/// Salt and challenge issued for one handshake.
///
/// Only obtainable from a [`CapabilityResponse`] with `authRequired` set,
/// and consumed by [`CredentialSubmission::new`], so each pair backs at
/// most one submission.
#[derive(Debug, PartialEq, Eq)]
pub struct AuthChallenge {
    salt: String,
    challenge: String,
}

impl AuthChallenge {
    /// Salt
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Challenge
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

/// `Authenticate` request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSubmission {
    /// Correlation id
    #[serde(rename = "message-id")]
    pub message_id: String,
    /// Always [`RequestType::Authenticate`]
    #[serde(rename = "request-type")]
    pub request_type: RequestType,
    /// Derived credential
    pub auth: String,
}

impl CredentialSubmission {
    /// Derive the credential for `challenge` and build the request.
    pub fn new(message_id: impl Into<String>, secret: &str, challenge: AuthChallenge) -> Self {
        Self {
            message_id: message_id.into(),
            request_type: RequestType::Authenticate,
            auth: derive_credential(secret, &challenge.salt, &challenge.challenge),
        }
    }
}

impl std::fmt::Debug for CredentialSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSubmission")
            .field("message_id", &self.message_id)
            .field("request_type", &self.request_type)
            .field("auth", &"<redacted>")
            .finish()
    }
}

/// `Authenticate` response, read only when confirmation is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Correlation id of the submission this answers
    #[serde(rename = "message-id")]
    pub message_id: String,
    /// Request status
    pub status: ResponseStatus,
    /// Error text when `status` is `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse {
    /// Decode a response, mapping shape errors to [`AuthError::MalformedResponse`].
    pub fn from_value(value: Value) -> Result<Self, AuthError> {
        serde_json::from_value(value)
            .map_err(|e| AuthError::MalformedResponse(format!("Authenticate response: {e}")))
    }
}

/// Check whether an inbound message is an unsolicited event rather than a
/// response.
pub fn is_event(value: &Value) -> bool {
    value.get("update-type").is_some() && value.get("message-id").is_none()
}

/// Read the correlation id of an inbound response, if any.
pub fn message_id(value: &Value) -> Option<&str> {
    value.get("message-id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capability_query_wire_format() {
        let query = CapabilityQuery::new("7");
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({"message-id": "7", "request-type": "GetAuthRequired"})
        );
    }

    #[test]
    fn test_credential_submission_wire_format() {
        let challenge = CapabilityResponse::from_value(json!({
            "message-id": "1",
            "status": "ok",
            "authRequired": true,
            "salt": "salt",
            "challenge": "challenge",
        }))
        .unwrap()
        .into_challenge()
        .unwrap()
        .unwrap();

        let submission = CredentialSubmission::new("2", "password", challenge);
        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(
            value,
            json!({
                "message-id": "2",
                "request-type": "Authenticate",
                "auth": "zTM5ki6L2vVvBQiTG9ckH1Lh64AbnCf6XZ226UmnkIA=",
            })
        );
    }

    #[test]
    fn test_submission_debug_redacts_credential() {
        let submission = CredentialSubmission {
            message_id: "2".to_string(),
            request_type: RequestType::Authenticate,
            auth: "secret-derived".to_string(),
        };
        let debug = format!("{submission:?}");
        assert!(!debug.contains("secret-derived"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_no_auth_response_has_no_challenge() {
        let response = CapabilityResponse::from_value(json!({
            "message-id": "1",
            "status": "ok",
            "authRequired": false,
        }))
        .unwrap();
        assert!(response.into_challenge().unwrap().is_none());
    }

    #[test]
    fn test_auth_required_without_salt_is_malformed() {
        let response = CapabilityResponse::from_value(json!({
            "message-id": "1",
            "status": "ok",
            "authRequired": true,
            "challenge": "c",
        }))
        .unwrap();
        let err = response.into_challenge().unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(m) if m.contains("salt")));
    }

    #[test]
    fn test_missing_auth_required_is_malformed() {
        let response = CapabilityResponse::from_value(json!({
            "message-id": "1",
            "status": "ok",
        }))
        .unwrap();
        assert!(matches!(
            response.into_challenge(),
            Err(AuthError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_status_is_malformed() {
        let err = CapabilityResponse::from_value(json!({
            "message-id": "1",
            "authRequired": false,
        }))
        .unwrap_err();
        assert!(matches!(err, AuthError::MalformedResponse(_)));
    }

    #[test]
    fn test_event_detection() {
        assert!(is_event(&json!({"update-type": "SwitchScenes"})));
        assert!(!is_event(&json!({"message-id": "1", "status": "ok"})));
        assert_eq!(message_id(&json!({"message-id": "3"})), Some("3"));
        assert_eq!(message_id(&json!({"message-id": 3})), None);
    }
}
