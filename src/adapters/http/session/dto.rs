//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp};
use crate::domain::session::{PairedIdentity, PairingPayload, SessionSnapshot};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a new session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub label: String,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Every session, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub items: Vec<SessionSnapshot>,
    pub total: usize,
}

impl From<Vec<SessionSnapshot>> for SessionListResponse {
    fn from(items: Vec<SessionSnapshot>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// A live pairing payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingResponse {
    pub session_id: SessionId,
    pub payload: String,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
}

impl PairingResponse {
    pub fn new(session_id: SessionId, payload: &PairingPayload, ttl: std::time::Duration) -> Self {
        Self {
            session_id,
            payload: payload.value().to_string(),
            issued_at: payload.issued_at(),
            expires_at: payload.expires_at(ttl),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPairingResponse {
    pub session_id: SessionId,
    pub paired_identity: PairedIdentity,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub details: HashMap<String, String>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed.to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self {
            code: err.code.to_string(),
            message: err.message,
            details: err.details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionError;

    #[test]
    fn create_session_request_deserializes() {
        let json = r#"{"label": "Sales"}"#;
        let req: CreateSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.label, "Sales");
    }

    #[test]
    fn pairing_response_uses_camel_case() {
        let payload = PairingPayload::generate(Timestamp::from_unix_millis(0));
        let response =
            PairingResponse::new(SessionId::new(), &payload, std::time::Duration::from_secs(60));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("expiresAt").is_some());
        assert!(json.get("sessionId").is_some());
    }

    #[test]
    fn error_response_carries_domain_code_and_details() {
        let id = SessionId::new();
        let response = ErrorResponse::from(DomainError::from(SessionError::not_found(id)));

        assert_eq!(response.code, "SESSION_NOT_FOUND");
        assert_eq!(response.details.get("session_id"), Some(&id.to_string()));
    }
}
