//! Session-specific error types.

use crate::domain::foundation::{DomainError, ErrorCode, SessionId};

use super::SessionState;

/// Session-specific errors.
///
/// Callers can always tell "doesn't exist" apart from "exists but is in the
/// wrong state".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Session was not found.
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// Operation is not valid for the session's current state.
    #[error("Cannot {operation} while session is {current}")]
    InvalidState {
        current: SessionState,
        operation: &'static str,
    },
}

impl SessionError {
    pub fn not_found(id: SessionId) -> Self {
        SessionError::NotFound(id)
    }

    pub fn invalid_state(current: SessionState, operation: &'static str) -> Self {
        SessionError::InvalidState { current, operation }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
        }
    }
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            SessionError::NotFound(id) => domain.with_detail("session_id", id.to_string()),
            SessionError::InvalidState { current, operation } => domain
                .with_detail("current_state", current.to_string())
                .with_detail("operation", operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_session_not_found_code() {
        let err = SessionError::not_found(SessionId::new());
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
    }

    #[test]
    fn invalid_state_message_names_operation_and_state() {
        let err = SessionError::invalid_state(SessionState::Paired, "confirm pairing");
        assert_eq!(err.to_string(), "Cannot confirm pairing while session is paired");
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn converts_to_domain_error_with_details() {
        let err: DomainError =
            SessionError::invalid_state(SessionState::Disconnected, "confirm pairing").into();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        assert_eq!(
            err.details.get("current_state"),
            Some(&"disconnected".to_string())
        );
    }
}
