//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::SessionManager;
use crate::domain::foundation::{DomainError, SessionId};
use crate::domain::session::SessionError;

use super::dto::{
    ConfirmPairingResponse, CreateSessionRequest, ErrorResponse, PairingResponse,
    SessionListResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Create a new session
pub async fn create_session(
    State(sessions): State<Arc<SessionManager>>,
    Json(req): Json<CreateSessionRequest>,
) -> Response {
    if req.label.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Label must not be empty")),
        )
            .into_response();
    }

    let snapshot = sessions.create_session(req.label).await;
    (StatusCode::CREATED, Json(snapshot)).into_response()
}

/// GET /api/sessions - List every session
pub async fn list_sessions(State(sessions): State<Arc<SessionManager>>) -> Response {
    let response = SessionListResponse::from(sessions.list_sessions().await);
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/sessions/:id - Get one session
pub async fn get_session(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.get_session(&session_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/start - Issue a pairing payload
pub async fn start_session(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.start_session(&session_id).await {
        Ok(payload) => {
            let response = PairingResponse::new(session_id, &payload, sessions.pairing_ttl());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// GET /api/sessions/:id/pairing - Current payload, 204 when none is live
pub async fn get_pairing_payload(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.get_pairing_payload(&session_id).await {
        Ok(Some(payload)) => {
            let response = PairingResponse::new(session_id, &payload, sessions.pairing_ttl());
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/confirm - Complete pairing
pub async fn confirm_pairing(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.confirm_pairing(&session_id).await {
        Ok(paired_identity) => {
            let response = ConfirmPairingResponse {
                session_id,
                paired_identity,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}

/// POST /api/sessions/:id/disconnect - Drop to disconnected
pub async fn disconnect_session(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.disconnect_session(&session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// DELETE /api/sessions/:id - Remove a session
pub async fn remove_session(
    State(sessions): State<Arc<SessionManager>>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match sessions.remove_session(&session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_session_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn handle_session_error(error: SessionError) -> Response {
    let status = match &error {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::InvalidState { .. } => StatusCode::CONFLICT,
    };
    let body = ErrorResponse::from(DomainError::from(error));
    (status, Json(body)).into_response()
}
