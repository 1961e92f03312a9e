//! HTTP routes for session endpoints.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::application::SessionManager;

use super::handlers::{
    confirm_pairing, create_session, disconnect_session, get_pairing_payload, get_session,
    list_sessions, remove_session, start_session,
};

/// Creates the session router with all endpoints.
pub fn session_routes(sessions: Arc<SessionManager>) -> Router {
    Router::new()
        .route("/", post(create_session).get(list_sessions))
        .route("/:id", get(get_session).delete(remove_session))
        .route("/:id/start", post(start_session))
        .route("/:id/pairing", get(get_pairing_payload))
        .route("/:id/confirm", post(confirm_pairing))
        .route("/:id/disconnect", post(disconnect_session))
        .with_state(sessions)
}
