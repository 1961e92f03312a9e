//! HTTP adapters - REST API and the live observer endpoint.
//!
//! ```text
//! /api/sessions ...   session commands and queries (JSON)
//! /api/live           observer WebSocket
//! ```

pub mod session;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{ws_handler, LiveState, NotificationHub};
use crate::application::SessionManager;

pub use session::session_routes;

/// Shared handles the HTTP surface is built from.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub hub: Arc<NotificationHub>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>, hub: Arc<NotificationHub>) -> Self {
        Self { sessions, hub }
    }
}

/// Full application router with request tracing.
pub fn router(state: AppState) -> Router {
    let live = Router::new()
        .route("/api/live", get(ws_handler))
        .with_state(LiveState::new(state.hub, Arc::clone(&state.sessions)));

    Router::new()
        .nest("/api/sessions", session_routes(state.sessions))
        .merge(live)
        .layer(TraceLayer::new_for_http())
}
