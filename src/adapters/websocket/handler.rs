//! WebSocket upgrade handler for live observers.
//!
//! Handles the HTTP → WebSocket upgrade and manages the observer lifecycle:
//! 1. Attach to the hub and acknowledge with `connected`
//! 2. Forward queued frames to the socket
//! 3. Answer `ping` and `request.state` from the observer
//! 4. Detach on close, error, or when the hub drops the observer

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};

use crate::application::SessionManager;
use crate::domain::foundation::Timestamp;
use crate::domain::notification::{ClientMessage, ServerMessage};

use super::hub::NotificationHub;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct LiveState {
    pub hub: Arc<NotificationHub>,
    pub sessions: Arc<SessionManager>,
}

impl LiveState {
    pub fn new(hub: Arc<NotificationHub>, sessions: Arc<SessionManager>) -> Self {
        Self { hub, sessions }
    }
}

/// Route: `GET /api/live`
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<LiveState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Runs for the lifetime of one observer connection.
async fn handle_socket(socket: WebSocket, state: LiveState) {
    let (mut sender, mut receiver) = socket.split();

    let observer = state.hub.attach().await;
    let observer_id = observer.id;
    let mut frames = observer.frames;

    if !state.hub.greet(&observer_id).await {
        state.hub.detach(&observer_id).await;
        return;
    }

    // Forward hub frames to the socket. Ends when the hub detaches us
    // (queue closed) or the socket rejects a write.
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = frames.recv().await {
            if let Err(e) = sender.send(Message::Text(frame.as_str().to_owned())).await {
                tracing::debug!(observer_id = %observer_id, error = %e, "Send error, closing connection");
                break;
            }
        }
    });

    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(client_msg) => reply_to(client_msg, &recv_state.sessions).await,
                        Err(e) => {
                            tracing::debug!(observer_id = %observer_id, error = %e, "Unparseable observer message");
                            ServerMessage::Error {
                                code: "BAD_REQUEST".to_string(),
                                message: format!("Unrecognized message: {}", e),
                            }
                        }
                    };
                    if !recv_state.hub.send_to(&observer_id, &reply).await {
                        break;
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::warn!(observer_id = %observer_id, "Received unsupported binary message");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Protocol-level heartbeats are answered by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(observer_id = %observer_id, "Observer sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(observer_id = %observer_id, error = %e, "Receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.detach(&observer_id).await;
}

/// Build the direct reply to an observer request.
async fn reply_to(message: ClientMessage, sessions: &SessionManager) -> ServerMessage {
    match message {
        ClientMessage::Ping => ServerMessage::Pong {
            timestamp: Timestamp::now(),
        },
        ClientMessage::RequestState => ServerMessage::State {
            sessions: sessions.list_sessions().await,
        },
    }
}
