//! WebSocket adapters for live observer notifications.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         SessionManager                               │
//! │   publishes HubEvent through the EventPublisher port                 │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ broadcast
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      NotificationHub                                 │
//! │   observer-a queue     observer-b queue     observer-c queue         │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ one socket per observer
//!                                     ▼
//!                          GET /api/live (ws_handler)
//! ```
//!
//! - [`hub`] - Observer registry and best-effort fan-out
//! - [`handler`] - Axum WebSocket upgrade handler
//! - [`connector`] - Observer-side connector over `tokio-tungstenite`

pub mod connector;
pub mod handler;
pub mod hub;

pub use connector::{WsConnector, WsTransport};
pub use handler::{ws_handler, LiveState};
pub use hub::{
    AttachedObserver, BroadcastReport, Frame, NotificationHub, DEFAULT_OBSERVER_CAPACITY,
};
