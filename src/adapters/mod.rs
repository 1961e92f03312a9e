//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `clock` - System and manual clocks
//! - `scheduler` - Tokio and manual timers
//! - `events` - Recording event bus for tests
//! - `websocket` - Notification hub, live endpoint, observer connector
//! - `http` - Axum router for session commands and queries

pub mod clock;
pub mod events;
pub mod http;
pub mod scheduler;
pub mod websocket;

pub use clock::{ManualClock, SystemClock};
pub use events::InMemoryEventBus;
pub use http::{router, AppState};
pub use scheduler::{ManualScheduler, TokioScheduler};
pub use websocket::{BroadcastReport, NotificationHub, WsConnector};
