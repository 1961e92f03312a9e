//! Notification domain module.
//!
//! Defines the tagged event type observers receive and the wire protocol
//! spoken over the observer channel. Fan-out lives in
//! `adapters::websocket`; observer-side handling lives in `client`.

mod events;
mod protocol;

pub use events::{EventKind, HubEvent, MessageDirection};
pub use protocol::{ClientMessage, ServerMessage};
