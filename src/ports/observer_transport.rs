//! ObserverTransport port - Observer-side connection to the hub.
//!
//! The observer client drives reconnection against this port; the
//! WebSocket adapter implements it in production and tests substitute
//! scripted connections.

use async_trait::async_trait;

use crate::domain::notification::{ClientMessage, ServerMessage};

/// Errors raised by an observer transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The channel could not be opened or is no longer usable.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    /// A frame could not be encoded or decoded.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Opens connections to the notification hub.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn ObserverTransport>, TransportError>;
}

/// One open duplex channel to the hub.
#[async_trait]
pub trait ObserverTransport: Send {
    /// Next message from the hub; `None` once the channel has closed.
    async fn next_message(&mut self) -> Option<ServerMessage>;

    /// Send a message to the hub.
    async fn send(&mut self, message: ClientMessage) -> Result<(), TransportError>;
}
