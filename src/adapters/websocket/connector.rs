//! Observer-side connector: dials the hub's `/api/live` endpoint over
//! `tokio-tungstenite` and exposes it as an [`ObserverTransport`].

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::notification::{ClientMessage, ServerMessage};
use crate::ports::{Connector, ObserverTransport, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a fresh WebSocket to the hub on every `connect`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn ObserverTransport>, TransportError> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| TransportError::Unavailable(format!("WebSocket connect: {e}")))?;

        tracing::debug!(url = %self.url, "Connected to notification hub");
        Ok(Box::new(WsTransport { ws }))
    }
}

/// One live hub connection.
pub struct WsTransport {
    ws: WsStream,
}

#[async_trait]
impl ObserverTransport for WsTransport {
    async fn next_message(&mut self) -> Option<ServerMessage> {
        while let Some(frame) = self.ws.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(message) => return Some(message),
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring unparseable hub frame");
                    }
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(error = %e, "Hub connection failed");
                    return None;
                }
            }
        }
        None
    }

    async fn send(&mut self, message: ClientMessage) -> Result<(), TransportError> {
        let json = serde_json::to_string(&message)
            .map_err(|e| TransportError::Protocol(e.to_string()))?;
        self.ws
            .send(Message::Text(json))
            .await
            .map_err(|e| TransportError::Unavailable(e.to_string()))
    }
}
