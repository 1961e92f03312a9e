//! Wire protocol between the notification hub and its observers.
//!
//! - Server → Observer: connection acknowledgement, events, state
//!   snapshots, heartbeat replies, errors
//! - Observer → Server: heartbeat, state requests

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ObserverId, Timestamp};
use crate::domain::session::SessionSnapshot;

use super::HubEvent;

// ============================================
// Server → Observer Messages
// ============================================

/// All message types that can be sent from the hub to an observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Observer attached successfully.
    #[serde(rename_all = "camelCase")]
    Connected {
        observer_id: ObserverId,
        timestamp: Timestamp,
    },

    /// A broadcast event.
    Event { event: HubEvent },

    /// Full session list, sent in reply to a state request.
    State { sessions: Vec<SessionSnapshot> },

    /// Heartbeat response.
    Pong { timestamp: Timestamp },

    Error { code: String, message: String },
}

// ============================================
// Observer → Server Messages
// ============================================

/// All message types that can be received from an observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,

    /// Request the full session list (after reconnection).
    #[serde(rename = "request.state")]
    RequestState,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    #[test]
    fn event_message_nests_tagged_event() {
        let session_id = SessionId::new();
        let msg = ServerMessage::Event {
            event: HubEvent::SessionRemoved {
                session_id,
                occurred_at: Timestamp::from_unix_millis(0),
            },
        };

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "event");
        assert_eq!(json["event"]["type"], "sessionRemoved");
        assert_eq!(json["event"]["sessionId"], session_id.to_string());
    }

    #[test]
    fn connected_message_uses_camel_case_fields() {
        let msg = ServerMessage::Connected {
            observer_id: ObserverId::new(),
            timestamp: Timestamp::from_unix_millis(0),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(r#""observerId""#));
    }

    #[test]
    fn server_message_decodes_what_it_encodes() {
        let msg = ServerMessage::Pong {
            timestamp: Timestamp::from_unix_millis(42),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(serde_json::from_str::<ServerMessage>(&json).unwrap(), msg);
    }

    #[test]
    fn client_message_deserializes_ping() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn client_message_deserializes_request_state() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "request.state"}"#).unwrap();
        assert_eq!(msg, ClientMessage::RequestState);
    }
}
