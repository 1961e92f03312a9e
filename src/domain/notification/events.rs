//! Events broadcast to observers.
//!
//! Every event that reaches an observer is one variant of [`HubEvent`].
//! Observers dispatch with an exhaustive `match`, so adding a variant forces
//! every consumer to decide how to handle it.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::session::{PairedIdentity, SessionState};

/// Immutable event pushed to every attached observer.
///
/// Serialized with a `type` tag carrying the event kind:
///
/// ```json
/// {"type":"sessionCreated","sessionId":"…","label":"Sales","occurredAt":"…"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HubEvent {
    /// A fresh pairing payload was issued (start or refresh).
    #[serde(rename_all = "camelCase")]
    PairingPayloadIssued {
        session_id: SessionId,
        payload: String,
        issued_at: Timestamp,
        expires_at: Timestamp,
    },

    /// A session moved to a new lifecycle state.
    #[serde(rename_all = "camelCase")]
    SessionStateChanged {
        session_id: SessionId,
        state: SessionState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        paired_identity: Option<PairedIdentity>,
        occurred_at: Timestamp,
    },

    /// The messaging collaborator received a message on a session.
    #[serde(rename_all = "camelCase")]
    MessageReceived {
        session_id: SessionId,
        message: JsonValue,
        occurred_at: Timestamp,
    },

    /// The messaging collaborator sent a message on a session.
    #[serde(rename_all = "camelCase")]
    MessageSent {
        session_id: SessionId,
        message: JsonValue,
        occurred_at: Timestamp,
    },

    #[serde(rename_all = "camelCase")]
    SessionCreated {
        session_id: SessionId,
        label: String,
        occurred_at: Timestamp,
    },

    #[serde(rename_all = "camelCase")]
    SessionRemoved {
        session_id: SessionId,
        occurred_at: Timestamp,
    },
}

impl HubEvent {
    /// The event's kind, for handler lookup.
    pub fn kind(&self) -> EventKind {
        match self {
            HubEvent::PairingPayloadIssued { .. } => EventKind::PairingPayloadIssued,
            HubEvent::SessionStateChanged { .. } => EventKind::SessionStateChanged,
            HubEvent::MessageReceived { .. } => EventKind::MessageReceived,
            HubEvent::MessageSent { .. } => EventKind::MessageSent,
            HubEvent::SessionCreated { .. } => EventKind::SessionCreated,
            HubEvent::SessionRemoved { .. } => EventKind::SessionRemoved,
        }
    }

    /// The session the event concerns.
    pub fn session_id(&self) -> SessionId {
        match self {
            HubEvent::PairingPayloadIssued { session_id, .. }
            | HubEvent::SessionStateChanged { session_id, .. }
            | HubEvent::MessageReceived { session_id, .. }
            | HubEvent::MessageSent { session_id, .. }
            | HubEvent::SessionCreated { session_id, .. }
            | HubEvent::SessionRemoved { session_id, .. } => *session_id,
        }
    }
}

/// Fieldless mirror of [`HubEvent`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    PairingPayloadIssued,
    SessionStateChanged,
    MessageReceived,
    MessageSent,
    SessionCreated,
    SessionRemoved,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::PairingPayloadIssued => "pairingPayloadIssued",
            EventKind::SessionStateChanged => "sessionStateChanged",
            EventKind::MessageReceived => "messageReceived",
            EventKind::MessageSent => "messageSent",
            EventKind::SessionCreated => "sessionCreated",
            EventKind::SessionRemoved => "sessionRemoved",
        };
        write!(f, "{}", s)
    }
}

/// Which way a message travelled, from the session's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}
