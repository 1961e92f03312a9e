//! Connection state of an observer client.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// ```text
/// Disconnected ──► Connecting ──► Connected
///      ▲               │              │
///      └───────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ClientState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ClientState::Connected)
    }
}

impl StateMachine for ClientState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ClientState::*;
        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Disconnected)
                | (Connected, Disconnected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ClientState::*;
        match self {
            Disconnected => vec![Connecting],
            Connecting => vec![Connected, Disconnected],
            Connected => vec![Disconnected],
        }
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ClientState::Disconnected => "disconnected",
            ClientState::Connecting => "connecting",
            ClientState::Connected => "connected",
        };
        write!(f, "{}", s)
    }
}
