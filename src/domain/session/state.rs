//! SessionState enum for tracking the pairing lifecycle of a session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of a pairing session.
///
/// ```text
///                 start
/// Disconnected ──────────► Connecting ──► AwaitingPairing ──► Paired
///      ▲                       ▲   │            │  confirm       │
///      │                       └───┘◄───────────┘ (refresh)      │
///      └──────────────── disconnect (from any state) ────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Connecting,
    AwaitingPairing,
    Paired,
    #[default]
    Disconnected,
}

impl SessionState {
    /// Returns true if a pairing payload may be attached in this state.
    pub fn holds_pairing_payload(&self) -> bool {
        matches!(self, SessionState::AwaitingPairing)
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Disconnected, Connecting)
                | (Connecting, Connecting)
                | (Connecting, AwaitingPairing)
                | (AwaitingPairing, Connecting)
                | (AwaitingPairing, Paired)
                | (Connecting, Disconnected)
                | (AwaitingPairing, Disconnected)
                | (Paired, Disconnected)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Disconnected => vec![Connecting],
            Connecting => vec![Connecting, AwaitingPairing, Disconnected],
            AwaitingPairing => vec![Connecting, Paired, Disconnected],
            Paired => vec![Disconnected],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Connecting => "connecting",
            SessionState::AwaitingPairing => "awaiting_pairing",
            SessionState::Paired => "paired",
            SessionState::Disconnected => "disconnected",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionState::*;

    const ALL: [SessionState; 4] = [Connecting, AwaitingPairing, Paired, Disconnected];

    #[test]
    fn default_is_disconnected() {
        assert_eq!(SessionState::default(), Disconnected);
    }

    #[test]
    fn connecting_cannot_skip_to_paired() {
        assert!(Connecting.transition_to(Paired).is_err());
    }

    #[test]
    fn disconnected_cannot_skip_to_awaiting_pairing() {
        assert!(Disconnected.transition_to(AwaitingPairing).is_err());
    }

    #[test]
    fn paired_only_leaves_through_disconnect() {
        assert_eq!(Paired.valid_transitions(), vec![Disconnected]);
        assert!(Paired.transition_to(Connecting).is_err());
    }

    #[test]
    fn awaiting_pairing_can_refresh_through_connecting() {
        assert_eq!(AwaitingPairing.transition_to(Connecting), Ok(Connecting));
    }

    #[test]
    fn invalid_transition_reports_both_ends() {
        let err = Disconnected.transition_to(Paired).unwrap_err();
        assert_eq!(err.from, Disconnected);
        assert_eq!(err.to, Paired);
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn only_awaiting_pairing_holds_payload() {
        for state in ALL {
            assert_eq!(state.holds_pairing_payload(), state == AwaitingPairing);
        }
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&AwaitingPairing).unwrap(),
            "\"awaiting_pairing\""
        );
        let state: SessionState = serde_json::from_str("\"paired\"").unwrap();
        assert_eq!(state, Paired);
    }

    #[test]
    fn display_matches_wire_format() {
        for state in ALL {
            assert_eq!(
                format!("\"{}\"", state),
                serde_json::to_string(&state).unwrap()
            );
        }
    }
}
