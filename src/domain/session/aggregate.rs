//! Session aggregate entity.
//!
//! A session is one logical pairing channel. It owns its state, at most one
//! live pairing payload, and (once paired) the identity assigned by the
//! confirming party.

use std::time::Duration;

use serde::Serialize;

use crate::domain::foundation::{SessionId, StateMachine, Timestamp};

use super::{PairedIdentity, PairingPayload, SessionError, SessionState};

/// Session aggregate - one pairing channel tracked in memory.
///
/// # Invariants
///
/// - `pairing` is `Some` only while `state == AwaitingPairing`
/// - `paired_identity` is `Some` only while `state == Paired`
/// - `pairing` and `paired_identity` are never both `Some`
/// - every state change is validated by [`StateMachine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    label: String,
    state: SessionState,
    pairing: Option<PairingPayload>,
    paired_identity: Option<PairedIdentity>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Session {
    /// Create a new disconnected session.
    pub fn new(id: SessionId, label: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id,
            label: label.into(),
            state: SessionState::Disconnected,
            pairing: None,
            paired_identity: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the stored payload regardless of TTL.
    ///
    /// Use [`Session::active_pairing`] for anything user-facing.
    pub fn pairing(&self) -> Option<&PairingPayload> {
        self.pairing.as_ref()
    }

    pub fn paired_identity(&self) -> Option<&PairedIdentity> {
        self.paired_identity.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns the payload only if the session is awaiting pairing and the
    /// payload is still inside its TTL at `now`.
    pub fn active_pairing(&self, ttl: Duration, now: &Timestamp) -> Option<&PairingPayload> {
        if !self.state.holds_pairing_payload() {
            return None;
        }
        self.pairing
            .as_ref()
            .filter(|payload| !payload.is_expired(ttl, now))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Move through `Connecting` into `AwaitingPairing` with a fresh payload.
    ///
    /// Calling this again while awaiting pairing regenerates the payload and
    /// restarts its TTL.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is already paired
    pub fn begin_pairing(&mut self, now: Timestamp) -> Result<&PairingPayload, SessionError> {
        let awaiting = self
            .state
            .transition_to(SessionState::Connecting)
            .and_then(|connecting| connecting.transition_to(SessionState::AwaitingPairing))
            .map_err(|_| SessionError::invalid_state(self.state, "start session"))?;

        self.state = awaiting;
        self.updated_at = now;
        Ok(self.pairing.insert(PairingPayload::generate(now)))
    }

    /// Confirm the pairing and assign a fresh identity.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not awaiting pairing, or the
    ///   payload has already expired
    pub fn confirm_pairing(
        &mut self,
        ttl: Duration,
        now: Timestamp,
    ) -> Result<&PairedIdentity, SessionError> {
        let paired = self
            .state
            .transition_to(SessionState::Paired)
            .map_err(|_| SessionError::invalid_state(self.state, "confirm pairing"))?;

        if self.active_pairing(ttl, &now).is_none() {
            return Err(SessionError::invalid_state(
                self.state,
                "confirm an expired pairing payload",
            ));
        }

        self.state = paired;
        self.pairing = None;
        self.updated_at = now;
        Ok(self.paired_identity.insert(PairedIdentity::assign()))
    }

    /// Drop to `Disconnected`, clearing payload and identity.
    ///
    /// Returns `false` without touching anything if already disconnected.
    pub fn disconnect(&mut self, now: Timestamp) -> bool {
        match self.state.transition_to(SessionState::Disconnected) {
            Ok(disconnected) => {
                self.state = disconnected;
                self.pairing = None;
                self.paired_identity = None;
                self.updated_at = now;
                true
            }
            Err(_) => false,
        }
    }

    /// Read model as exposed to callers at `now`.
    pub fn snapshot(&self, ttl: Duration, now: &Timestamp) -> SessionSnapshot {
        let pairing = self.active_pairing(ttl, now);
        SessionSnapshot {
            id: self.id,
            label: self.label.clone(),
            state: self.state,
            pairing_payload: pairing.map(|p| p.value().to_string()),
            pairing_expires_at: pairing.map(|p| p.expires_at(ttl)),
            paired_identity: self.paired_identity.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Point-in-time view of a session with expiry already evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub label: String,
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pairing_payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pairing_expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub paired_identity: Option<PairedIdentity>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::DEFAULT_PAIRING_TTL;

    const TTL: Duration = DEFAULT_PAIRING_TTL;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_millis(secs * 1_000)
    }

    fn test_session() -> Session {
        Session::new(SessionId::new(), "Sales", at(0))
    }

    fn assert_exclusive(session: &Session) {
        assert!(
            !(session.pairing().is_some() && session.paired_identity().is_some()),
            "payload and identity both present in {:?}",
            session.state()
        );
    }

    // Construction tests

    #[test]
    fn new_session_is_disconnected_without_payload() {
        let session = test_session();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.pairing().is_none());
        assert!(session.paired_identity().is_none());
        assert_eq!(session.label(), "Sales");
    }

    // Pairing tests

    #[test]
    fn begin_pairing_moves_to_awaiting_with_payload() {
        let mut session = test_session();
        let payload = session.begin_pairing(at(1)).unwrap().clone();

        assert_eq!(session.state(), SessionState::AwaitingPairing);
        assert_eq!(payload.issued_at(), at(1));
        assert_exclusive(&session);
    }

    #[test]
    fn begin_pairing_twice_refreshes_payload_and_ttl() {
        let mut session = test_session();
        let first = session.begin_pairing(at(1)).unwrap().clone();
        let second = session.begin_pairing(at(50)).unwrap().clone();

        assert_ne!(first.value(), second.value());
        assert_eq!(second.issued_at(), at(50));
        assert!(session.active_pairing(TTL, &at(100)).is_some());
    }

    #[test]
    fn begin_pairing_rejected_when_paired() {
        let mut session = test_session();
        session.begin_pairing(at(1)).unwrap();
        session.confirm_pairing(TTL, at(2)).unwrap();

        let before = session.clone();
        let err = session.begin_pairing(at(3)).unwrap_err();

        assert_eq!(err, SessionError::invalid_state(SessionState::Paired, "start session"));
        assert_eq!(session, before);
    }

    #[test]
    fn active_pairing_hidden_after_ttl() {
        let mut session = test_session();
        session.begin_pairing(at(0)).unwrap();

        assert!(session.active_pairing(TTL, &at(59)).is_some());
        assert!(session.active_pairing(TTL, &at(60)).is_none());
        assert!(session.active_pairing(TTL, &at(60)).is_none());
    }

    // Confirmation tests

    #[test]
    fn confirm_pairing_assigns_identity_and_clears_payload() {
        let mut session = test_session();
        session.begin_pairing(at(0)).unwrap();
        let identity = session.confirm_pairing(TTL, at(5)).unwrap().clone();

        assert_eq!(session.state(), SessionState::Paired);
        assert!(session.pairing().is_none());
        assert_eq!(session.paired_identity(), Some(&identity));
        assert_exclusive(&session);
    }

    #[test]
    fn confirm_pairing_on_disconnected_fails_without_mutation() {
        let mut session = test_session();
        let before = session.clone();

        let err = session.confirm_pairing(TTL, at(1)).unwrap_err();

        assert!(matches!(
            err,
            SessionError::InvalidState {
                current: SessionState::Disconnected,
                ..
            }
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn confirm_pairing_twice_fails() {
        let mut session = test_session();
        session.begin_pairing(at(0)).unwrap();
        session.confirm_pairing(TTL, at(1)).unwrap();

        assert!(session.confirm_pairing(TTL, at(2)).is_err());
    }

    #[test]
    fn confirm_pairing_with_expired_payload_fails() {
        let mut session = test_session();
        session.begin_pairing(at(0)).unwrap();
        let before = session.clone();

        assert!(session.confirm_pairing(TTL, at(60)).is_err());
        assert_eq!(session, before);
    }

    // Disconnect tests

    #[test]
    fn disconnect_clears_identity() {
        let mut session = test_session();
        session.begin_pairing(at(0)).unwrap();
        session.confirm_pairing(TTL, at(1)).unwrap();

        assert!(session.disconnect(at(2)));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.paired_identity().is_none());
        assert!(session.pairing().is_none());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut session = test_session();
        let before = session.clone();

        assert!(!session.disconnect(at(5)));
        assert_eq!(session, before);
    }

    // Snapshot tests

    #[test]
    fn snapshot_reports_live_payload_with_expiry() {
        let mut session = test_session();
        let payload = session.begin_pairing(at(10)).unwrap().clone();

        let snapshot = session.snapshot(TTL, &at(20));
        assert_eq!(snapshot.pairing_payload.as_deref(), Some(payload.value()));
        assert_eq!(snapshot.pairing_expires_at, Some(at(70)));
    }

    #[test]
    fn snapshot_omits_expired_payload() {
        let mut session = test_session();
        session.begin_pairing(at(10)).unwrap();

        let snapshot = session.snapshot(TTL, &at(70));
        assert_eq!(snapshot.state, SessionState::AwaitingPairing);
        assert!(snapshot.pairing_payload.is_none());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("pairingPayload").is_none());
    }
}
