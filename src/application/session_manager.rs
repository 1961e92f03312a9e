//! SessionManager - Owns every session and drives its lifecycle.
//!
//! Sessions live in a registry of per-session slots. The registry lock is
//! only held to look up, insert or remove a slot; every mutation runs under
//! the slot's own mutex, so operations on one session are linearized while
//! different sessions proceed independently.
//!
//! Each successful mutation publishes its events while still holding the
//! slot, which keeps the per-session event order identical to the order the
//! mutations were applied in.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::domain::notification::{HubEvent, MessageDirection};
use crate::domain::session::{
    PairedIdentity, PairingPayload, Session, SessionError, SessionSnapshot, SessionState,
};
use crate::ports::{Clock, EventPublisher};

/// A removed session leaves `None` behind so queued operations see `NotFound`.
type Slot = Arc<Mutex<Option<Session>>>;

/// Coordinates session state, pairing payloads and event publication.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Slot>>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    pairing_ttl: Duration,
}

impl SessionManager {
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        pairing_ttl: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            publisher,
            clock,
            pairing_ttl,
        }
    }

    pub fn pairing_ttl(&self) -> Duration {
        self.pairing_ttl
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new `Disconnected` session under `label`.
    pub async fn create_session(&self, label: impl Into<String>) -> SessionSnapshot {
        let now = self.clock.now();
        let session = Session::new(SessionId::new(), label, now);
        let session_id = *session.id();
        let label = session.label().to_string();
        let snapshot = session.snapshot(self.pairing_ttl, &now);

        let slot: Slot = Arc::new(Mutex::new(Some(session)));
        // Held until the creation event is out, so no later event for this
        // session can overtake it.
        let _guard = slot.lock().await;
        self.sessions.write().insert(session_id, Arc::clone(&slot));

        tracing::info!(session_id = %session_id, label = %label, "Session created");
        self.publisher
            .publish(HubEvent::SessionCreated {
                session_id,
                label,
                occurred_at: now,
            })
            .await;

        snapshot
    }

    /// Issue a fresh pairing payload and move the session to `AwaitingPairing`.
    ///
    /// Repeating the call while awaiting pairing replaces the payload and
    /// restarts its TTL.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session is already paired
    pub async fn start_session(&self, id: &SessionId) -> Result<PairingPayload, SessionError> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().await;
        let session = guard.as_mut().ok_or_else(|| SessionError::not_found(*id))?;

        let now = self.clock.now();
        let payload = session.begin_pairing(now)?.clone();
        let state = session.state();

        tracing::info!(
            session_id = %id,
            expires_at = %payload.expires_at(self.pairing_ttl).to_rfc3339(),
            "Pairing payload issued"
        );
        self.publisher
            .publish_all(vec![
                HubEvent::PairingPayloadIssued {
                    session_id: *id,
                    payload: payload.value().to_string(),
                    issued_at: payload.issued_at(),
                    expires_at: payload.expires_at(self.pairing_ttl),
                },
                HubEvent::SessionStateChanged {
                    session_id: *id,
                    state,
                    paired_identity: None,
                    occurred_at: now,
                },
            ])
            .await;

        Ok(payload)
    }

    /// Complete pairing and assign a fresh identity.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` unless awaiting pairing with an unexpired payload
    pub async fn confirm_pairing(&self, id: &SessionId) -> Result<PairedIdentity, SessionError> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().await;
        let session = guard.as_mut().ok_or_else(|| SessionError::not_found(*id))?;

        let now = self.clock.now();
        let identity = session.confirm_pairing(self.pairing_ttl, now)?.clone();

        tracing::info!(session_id = %id, identity = %identity, "Session paired");
        self.publisher
            .publish(HubEvent::SessionStateChanged {
                session_id: *id,
                state: SessionState::Paired,
                paired_identity: Some(identity.clone()),
                occurred_at: now,
            })
            .await;

        Ok(identity)
    }

    /// Drop the session to `Disconnected`.
    ///
    /// Already-disconnected sessions are left alone and no event is emitted.
    pub async fn disconnect_session(&self, id: &SessionId) -> Result<(), SessionError> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().await;
        let session = guard.as_mut().ok_or_else(|| SessionError::not_found(*id))?;

        let now = self.clock.now();
        if !session.disconnect(now) {
            tracing::debug!(session_id = %id, "Session already disconnected");
            return Ok(());
        }

        tracing::info!(session_id = %id, "Session disconnected");
        self.publisher
            .publish(HubEvent::SessionStateChanged {
                session_id: *id,
                state: SessionState::Disconnected,
                paired_identity: None,
                occurred_at: now,
            })
            .await;

        Ok(())
    }

    /// Delete the session whatever its state.
    pub async fn remove_session(&self, id: &SessionId) -> Result<(), SessionError> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock().await;
        if guard.take().is_none() {
            return Err(SessionError::not_found(*id));
        }

        {
            let mut sessions = self.sessions.write();
            if sessions.get(id).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                sessions.remove(id);
            }
        }

        tracing::info!(session_id = %id, "Session removed");
        self.publisher
            .publish(HubEvent::SessionRemoved {
                session_id: *id,
                occurred_at: self.clock.now(),
            })
            .await;

        Ok(())
    }

    /// Announce a message exchanged over the session's channel.
    ///
    /// The message itself is stored elsewhere; this only notifies observers.
    pub async fn record_message(
        &self,
        id: &SessionId,
        direction: MessageDirection,
        message: JsonValue,
    ) -> Result<(), SessionError> {
        let slot = self.slot(id)?;
        let guard = slot.lock().await;
        if guard.is_none() {
            return Err(SessionError::not_found(*id));
        }

        let occurred_at = self.clock.now();
        let event = match direction {
            MessageDirection::Inbound => HubEvent::MessageReceived {
                session_id: *id,
                message,
                occurred_at,
            },
            MessageDirection::Outbound => HubEvent::MessageSent {
                session_id: *id,
                message,
                occurred_at,
            },
        };

        tracing::debug!(session_id = %id, direction = ?direction, "Message recorded");
        self.publisher.publish(event).await;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The live pairing payload, or `None` once paired, disconnected or expired.
    pub async fn get_pairing_payload(
        &self,
        id: &SessionId,
    ) -> Result<Option<PairingPayload>, SessionError> {
        let slot = self.slot(id)?;
        let guard = slot.lock().await;
        let session = guard.as_ref().ok_or_else(|| SessionError::not_found(*id))?;

        let now = self.clock.now();
        Ok(session.active_pairing(self.pairing_ttl, &now).cloned())
    }

    pub async fn get_session(&self, id: &SessionId) -> Result<SessionSnapshot, SessionError> {
        let slot = self.slot(id)?;
        let guard = slot.lock().await;
        let session = guard.as_ref().ok_or_else(|| SessionError::not_found(*id))?;

        Ok(session.snapshot(self.pairing_ttl, &self.clock.now()))
    }

    /// Snapshots of every session, oldest first.
    pub async fn list_sessions(&self) -> Vec<SessionSnapshot> {
        let slots: Vec<Slot> = self.sessions.read().values().cloned().collect();
        let now = self.clock.now();

        let mut snapshots = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(session) = slot.lock().await.as_ref() {
                snapshots.push(session.snapshot(self.pairing_ttl, &now));
            }
        }
        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        snapshots
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    fn slot(&self, id: &SessionId) -> Result<Slot, SessionError> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::not_found(*id))
    }
}
