//! In-memory event bus for testing.
//!
//! Records every published event so tests can assert on what the session
//! manager emitted, in order.

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::foundation::SessionId;
use crate::domain::notification::{EventKind, HubEvent};
use crate::ports::EventPublisher;

/// In-memory event bus for testing.
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// let manager = SessionManager::new(bus.clone(), clock, ttl);
///
/// manager.create_session("Sales").await;
/// assert!(bus.has_event(EventKind::SessionCreated));
/// ```
#[derive(Default)]
pub struct InMemoryEventBus {
    published: RwLock<Vec<HubEvent>>,
}

impl InMemoryEventBus {
    /// Creates a new empty event bus.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all published events.
    pub fn published_events(&self) -> Vec<HubEvent> {
        self.published.read().clone()
    }

    /// Returns the kinds of all published events, in order.
    pub fn published_kinds(&self) -> Vec<EventKind> {
        self.published.read().iter().map(HubEvent::kind).collect()
    }

    /// Returns events of a specific kind.
    pub fn events_of_kind(&self, kind: EventKind) -> Vec<HubEvent> {
        self.published
            .read()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    /// Returns events for a specific session.
    pub fn events_for_session(&self, session_id: &SessionId) -> Vec<HubEvent> {
        self.published
            .read()
            .iter()
            .filter(|e| &e.session_id() == session_id)
            .cloned()
            .collect()
    }

    /// Clears all published events (for test isolation).
    pub fn clear(&self) {
        self.published.write().clear();
    }

    pub fn event_count(&self) -> usize {
        self.published.read().len()
    }

    pub fn has_event(&self, kind: EventKind) -> bool {
        self.published.read().iter().any(|e| e.kind() == kind)
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: HubEvent) {
        self.published.write().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;

    fn removed(session_id: SessionId) -> HubEvent {
        HubEvent::SessionRemoved {
            session_id,
            occurred_at: Timestamp::from_unix_millis(0),
        }
    }

    fn created(session_id: SessionId) -> HubEvent {
        HubEvent::SessionCreated {
            session_id,
            label: "Support".to_string(),
            occurred_at: Timestamp::from_unix_millis(0),
        }
    }

    #[tokio::test]
    async fn publish_stores_event() {
        let bus = InMemoryEventBus::new();
        bus.publish(created(SessionId::new())).await;

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event(EventKind::SessionCreated));
        assert!(!bus.has_event(EventKind::SessionRemoved));
    }

    #[tokio::test]
    async fn events_of_kind_filters_correctly() {
        let bus = InMemoryEventBus::new();
        bus.publish(created(SessionId::new())).await;
        bus.publish(removed(SessionId::new())).await;
        bus.publish(created(SessionId::new())).await;

        assert_eq!(bus.events_of_kind(EventKind::SessionCreated).len(), 2);
    }

    #[tokio::test]
    async fn events_for_session_filters_correctly() {
        let bus = InMemoryEventBus::new();
        let session_id = SessionId::new();
        bus.publish(created(session_id)).await;
        bus.publish(created(SessionId::new())).await;
        bus.publish(removed(session_id)).await;

        assert_eq!(bus.events_for_session(&session_id).len(), 2);
    }

    #[tokio::test]
    async fn publish_all_preserves_order() {
        let bus = InMemoryEventBus::new();
        let session_id = SessionId::new();
        bus.publish_all(vec![created(session_id), removed(session_id)])
            .await;

        assert_eq!(
            bus.published_kinds(),
            vec![EventKind::SessionCreated, EventKind::SessionRemoved]
        );
    }

    #[tokio::test]
    async fn clear_removes_all_events() {
        let bus = InMemoryEventBus::new();
        bus.publish(created(SessionId::new())).await;
        bus.clear();
        assert_eq!(bus.event_count(), 0);
    }
}
