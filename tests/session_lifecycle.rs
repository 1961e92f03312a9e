//! Integration tests for the session pairing lifecycle.
//!
//! Drives `SessionManager` through the public API with a manual clock, so
//! payload expiry is exercised without sleeping.

use std::sync::Arc;
use std::time::Duration;

use pairlink::adapters::{InMemoryEventBus, ManualClock, NotificationHub};
use pairlink::application::SessionManager;
use pairlink::domain::notification::{EventKind, HubEvent, ServerMessage};
use pairlink::domain::session::{
    SessionError, SessionSnapshot, SessionState, DEFAULT_PAIRING_TTL,
};
use pairlink::ports::Clock;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn manager_with_bus() -> (SessionManager, Arc<InMemoryEventBus>, Arc<ManualClock>) {
    let bus = Arc::new(InMemoryEventBus::new());
    let clock = Arc::new(ManualClock::default());
    let manager = SessionManager::new(bus.clone(), clock.clone(), DEFAULT_PAIRING_TTL);
    (manager, bus, clock)
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn sales_session_end_to_end() {
    let (manager, bus, clock) = manager_with_bus();

    let id = manager.create_session("Sales").await.id;

    let issued = manager.start_session(&id).await.unwrap();
    let live = manager.get_pairing_payload(&id).await.unwrap();
    assert_eq!(live.as_ref().map(|p| p.value()), Some(issued.value()));
    assert_eq!(
        manager.get_session(&id).await.unwrap().pairing_expires_at,
        Some(clock.now().plus(DEFAULT_PAIRING_TTL))
    );

    clock.advance(DEFAULT_PAIRING_TTL + Duration::from_secs(1));
    assert!(manager.get_pairing_payload(&id).await.unwrap().is_none());

    let refreshed = manager.start_session(&id).await.unwrap();
    assert_ne!(refreshed.value(), issued.value());

    let identity = manager.confirm_pairing(&id).await.unwrap();
    let paired = manager.get_session(&id).await.unwrap();
    assert_eq!(paired.state, SessionState::Paired);
    assert!(paired.pairing_payload.is_none());
    assert_eq!(paired.paired_identity, Some(identity));

    manager.disconnect_session(&id).await.unwrap();
    let disconnected = manager.get_session(&id).await.unwrap();
    assert_eq!(disconnected.state, SessionState::Disconnected);
    assert!(disconnected.paired_identity.is_none());

    assert_eq!(
        bus.published_kinds(),
        vec![
            EventKind::SessionCreated,
            EventKind::PairingPayloadIssued,
            EventKind::SessionStateChanged,
            EventKind::PairingPayloadIssued,
            EventKind::SessionStateChanged,
            EventKind::SessionStateChanged,
            EventKind::SessionStateChanged,
        ]
    );
}

#[tokio::test]
async fn every_operation_on_removed_session_is_not_found() {
    let (manager, _bus, _clock) = manager_with_bus();
    let id = manager.create_session("Support").await.id;
    manager.start_session(&id).await.unwrap();

    manager.remove_session(&id).await.unwrap();

    assert!(matches!(manager.get_session(&id).await, Err(SessionError::NotFound(_))));
    assert!(matches!(manager.start_session(&id).await, Err(SessionError::NotFound(_))));
    assert!(matches!(manager.confirm_pairing(&id).await, Err(SessionError::NotFound(_))));
    assert!(matches!(manager.disconnect_session(&id).await, Err(SessionError::NotFound(_))));
    assert!(matches!(manager.remove_session(&id).await, Err(SessionError::NotFound(_))));
    assert!(manager.list_sessions().await.is_empty());
}

#[tokio::test]
async fn payload_and_identity_never_coexist() {
    let (manager, _bus, _clock) = manager_with_bus();
    let id = manager.create_session("Sales").await.id;

    let check = |snapshot: SessionSnapshot| {
        assert!(
            !(snapshot.pairing_payload.is_some() && snapshot.paired_identity.is_some()),
            "both present in {:?}",
            snapshot.state
        );
    };

    check(manager.get_session(&id).await.unwrap());
    manager.start_session(&id).await.unwrap();
    check(manager.get_session(&id).await.unwrap());
    manager.confirm_pairing(&id).await.unwrap();
    check(manager.get_session(&id).await.unwrap());
    manager.disconnect_session(&id).await.unwrap();
    check(manager.get_session(&id).await.unwrap());
}

#[tokio::test]
async fn manager_events_reach_hub_observers_in_order() {
    let hub = Arc::new(NotificationHub::default());
    let manager = SessionManager::new(
        hub.clone(),
        Arc::new(ManualClock::default()),
        DEFAULT_PAIRING_TTL,
    );
    let mut observer = hub.attach().await;

    let id = manager.create_session("Sales").await.id;
    manager.start_session(&id).await.unwrap();

    let mut kinds = Vec::new();
    for _ in 0..3 {
        let frame = observer.frames.recv().await.unwrap();
        match serde_json::from_str::<ServerMessage>(&frame).unwrap() {
            ServerMessage::Event { event } => {
                assert_eq!(event.session_id(), id);
                kinds.push(event.kind());
                if let HubEvent::SessionStateChanged { state, .. } = event {
                    assert_eq!(state, SessionState::AwaitingPairing);
                }
            }
            other => panic!("expected event, got {:?}", other),
        }
    }
    assert_eq!(
        kinds,
        vec![
            EventKind::SessionCreated,
            EventKind::PairingPayloadIssued,
            EventKind::SessionStateChanged,
        ]
    );
}
