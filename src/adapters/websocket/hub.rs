//! Observer fan-out for session and message events.
//!
//! Every attached observer owns a bounded outbound queue. Broadcasting
//! serializes the event once and `try_send`s it to each queue, so one slow
//! or broken observer never delays the others.
//!
//! ```text
//! broadcast(event)
//!   ├── observer-a  queue ── ok
//!   ├── observer-b  queue ── full/closed ── dropped + detached
//!   └── observer-c  queue ── ok
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use crate::domain::foundation::{ObserverId, Timestamp};
use crate::domain::notification::{HubEvent, ServerMessage};
use crate::ports::EventPublisher;

/// Default per-observer queue capacity.
pub const DEFAULT_OBSERVER_CAPACITY: usize = 64;

/// Serialized frame queued for one observer.
pub type Frame = Arc<String>;

/// Receiving half handed to the transport that owns the observer's socket.
pub struct AttachedObserver {
    pub id: ObserverId,
    pub frames: mpsc::Receiver<Frame>,
}

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Registry of attached observers and the fan-out over them.
///
/// # Thread Safety
///
/// Uses `RwLock` for the registry since broadcasts (reads) vastly outnumber
/// attaches/detaches (writes). The write lock is only taken to prune
/// observers that failed a send.
pub struct NotificationHub {
    observers: RwLock<HashMap<ObserverId, mpsc::Sender<Frame>>>,
    channel_capacity: usize,
}

impl NotificationHub {
    /// Create a hub whose observers each buffer up to `channel_capacity` frames.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            observers: RwLock::new(HashMap::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_OBSERVER_CAPACITY)
    }

    /// Register a new observer and return its outbound queue.
    pub async fn attach(&self) -> AttachedObserver {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let id = ObserverId::new();
        self.observers.write().await.insert(id, tx);

        tracing::debug!(observer_id = %id, "Observer attached");
        AttachedObserver { id, frames: rx }
    }

    /// Unregister an observer. Unknown or already-detached ids are a no-op.
    pub async fn detach(&self, observer_id: &ObserverId) {
        if self.observers.write().await.remove(observer_id).is_some() {
            tracing::debug!(observer_id = %observer_id, "Observer detached");
        }
    }

    /// Deliver an event to every attached observer, best-effort.
    ///
    /// Observers whose queue is full or closed miss this event and are
    /// detached; the caller is never told about individual failures.
    pub async fn broadcast(&self, event: &HubEvent) -> BroadcastReport {
        let message = ServerMessage::Event {
            event: event.clone(),
        };
        let frame = match serde_json::to_string(&message) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                tracing::warn!(event_type = %event.kind(), error = %e, "Failed to serialize event");
                return BroadcastReport::default();
            }
        };

        let mut report = BroadcastReport::default();
        let mut failed = Vec::new();
        {
            let observers = self.observers.read().await;
            for (id, tx) in observers.iter() {
                match tx.try_send(Arc::clone(&frame)) {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            observer_id = %id,
                            event_type = %event.kind(),
                            reason = %e,
                            "Dropping event for unusable observer"
                        );
                        report.dropped += 1;
                        failed.push(*id);
                    }
                }
            }
        }

        for id in &failed {
            self.detach(id).await;
        }

        tracing::debug!(
            event_type = %event.kind(),
            session_id = %event.session_id(),
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast event"
        );
        report
    }

    /// Queue a message for a single observer (connection acks, pongs, state).
    ///
    /// Returns `false` if the observer is unknown or its queue is unusable.
    pub async fn send_to(&self, observer_id: &ObserverId, message: &ServerMessage) -> bool {
        let Ok(json) = serde_json::to_string(message) else {
            return false;
        };
        let observers = self.observers.read().await;
        match observers.get(observer_id) {
            Some(tx) => tx.try_send(Arc::new(json)).is_ok(),
            None => false,
        }
    }

    /// Acknowledge a freshly attached observer.
    pub async fn greet(&self, observer_id: &ObserverId) -> bool {
        let connected = ServerMessage::Connected {
            observer_id: *observer_id,
            timestamp: Timestamp::now(),
        };
        self.send_to(observer_id, &connected).await
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.read().await.len()
    }

    pub async fn is_attached(&self, observer_id: &ObserverId) -> bool {
        self.observers.read().await.contains_key(observer_id)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl EventPublisher for NotificationHub {
    async fn publish(&self, event: HubEvent) {
        self.broadcast(&event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;

    fn created(session_id: SessionId) -> HubEvent {
        HubEvent::SessionCreated {
            session_id,
            label: "Sales".to_string(),
            occurred_at: Timestamp::from_unix_millis(0),
        }
    }

    fn decode(frame: &Frame) -> HubEvent {
        match serde_json::from_str::<ServerMessage>(frame).unwrap() {
            ServerMessage::Event { event } => event,
            other => panic!("expected event frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn attach_registers_observer() {
        let hub = NotificationHub::default();
        let observer = hub.attach().await;

        assert_eq!(hub.observer_count().await, 1);
        assert!(hub.is_attached(&observer.id).await);
    }

    #[tokio::test]
    async fn detach_is_idempotent() {
        let hub = NotificationHub::default();
        let observer = hub.attach().await;

        hub.detach(&observer.id).await;
        hub.detach(&observer.id).await;
        hub.detach(&ObserverId::new()).await;

        assert_eq!(hub.observer_count().await, 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_observer() {
        let hub = NotificationHub::default();
        let mut a = hub.attach().await;
        let mut b = hub.attach().await;
        let session_id = SessionId::new();

        let report = hub.broadcast(&created(session_id)).await;

        assert_eq!(report, BroadcastReport { delivered: 2, dropped: 0 });
        assert_eq!(decode(&a.frames.recv().await.unwrap()).session_id(), session_id);
        assert_eq!(decode(&b.frames.recv().await.unwrap()).session_id(), session_id);
    }

    #[tokio::test]
    async fn closed_observer_is_dropped_and_detached() {
        let hub = NotificationHub::default();
        let mut healthy = hub.attach().await;
        let broken = hub.attach().await;
        let broken_id = broken.id;
        drop(broken.frames);

        let report = hub.broadcast(&created(SessionId::new())).await;

        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert!(healthy.frames.recv().await.is_some());
        assert!(!hub.is_attached(&broken_id).await);
    }

    #[tokio::test]
    async fn full_observer_does_not_block_broadcast() {
        let hub = NotificationHub::new(1);
        let _stalled = hub.attach().await;
        let mut live = hub.attach().await;

        hub.broadcast(&created(SessionId::new())).await;
        let _ = live.frames.recv().await;

        // Second broadcast overflows the stalled queue only.
        let report = hub.broadcast(&created(SessionId::new())).await;

        assert_eq!(report, BroadcastReport { delivered: 1, dropped: 1 });
        assert_eq!(hub.observer_count().await, 1);
        assert!(live.frames.recv().await.is_some());
    }

    #[tokio::test]
    async fn broadcast_with_no_observers_is_noop() {
        let hub = NotificationHub::default();
        let report = hub.broadcast(&created(SessionId::new())).await;
        assert_eq!(report, BroadcastReport::default());
    }

    #[tokio::test]
    async fn send_to_targets_single_observer() {
        let hub = NotificationHub::default();
        let mut a = hub.attach().await;
        let mut b = hub.attach().await;

        assert!(hub.greet(&a.id).await);

        let frame = a.frames.recv().await.unwrap();
        assert!(frame.contains(r#""type":"connected""#));
        assert!(b.frames.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_to_unknown_observer_returns_false() {
        let hub = NotificationHub::default();
        let pong = ServerMessage::Pong {
            timestamp: Timestamp::now(),
        };
        assert!(!hub.send_to(&ObserverId::new(), &pong).await);
    }

    #[tokio::test]
    async fn publisher_port_broadcasts() {
        let hub = NotificationHub::default();
        let mut observer = hub.attach().await;

        EventPublisher::publish(&hub, created(SessionId::new())).await;

        assert!(observer.frames.recv().await.is_some());
    }
}
