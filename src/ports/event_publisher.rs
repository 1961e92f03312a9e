//! EventPublisher port - Interface for publishing observer events.
//!
//! The session manager publishes lifecycle events through this port without
//! knowing how (or whether) they reach observers.

use async_trait::async_trait;

use crate::domain::notification::HubEvent;

/// Port for publishing events to observers.
///
/// Implementations must:
/// - Never block on a single slow consumer
/// - Never surface a consumer failure to the publisher (fire-and-forget)
///
/// # Example
///
/// ```ignore
/// publisher.publish(HubEvent::SessionRemoved { session_id, occurred_at }).await;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event, best-effort.
    async fn publish(&self, event: HubEvent);

    /// Publish several events in order.
    async fn publish_all(&self, events: Vec<HubEvent>) {
        for event in events {
            self.publish(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventPublisher) {}
}
