//! Observer-side view cache and the invalidation rules that keep it honest.
//!
//! The cache holds whatever the consumer last fetched for a key. Incoming
//! events never patch cached values; they only evict the keys they make
//! stale, and the consumer refetches on its next read.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use crate::domain::foundation::SessionId;
use crate::domain::notification::HubEvent;

/// Addressable cached views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The session list.
    Sessions,
    /// Message history of one session.
    Messages(SessionId),
}

/// Keys an event makes stale.
pub fn invalidation_targets(event: &HubEvent) -> Vec<CacheKey> {
    match event {
        HubEvent::PairingPayloadIssued { .. } => Vec::new(),
        HubEvent::SessionStateChanged { .. } | HubEvent::SessionCreated { .. } => {
            vec![CacheKey::Sessions]
        }
        // A removed session never gets another message event, so its history
        // has to go now.
        HubEvent::SessionRemoved { session_id, .. }
        | HubEvent::MessageReceived { session_id, .. }
        | HubEvent::MessageSent { session_id, .. } => {
            vec![CacheKey::Messages(*session_id), CacheKey::Sessions]
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewCache {
    entries: RwLock<HashMap<CacheKey, JsonValue>>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<JsonValue> {
        self.entries.read().get(key).cloned()
    }

    pub fn put(&self, key: CacheKey, value: JsonValue) {
        self.entries.write().insert(key, value);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns true if the key was cached.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Evicts everything `event` makes stale and returns the evicted keys.
    pub fn apply(&self, event: &HubEvent) -> Vec<CacheKey> {
        let targets = invalidation_targets(event);
        let mut entries = self.entries.write();
        targets
            .into_iter()
            .filter(|key| entries.remove(key).is_some())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
