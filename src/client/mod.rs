//! Observer client - the consuming side of the notification hub.
//!
//! - [`backoff`] - Bounded exponential reconnect delays
//! - [`cache`] - View cache and per-event invalidation rules
//! - [`observer`] - Connection driver, handler dispatch, caller handle
//! - [`state`] - Client connection state machine

pub mod backoff;
pub mod cache;
pub mod observer;
pub mod state;

pub use backoff::{Backoff, BackoffPolicy, ReconnectDecision};
pub use cache::{invalidation_targets, CacheKey, ViewCache};
pub use observer::{
    ClientError, EventHandler, ObserverClient, ObserverCore, ObserverHandle, ObserverSignal,
};
pub use state::ClientState;
