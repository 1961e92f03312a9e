//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Recording publisher for tests
//!
//! The production publisher is `adapters::websocket::NotificationHub`.

mod in_memory;

pub use in_memory::InMemoryEventBus;
