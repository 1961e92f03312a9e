//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `Clock` - Current time, injectable for deterministic expiry
//! - `EventPublisher` - Fire-and-forget event fan-out
//! - `Scheduler` - Cancellable one-shot timers for reconnect backoff
//! - `Connector` / `ObserverTransport` - Observer-side hub connection

mod clock;
mod event_publisher;
mod observer_transport;
mod scheduler;

pub use clock::Clock;
pub use event_publisher::EventPublisher;
pub use observer_transport::{Connector, ObserverTransport, TransportError};
pub use scheduler::{Scheduler, Timer, TimerTrigger};
