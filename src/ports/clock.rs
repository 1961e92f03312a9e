//! Clock port - Injectable source of the current time.
//!
//! Pairing expiry is evaluated lazily from wall-clock reads; routing those
//! reads through this port keeps expiry deterministic under test.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
