//! Pairlink - Session pairing lifecycle with live observer notifications.
//!
//! A session moves from `Disconnected` through `Connecting` and
//! `AwaitingPairing` (holding a short-lived pairing payload) to `Paired`.
//! Every change is broadcast to attached observers, and the bundled
//! observer client keeps itself connected with bounded backoff.

pub mod adapters;
pub mod application;
pub mod client;
pub mod config;
pub mod domain;
pub mod ports;
