//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `session` - Pairing session lifecycle and payloads
//! - `notification` - Events broadcast to observers

pub mod foundation;
pub mod notification;
pub mod session;
