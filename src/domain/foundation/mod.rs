//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types that form the
//! vocabulary of the pairing domain.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode};
pub use ids::{ObserverId, SessionId};
pub use state_machine::{InvalidTransition, StateMachine};
pub use timestamp::Timestamp;
