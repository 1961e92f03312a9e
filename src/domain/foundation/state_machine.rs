//! State machine trait for status enums.
//!
//! Session lifecycle states and observer connection states both implement
//! this trait, so every state change goes through the same validity check.

use std::fmt;

/// Rejected transition between two states of the same machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition from {from:?} to {to:?}")]
pub struct InvalidTransition<S: fmt::Debug> {
    pub from: S,
    pub to: S,
}

/// Trait for status enums that represent state machines.
///
/// Implementors define the valid edges; `transition_to` is the only
/// sanctioned way to move between states.
///
/// # Example
///
/// ```ignore
/// let next = SessionState::Disconnected.transition_to(SessionState::Connecting)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, InvalidTransition<Self>> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(InvalidTransition {
                from: *self,
                to: target,
            })
        }
    }
}
