//! Bounded exponential backoff for observer reconnects.

use std::time::Duration;

/// Retry parameters.
///
/// The delay before retry `n` (zero-based) is `min(max_delay, base_delay * 2^n)`.
/// After `max_attempts` consecutive failures the client gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the zero-based retry `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// What the client does after losing its connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait `delay`, then try again. `attempt` is one-based.
    Retry { attempt: u32, delay: Duration },
    /// Ceiling reached; stop until a manual reconnect.
    GiveUp { attempts: u32 },
}

/// Attempt counter driven by a [`BackoffPolicy`].
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Retries scheduled since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Records a failure and decides what to do next.
    pub fn next(&mut self) -> ReconnectDecision {
        if self.attempt >= self.policy.max_attempts {
            return ReconnectDecision::GiveUp {
                attempts: self.attempt,
            };
        }
        let delay = self.policy.delay_for(self.attempt);
        self.attempt += 1;
        ReconnectDecision::Retry {
            attempt: self.attempt,
            delay,
        }
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}
