//! Observer reconnect configuration
//!
//! Read by processes that embed an `ObserverClient`; the server binary only
//! validates it. Build the client from it with
//! `ObserverClient::new(config.reconnect.to_policy())`.

use serde::Deserialize;
use std::time::Duration;

use crate::client::BackoffPolicy;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Consecutive failures before the client gives up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl ReconnectConfig {
    pub fn to_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: self.max_attempts,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_delay_ms == 0 || self.base_delay_ms > self.max_delay_ms {
            return Err(ValidationError::InvalidReconnectDelay);
        }
        if self.max_attempts == 0 || self.max_attempts > 100 {
            return Err(ValidationError::InvalidReconnectAttempts);
        }
        Ok(())
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_base_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}
