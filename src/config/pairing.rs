//! Pairing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// How long an issued pairing payload stays scannable.
#[derive(Debug, Clone, Deserialize)]
pub struct PairingConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl PairingConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == 0 || self.ttl_secs > 3600 {
            return Err(ValidationError::InvalidPairingTtl);
        }
        Ok(())
    }
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    60
}
