//! Notification hub configuration

use serde::Deserialize;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Frames buffered per observer before it is considered broken
    #[serde(default = "default_observer_channel_capacity")]
    pub observer_channel_capacity: usize,
}

impl NotificationsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.observer_channel_capacity == 0 || self.observer_channel_capacity > 65_536 {
            return Err(ValidationError::InvalidChannelCapacity);
        }
        Ok(())
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            observer_channel_capacity: default_observer_channel_capacity(),
        }
    }
}

fn default_observer_channel_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = NotificationsConfig::default();
        assert_eq!(config.observer_channel_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = NotificationsConfig {
            observer_channel_capacity: 0,
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidChannelCapacity)
        );
    }
}
