//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PAIRLINK` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a runnable config.
//!
//! # Example
//!
//! ```no_run
//! use pairlink::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod error;
mod notifications;
mod pairing;
mod reconnect;
mod server;

pub use error::{ConfigError, ValidationError};
pub use notifications::NotificationsConfig;
pub use pairing::PairingConfig;
pub use reconnect::ReconnectConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Pairing payload lifetime
    #[serde(default)]
    pub pairing: PairingConfig,

    /// Notification hub buffering
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Observer client backoff, for library users of `ObserverClient`
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAIRLINK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAIRLINK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAIRLINK__PAIRING__TTL_SECS=60` -> `pairing.ttl_secs = 60`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAIRLINK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first section that is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.pairing.validate()?;
        self.notifications.validate()?;
        self.reconnect.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
