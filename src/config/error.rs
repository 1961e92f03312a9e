//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Pairing TTL must be between 1 and 3600 seconds")]
    InvalidPairingTtl,

    #[error("Observer channel capacity must be between 1 and 65536")]
    InvalidChannelCapacity,

    #[error("Reconnect base delay must be positive and not exceed the max delay")]
    InvalidReconnectDelay,

    #[error("Reconnect attempts must be between 1 and 100")]
    InvalidReconnectAttempts,
}
