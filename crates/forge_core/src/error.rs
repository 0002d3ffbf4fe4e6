//! Configuration error types

use thiserror::Error;

/// Errors raised while loading a showcase configuration
///
/// Only structurally broken input is an error. Out-of-range values are
/// degraded to safe defaults by [`crate::config::ShowcaseConfig::sanitized`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML document could not be parsed or contained unknown keys
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A tool id appears more than once
    #[error("Duplicate tool id: {0}")]
    DuplicateTool(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
