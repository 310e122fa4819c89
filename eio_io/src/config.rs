//! Exchange configuration loaded from TOML.
//!
//! # TOML Example
//!
//! ```toml
//! cycle_time_ms = 50
//! input_offset = 0
//! output_offset = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Timing and layout parameters of the exchange loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Exchange cycle period in milliseconds.
    #[serde(default = "default_cycle_time_ms")]
    pub cycle_time_ms: u64,

    /// Byte offset of the first input signal in the input buffer.
    #[serde(default)]
    pub input_offset: usize,

    /// Byte offset of the first output signal in the output buffer.
    #[serde(default)]
    pub output_offset: usize,
}

fn default_cycle_time_ms() -> u64 {
    50
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            cycle_time_ms: default_cycle_time_ms(),
            input_offset: 0,
            output_offset: 0,
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// - `ConfigError::FileNotFound` if the file does not exist
    /// - `ConfigError::ParseError` if TOML syntax is invalid
    /// - `ConfigError::ValidationError` if semantic validation fails
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `cycle_time_ms` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_time_ms == 0 {
            return Err(ConfigError::ValidationError(
                "cycle_time_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
