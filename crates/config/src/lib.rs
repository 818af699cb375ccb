//! Configuration management for the call simulator
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (CALL_SIM__ prefix)
//! - Runtime overrides from the command line

pub mod pacing;
pub mod settings;

pub use pacing::{DelayRange, PacingConfig};
pub use settings::{
    load_settings, ObservabilityConfig, SessionDefaults, Settings, SpeechConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for call_sim_core::Error {
    fn from(err: ConfigError) -> Self {
        call_sim_core::Error::Config(err.to_string())
    }
}
