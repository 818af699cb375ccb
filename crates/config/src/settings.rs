//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use call_sim_core::Scenario;

use crate::{ConfigError, PacingConfig};

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Default scenario for the first call
    #[serde(default)]
    pub scenario: Scenario,

    /// Script stepper pacing
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Session toggles
    #[serde(default)]
    pub session: SessionDefaults,

    /// Speech output
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pacing.validate()?;

        if self.speech.words_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                field: "speech.words_per_minute".to_string(),
                message: "must be positive".to_string(),
            });
        }

        if self.scenario.customer_name.trim().is_empty() {
            tracing::warn!("scenario.customer_name is empty; script lines will read oddly");
        }

        Ok(())
    }
}

/// Session toggle defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaults {
    /// Customer turns are played from the script
    #[serde(default = "default_true")]
    pub auto_pilot: bool,

    /// Speak agent lines aloud
    #[serde(default)]
    pub voice_enabled: bool,

    /// Broadcast channel capacity for session events
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_true() -> bool {
    true
}
fn default_event_capacity() -> usize {
    100
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            auto_pilot: true,
            voice_enabled: false,
            event_capacity: default_event_capacity(),
        }
    }
}

/// Speech output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speaking rate used to estimate utterance length
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

fn default_words_per_minute() -> u32 {
    165
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            words_per_minute: default_words_per_minute(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (CALL_SIM__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(
            File::with_name(&format!("config/{}", env_name)).required(false),
        );
    }

    builder = builder.add_source(
        Environment::with_prefix("CALL_SIM")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
