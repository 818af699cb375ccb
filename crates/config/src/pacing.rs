//! Conversational pacing
//!
//! Randomized delays only simulate human timing. They have no correctness
//! requirement beyond being positive and bounded, so each one is a
//! configurable inclusive range.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Inclusive delay range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that always yields the same delay
    pub const fn fixed(ms: u64) -> Self {
        Self::new(ms, ms)
    }

    pub fn min(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn contains(&self, delay: Duration) -> bool {
        delay >= self.min() && delay <= self.max()
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.max_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "delay must be positive".to_string(),
            });
        }
        if self.min_ms > self.max_ms {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("min_ms ({}) exceeds max_ms ({})", self.min_ms, self.max_ms),
            });
        }
        Ok(())
    }
}

fn default_dial() -> DelayRange {
    DelayRange::new(900, 1600)
}
fn default_customer_reply() -> DelayRange {
    DelayRange::new(900, 1500)
}
fn default_auto_advance() -> DelayRange {
    DelayRange::new(1300, 2200)
}
fn default_manual_advance() -> DelayRange {
    DelayRange::new(1000, 1800)
}
fn default_final_step() -> DelayRange {
    DelayRange::fixed(1600)
}

/// Delay ranges driving the script stepper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Dialing until connected
    #[serde(default = "default_dial")]
    pub dial: DelayRange,

    /// Agent line until the auto-played customer line
    #[serde(default = "default_customer_reply")]
    pub customer_reply: DelayRange,

    /// Auto-played customer line until the next step
    #[serde(default = "default_auto_advance")]
    pub auto_advance: DelayRange,

    /// Typed customer reply until the next step
    #[serde(default = "default_manual_advance")]
    pub manual_advance: DelayRange,

    /// Closing agent line (no customer line) until completion
    #[serde(default = "default_final_step")]
    pub final_step: DelayRange,
}

impl PacingConfig {
    /// Uniform fast pacing, handy for tests and demos
    pub fn instant(ms: u64) -> Self {
        let range = DelayRange::fixed(ms.max(1));
        Self {
            dial: range,
            customer_reply: range,
            auto_advance: range,
            manual_advance: range,
            final_step: range,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.dial.validate("pacing.dial")?;
        self.customer_reply.validate("pacing.customer_reply")?;
        self.auto_advance.validate("pacing.auto_advance")?;
        self.manual_advance.validate("pacing.manual_advance")?;
        self.final_step.validate("pacing.final_step")?;
        Ok(())
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            dial: default_dial(),
            customer_reply: default_customer_reply(),
            auto_advance: default_auto_advance(),
            manual_advance: default_manual_advance(),
            final_step: default_final_step(),
        }
    }
}
