//! Overdue sweeper schedule configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Schedule and batching for the periodic overdue scan
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// Whether the background sweep runs at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sweeps
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Maximum loans written per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_seconds: default_interval_seconds(),
            batch_size: default_batch_size(),
        }
    }
}

impl SweeperConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("SWEEPER_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enabled),
            interval_seconds: std::env::var("SWEEPER_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.interval_seconds),
            batch_size: std::env::var("SWEEPER_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.batch_size),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_seconds == 0 {
            return Err(ConfigError::invalid(
                "sweeper.interval_seconds",
                "must be at least 1",
            ));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid(
                "sweeper.batch_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval_seconds() -> u64 {
    86_400 // once a day
}

fn default_batch_size() -> usize {
    500
}
