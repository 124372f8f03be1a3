//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `lending` - Borrowing policy (loan caps, loan duration, conflict retries)
//! - `sweeper` - Overdue sweeper schedule

pub mod database;
pub mod environment;
pub mod lending;
pub mod sweeper;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use lending::LendingConfig;
pub use sweeper::SweeperConfig;

/// Prefix for environment overrides, e.g. `LENDING__LENDING__MAX_LOANS_PER_USER=3`
pub const ENV_PREFIX: &str = "LENDING";

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Borrowing policy
    pub lending: LendingConfig,

    /// Overdue sweeper schedule
    pub sweeper: SweeperConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            lending: LendingConfig::default(),
            sweeper: SweeperConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Build configuration from plain environment variables
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            database: DatabaseConfig::from_env(),
            lending: LendingConfig::from_env(),
            sweeper: SweeperConfig::from_env(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load layered configuration
    ///
    /// Sources, lowest priority first:
    /// 1. [`AppConfig::from_env`] values
    /// 2. the optional `config.<environment>.toml` file
    /// 3. `LENDING__<SECTION>__<KEY>` environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let base = Self::from_env();
        let file = base.environment.config_file().to_string();

        let settings = ::config::Config::builder()
            .add_source(::config::Config::try_from(&base)?)
            .add_source(::config::File::new(&file, ::config::FileFormat::Toml).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: Self = settings.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Validate every sub-configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.lending.validate()?;
        self.sweeper.validate()?;
        Ok(())
    }
}
