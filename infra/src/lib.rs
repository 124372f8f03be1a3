//! # Infrastructure Layer
//!
//! Concrete implementations of the lending core's store interfaces:
//! - **Database**: MySQL ledger store and loan repository using SQLx
//! - **Telemetry**: tracing subscriber setup driven by `LoggingConfig`
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use lending_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber initialisation
pub mod telemetry;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracing subscriber setup error
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl From<lending_shared::ConfigError> for InfrastructureError {
    fn from(error: lending_shared::ConfigError) -> Self {
        InfrastructureError::Config(error.to_string())
    }
}
