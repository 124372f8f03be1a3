//! Shared configuration and common types for the lending backend
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (environment, logging, database, lending policy, sweeper)
//! - Pagination types for list queries

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use crate::config::{
    AppConfig, ConfigError, DatabaseConfig, Environment, LendingConfig, LogFormat,
    LoggingConfig, SweeperConfig,
};
pub use types::{PaginatedResponse, Pagination};
