//! # Lending Core
//!
//! Core business logic and domain layer for the library lending backend.
//! This crate contains domain entities, the loan ledger and overdue sweeper
//! services, repository and unit-of-work interfaces, and error types.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
