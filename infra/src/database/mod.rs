//! Database module - MySQL implementations using SQLx
//!
//! This module provides database access layer implementations including:
//! - Connection pool management and embedded migrations
//! - The ledger store (row-locking unit of work for Book + Loan writes)
//! - The loan repository used by reads and the overdue sweeper
//! - Mapping of driver errors onto domain errors

pub mod connection;
pub mod error;
pub mod mysql;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics};
pub use error::map_sqlx_error;
pub use mysql::{MySqlLedgerStore, MySqlLoanRepository};
