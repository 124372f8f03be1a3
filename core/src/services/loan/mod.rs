//! Loan ledger service
//!
//! This module handles every mutation of Loan and Book state:
//! - Checking a copy out to a user (CreateLoan)
//! - Handing a copy back (ReturnBook)
//! - Read-only loan lookups and listings
//!
//! Each mutation runs its validate-then-write sequence inside one ledger
//! transaction and is re-run from scratch when the store reports a conflict.

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::LoanServiceConfig;
pub use service::LoanService;
