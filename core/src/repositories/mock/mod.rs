//! In-memory library store for tests and local runs.
//!
//! Implements both [`LedgerStore`](crate::repositories::LedgerStore) and
//! [`LoanRepository`](crate::repositories::LoanRepository) over shared maps,
//! with optimistic concurrency control: every transaction remembers the
//! version of each entity it read and its commit fails with a conflict if
//! any of them changed in the meantime.

mod store;
mod transaction;

pub use store::MockLibraryStore;
