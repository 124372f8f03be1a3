//! Repository and unit-of-work interfaces for lending persistence.

pub mod ledger;
pub mod loan;
pub mod mock;

pub use ledger::{LedgerStore, LedgerTransaction};
pub use loan::{LoanFilter, LoanRepository};
pub use mock::MockLibraryStore;
