//! MySQL implementations of the lending store interfaces

mod ledger_store;
mod loan_repository;
mod rows;

pub use ledger_store::{MySqlLedgerStore, MySqlLedgerTransaction};
pub use loan_repository::MySqlLoanRepository;
