//! Unit of work spanning the Book and Loan rows a ledger operation touches.

mod r#trait;
pub use r#trait::{LedgerStore, LedgerTransaction};
