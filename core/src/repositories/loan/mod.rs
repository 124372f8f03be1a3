//! Loan read and sweep repository module.

mod r#trait;
pub use r#trait::{LoanFilter, LoanRepository};
