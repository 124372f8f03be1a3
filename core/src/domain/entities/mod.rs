//! Domain entities representing core lending objects.

pub mod book;
pub mod loan;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanStatus};
pub use user::{User, UserRole};
