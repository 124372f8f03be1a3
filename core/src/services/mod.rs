//! Business services containing domain logic and use cases.

pub mod loan;
pub mod overdue;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use loan::{LoanService, LoanServiceConfig};
pub use overdue::{OverdueSweeper, SweepResult};
