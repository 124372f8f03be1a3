//! Borrowing rules that a ledger operation refused to break

use thiserror::Error;

use crate::domain::entities::loan::LoanStatus;

/// A business invariant that the requested operation would violate
///
/// These are data-driven and never retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("max loans reached (limit {limit})")]
    MaxLoansReached { limit: u32 },

    #[error("book unavailable")]
    BookUnavailable,

    #[error("duplicate loan")]
    DuplicateLoan,

    #[error("loan not active (status {status})")]
    LoanNotActive { status: LoanStatus },

    #[error("invalid loan transition from {from} to {to}")]
    InvalidTransition { from: LoanStatus, to: LoanStatus },
}

impl RuleViolation {
    /// Short code for the violated rule
    pub fn code(&self) -> &'static str {
        match self {
            RuleViolation::MaxLoansReached { .. } => "MAX_LOANS_REACHED",
            RuleViolation::BookUnavailable => "BOOK_UNAVAILABLE",
            RuleViolation::DuplicateLoan => "DUPLICATE_LOAN",
            RuleViolation::LoanNotActive { .. } => "LOAN_NOT_ACTIVE",
            RuleViolation::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}
