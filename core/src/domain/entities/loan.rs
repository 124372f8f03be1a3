//! Loan entity and its lifecycle state machine.
//!
//! A loan is created ACTIVE and may move to OVERDUE (by the sweeper) and to
//! RETURNED (by a return). RETURNED is terminal.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult, RuleViolation};

/// Status of a single borrowing event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// Checked out and within the loan period
    Active,
    /// Checked out past its due date
    Overdue,
    /// Copy handed back
    Returned,
}

impl LoanStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Overdue => "OVERDUE",
            LoanStatus::Returned => "RETURNED",
        }
    }

    /// ACTIVE and OVERDUE loans still hold a copy of the book
    pub fn is_checked_out(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Overdue)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Returned)
    }

    /// Transition table: ACTIVE -> OVERDUE, ACTIVE -> RETURNED, OVERDUE -> RETURNED
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Active, LoanStatus::Overdue)
                | (LoanStatus::Active, LoanStatus::Returned)
                | (LoanStatus::Overdue, LoanStatus::Returned)
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(LoanStatus::Active),
            "OVERDUE" => Ok(LoanStatus::Overdue),
            "RETURNED" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// One borrowing event of one copy of a book by one user
///
/// Immutable after creation except for `return_date`, `status` and `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique identifier for the loan
    pub id: Uuid,

    /// Borrowing user
    pub user_id: Uuid,

    /// Borrowed book
    pub book_id: Uuid,

    /// Day the copy was checked out
    pub loan_date: NaiveDate,

    /// `loan_date` plus the configured loan period, fixed at creation
    pub due_date: NaiveDate,

    /// Day the copy came back, if it has
    pub return_date: Option<NaiveDate>,

    /// Current lifecycle status
    pub status: LoanStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Opens a new ACTIVE loan dated `now`, due `duration_days` later
    pub fn new(
        user_id: Uuid,
        book_id: Uuid,
        now: DateTime<Utc>,
        duration_days: u32,
    ) -> DomainResult<Self> {
        let loan_date = now.date_naive();
        let due_date = loan_date
            .checked_add_days(Days::new(u64::from(duration_days)))
            .ok_or_else(|| DomainError::Validation {
                message: format!("Loan duration of {} days is out of range", duration_days),
            })?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            book_id,
            loan_date,
            due_date,
            return_date: None,
            status: LoanStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether this loan still holds a copy of its book
    pub fn is_checked_out(&self) -> bool {
        self.status.is_checked_out()
    }

    /// Due date strictly before `as_of`
    pub fn is_past_due(&self, as_of: NaiveDate) -> bool {
        self.due_date < as_of
    }

    /// ACTIVE and past due, i.e. what the overdue sweeper promotes
    pub fn should_be_overdue(&self, as_of: NaiveDate) -> bool {
        self.status == LoanStatus::Active && self.is_past_due(as_of)
    }

    /// Flags the loan OVERDUE; only valid from ACTIVE
    pub fn mark_overdue(&mut self, now: DateTime<Utc>) -> Result<(), RuleViolation> {
        self.transition(LoanStatus::Overdue, now)
    }

    /// Closes the loan
    ///
    /// ACTIVE loans are always returnable. OVERDUE loans are returnable only
    /// when `allow_overdue` is set.
    pub fn mark_returned(
        &mut self,
        now: DateTime<Utc>,
        allow_overdue: bool,
    ) -> Result<(), RuleViolation> {
        match self.status {
            LoanStatus::Active => {}
            LoanStatus::Overdue if allow_overdue => {}
            status => return Err(RuleViolation::LoanNotActive { status }),
        }

        self.transition(LoanStatus::Returned, now)?;
        self.return_date = Some(now.date_naive());
        Ok(())
    }

    fn transition(&mut self, next: LoanStatus, now: DateTime<Utc>) -> Result<(), RuleViolation> {
        if !self.status.can_transition_to(next) {
            return Err(RuleViolation::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
