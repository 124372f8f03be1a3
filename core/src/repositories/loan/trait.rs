//! Loan repository trait for reads and the overdue batch write.
//!
//! Mutations that touch a Book go through [`crate::repositories::LedgerStore`]
//! instead; this repository never writes Book rows.

use async_trait::async_trait;
use chrono::NaiveDate;
use lending_shared::types::Pagination;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::loan::{Loan, LoanStatus};
use crate::errors::DomainError;

/// Criteria for listing loans; unset fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanFilter {
    /// Only loans of this user
    pub user_id: Option<Uuid>,
    /// Only loans in this status
    pub status: Option<LoanStatus>,
}

impl LoanFilter {
    /// Matches every loan
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether `loan` satisfies every set criterion
    pub fn matches(&self, loan: &Loan) -> bool {
        self.user_id.map_or(true, |id| loan.user_id == id)
            && self.status.map_or(true, |status| loan.status == status)
    }
}

/// Repository trait for Loan reads and the overdue transition
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// Find a loan by its unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(Loan))` - Loan found
    /// * `Ok(None)` - No loan with the given ID
    /// * `Err(DomainError)` - Store failure
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Loan>, DomainError>;

    /// Find loans in `status` whose due date is strictly before `date`
    ///
    /// Used by the overdue sweeper with `LoanStatus::Active`.
    async fn find_by_status_due_before(
        &self,
        status: LoanStatus,
        date: NaiveDate,
    ) -> Result<Vec<Loan>, DomainError>;

    /// Persist a batch of loans already transitioned to OVERDUE
    ///
    /// The write is compare-and-set per loan: a row is updated only while it
    /// is still ACTIVE with a due date before `as_of`. Loans returned or
    /// flagged concurrently are skipped, never overwritten.
    ///
    /// # Returns
    /// * `Ok(count)` - Number of loans actually moved to OVERDUE
    /// * `Err(DomainError)` - Store failure, or a loan not in OVERDUE state was passed
    async fn save_overdue(&self, loans: &[Loan], as_of: NaiveDate) -> Result<u64, DomainError>;

    /// List loans matching `filter`, newest loan date first
    ///
    /// # Returns
    /// * `Ok((page, total))` - The requested page and the total number of matches
    async fn list(
        &self,
        filter: &LoanFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Loan>, u64), DomainError>;
}
