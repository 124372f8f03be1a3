//! Loan ledger service implementation

use lending_shared::types::{PaginatedResponse, Pagination};
use mockable::Clock;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::Loan;
use crate::errors::{DomainError, DomainResult, RuleViolation};
use crate::repositories::{LedgerStore, LoanFilter, LoanRepository};

use super::config::LoanServiceConfig;

/// Loan ledger: the only writer of Loan and Book copy counters
pub struct LoanService<S, R>
where
    S: LedgerStore,
    R: LoanRepository,
{
    store: Arc<S>,
    loans: Arc<R>,
    clock: Arc<dyn Clock>,
    config: LoanServiceConfig,
}

impl<S, R> LoanService<S, R>
where
    S: LedgerStore,
    R: LoanRepository,
{
    /// Create a new loan service
    pub fn new(
        store: Arc<S>,
        loans: Arc<R>,
        clock: Arc<dyn Clock>,
        config: LoanServiceConfig,
    ) -> Self {
        Self {
            store,
            loans,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &LoanServiceConfig {
        &self.config
    }

    /// Check a copy of `book_id` out to `user_id`
    ///
    /// Rules are checked in this order and the first failure wins:
    /// 1. The user exists
    /// 2. The book exists
    /// 3. The user holds fewer than `max_loans_per_user` ACTIVE/OVERDUE loans
    /// 4. The book has an available copy
    /// 5. The user has no ACTIVE/OVERDUE loan of this book
    ///
    /// # Returns
    /// * `Ok(Loan)` - The new ACTIVE loan
    /// * `Err(DomainError::NotFound)` - Unknown user or book
    /// * `Err(DomainError::RuleViolation)` - A borrowing rule failed
    /// * `Err(DomainError::Conflict)` - Still conflicting after every retry
    pub async fn create_loan(&self, user_id: Uuid, book_id: Uuid) -> DomainResult<Loan> {
        let loan = self
            .retry_on_conflict("create_loan", || self.try_create_loan(user_id, book_id))
            .await?;

        info!(
            loan_id = %loan.id,
            user_id = %user_id,
            book_id = %book_id,
            due_date = %loan.due_date,
            "Loan created"
        );
        Ok(loan)
    }

    /// Close a loan and put its copy back on the shelf
    ///
    /// Not idempotent: returning the same loan twice fails with
    /// `RuleViolation::LoanNotActive`.
    pub async fn return_book(&self, loan_id: Uuid) -> DomainResult<Loan> {
        let loan = self
            .retry_on_conflict("return_book", || self.try_return_book(loan_id))
            .await?;

        info!(
            loan_id = %loan.id,
            book_id = %loan.book_id,
            due_date = %loan.due_date,
            "Book returned"
        );
        Ok(loan)
    }

    /// Get a loan by ID
    pub async fn get_loan(&self, loan_id: Uuid) -> DomainResult<Loan> {
        self.loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Loan", loan_id))
    }

    /// List loans matching `filter`, newest loan date first
    pub async fn list_loans(
        &self,
        filter: LoanFilter,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResponse<Loan>> {
        let pagination = pagination.validate();
        let (loans, total) = self.loans.list(&filter, pagination).await?;
        Ok(PaginatedResponse::new(loans, pagination, total))
    }

    async fn try_create_loan(&self, user_id: Uuid, book_id: Uuid) -> DomainResult<Loan> {
        let mut tx = self.store.begin().await?;

        let user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        let mut book = tx
            .find_book(book_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Book", book_id))?;

        let limit = self.config.max_loans_per_user;
        if tx.count_active_loans_for_user(user.id).await? >= u64::from(limit) {
            return Err(RuleViolation::MaxLoansReached { limit }.into());
        }
        if !book.is_available() {
            return Err(RuleViolation::BookUnavailable.into());
        }
        if tx
            .find_active_loan_for_user_and_book(user.id, book.id)
            .await?
            .is_some()
        {
            return Err(RuleViolation::DuplicateLoan.into());
        }

        book.check_out()?;
        let loan = Loan::new(
            user.id,
            book.id,
            self.clock.utc(),
            self.config.loan_duration_days,
        )?;

        tx.save_book(&book).await?;
        tx.save_loan(&loan).await?;
        tx.commit().await?;

        Ok(loan)
    }

    async fn try_return_book(&self, loan_id: Uuid) -> DomainResult<Loan> {
        let mut tx = self.store.begin().await?;

        let mut loan = tx
            .find_loan(loan_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Loan", loan_id))?;
        loan.mark_returned(self.clock.utc(), self.config.allow_overdue_returns)?;

        let mut book = tx.find_book(loan.book_id).await?.ok_or_else(|| {
            DomainError::internal(format!(
                "Loan {} references missing book {}",
                loan.id, loan.book_id
            ))
        })?;
        book.check_in()?;

        tx.save_book(&book).await?;
        tx.save_loan(&loan).await?;
        tx.commit().await?;

        Ok(loan)
    }

    /// Run `attempt` until it succeeds, fails with a non-retryable error,
    /// or `max_attempts` conflicts in a row have been seen
    async fn retry_on_conflict<T, F, Fut>(&self, operation: &str, mut attempt: F) -> DomainResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut tries = 1;

        loop {
            match attempt().await {
                Err(e) if e.is_retryable() && tries < max_attempts => {
                    warn!(operation, attempt = tries, error = %e, "Ledger conflict, retrying");
                    tokio::time::sleep(self.backoff(tries)).await;
                    tries += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        operation,
                        attempts = tries,
                        error = %e,
                        "Ledger conflict persisted, giving up"
                    );
                    return Err(e);
                }
                Err(e) => {
                    debug!(operation, code = e.code(), error = %e, "Ledger operation rejected");
                    return Err(e);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    /// Linear backoff with up to one extra base interval of random jitter
    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.config.retry_backoff;
        if base.is_zero() {
            return base;
        }
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let jitter_ms = rand::thread_rng().gen_range(0..=base_ms);
        base.saturating_mul(attempt)
            .saturating_add(Duration::from_millis(jitter_ms))
    }
}
