//! Shared state and the non-transactional side of the mock store

use async_trait::async_trait;
use chrono::NaiveDate;
use lending_shared::types::Pagination;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{Book, Loan, LoanStatus, User};
use crate::errors::DomainError;
use crate::repositories::ledger::{LedgerStore, LedgerTransaction};
use crate::repositories::loan::{LoanFilter, LoanRepository};

use super::transaction::MockLedgerTransaction;

/// Versioned units a transaction can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum EntityKey {
    User(Uuid),
    /// The set of loans held by one user
    UserLoans(Uuid),
    Book(Uuid),
    Loan(Uuid),
}

#[derive(Debug, Default)]
pub(super) struct StoreState {
    pub(super) users: HashMap<Uuid, User>,
    pub(super) books: HashMap<Uuid, Book>,
    pub(super) loans: HashMap<Uuid, Loan>,
    versions: HashMap<EntityKey, u64>,
}

impl StoreState {
    pub(super) fn version(&self, key: EntityKey) -> u64 {
        self.versions.get(&key).copied().unwrap_or(0)
    }

    pub(super) fn bump(&mut self, key: EntityKey) {
        *self.versions.entry(key).or_insert(0) += 1;
    }
}

/// Mock library store for testing
#[derive(Clone, Default)]
pub struct MockLibraryStore {
    pub(super) state: Arc<RwLock<StoreState>>,
    unavailable: Arc<AtomicBool>,
    forced_conflicts: Arc<AtomicU32>,
}

impl MockLibraryStore {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with `Unavailable` until reset
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next `count` commits fail with `Conflict`
    pub fn fail_next_commits(&self, count: u32) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    pub(super) fn ensure_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::unavailable("Mock store is unavailable"));
        }
        Ok(())
    }

    /// Consume one forced conflict, if any are pending
    pub(super) fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Seed a user
    pub async fn insert_user(&self, user: User) -> User {
        let mut state = self.state.write().await;
        state.bump(EntityKey::User(user.id));
        state.users.insert(user.id, user.clone());
        user
    }

    /// Seed a book
    pub async fn insert_book(&self, book: Book) -> Book {
        let mut state = self.state.write().await;
        state.bump(EntityKey::Book(book.id));
        state.books.insert(book.id, book.clone());
        book
    }

    /// Seed a loan as-is, bypassing ledger rules and copy counters
    pub async fn insert_loan(&self, loan: Loan) -> Loan {
        let mut state = self.state.write().await;
        state.bump(EntityKey::Loan(loan.id));
        state.bump(EntityKey::UserLoans(loan.user_id));
        state.loans.insert(loan.id, loan.clone());
        loan
    }

    /// Current committed state of a book
    pub async fn book(&self, id: Uuid) -> Option<Book> {
        self.state.read().await.books.get(&id).cloned()
    }

    /// Current committed state of a loan
    pub async fn loan(&self, id: Uuid) -> Option<Loan> {
        self.state.read().await.loans.get(&id).cloned()
    }

    /// Every committed loan
    pub async fn loans(&self) -> Vec<Loan> {
        self.state.read().await.loans.values().cloned().collect()
    }

    /// Committed ACTIVE/OVERDUE loans of a book
    pub async fn checked_out_count(&self, book_id: Uuid) -> u32 {
        let state = self.state.read().await;
        let count = state
            .loans
            .values()
            .filter(|loan| loan.book_id == book_id && loan.is_checked_out())
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

#[async_trait]
impl LedgerStore for MockLibraryStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        self.ensure_available()?;
        Ok(Box::new(MockLedgerTransaction::new(self.clone())))
    }
}

#[async_trait]
impl LoanRepository for MockLibraryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Loan>, DomainError> {
        self.ensure_available()?;
        Ok(self.loan(id).await)
    }

    async fn find_by_status_due_before(
        &self,
        status: LoanStatus,
        date: NaiveDate,
    ) -> Result<Vec<Loan>, DomainError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut loans: Vec<Loan> = state
            .loans
            .values()
            .filter(|loan| loan.status == status && loan.due_date < date)
            .cloned()
            .collect();
        loans.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        Ok(loans)
    }

    async fn save_overdue(&self, loans: &[Loan], as_of: NaiveDate) -> Result<u64, DomainError> {
        self.ensure_available()?;
        if let Some(loan) = loans.iter().find(|l| l.status != LoanStatus::Overdue) {
            return Err(DomainError::internal(format!(
                "Loan {} passed to save_overdue with status {}",
                loan.id, loan.status
            )));
        }

        let mut state = self.state.write().await;
        let mut updated = 0;
        for loan in loans {
            let Some(stored) = state.loans.get_mut(&loan.id) else {
                continue;
            };
            if !stored.should_be_overdue(as_of) {
                continue;
            }
            stored.status = LoanStatus::Overdue;
            stored.updated_at = loan.updated_at;
            state.bump(EntityKey::Loan(loan.id));
            updated += 1;
        }
        Ok(updated)
    }

    async fn list(
        &self,
        filter: &LoanFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Loan>, u64), DomainError> {
        self.ensure_available()?;
        let state = self.state.read().await;
        let mut matching: Vec<&Loan> = state.loans.values().filter(|l| filter.matches(l)).collect();
        matching.sort_by(|a, b| b.loan_date.cmp(&a.loan_date).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok((page, total))
    }
}
