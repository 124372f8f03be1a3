//! Optimistic unit of work over the mock store

use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::entities::{Book, Loan, User};
use crate::errors::DomainError;
use crate::repositories::ledger::LedgerTransaction;

use super::store::{EntityKey, MockLibraryStore, StoreState};

/// Transaction handed out by [`MockLibraryStore`]
///
/// Writes are staged locally and applied under the store's write lock at
/// commit, after every version in the read set has been re-checked.
pub(super) struct MockLedgerTransaction {
    store: MockLibraryStore,
    read_set: HashMap<EntityKey, u64>,
    staged_books: HashMap<Uuid, Book>,
    staged_loans: HashMap<Uuid, Loan>,
}

impl MockLedgerTransaction {
    pub(super) fn new(store: MockLibraryStore) -> Self {
        Self {
            store,
            read_set: HashMap::new(),
            staged_books: HashMap::new(),
            staged_loans: HashMap::new(),
        }
    }

    /// Remember the first version seen for `key`
    fn track(&mut self, state: &StoreState, key: EntityKey) {
        self.read_set
            .entry(key)
            .or_insert_with(|| state.version(key));
    }

    /// Committed loans of a user overlaid with this transaction's staged loans
    fn user_loans(&self, state: &StoreState, user_id: Uuid) -> Vec<Loan> {
        let mut loans: HashMap<Uuid, Loan> = state
            .loans
            .values()
            .filter(|loan| loan.user_id == user_id)
            .map(|loan| (loan.id, loan.clone()))
            .collect();
        for loan in self.staged_loans.values() {
            if loan.user_id == user_id {
                loans.insert(loan.id, loan.clone());
            }
        }
        loans.into_values().collect()
    }

    fn validate(&self, state: &StoreState) -> Result<(), DomainError> {
        for (key, seen) in &self.read_set {
            if state.version(*key) != *seen {
                return Err(DomainError::conflict(format!(
                    "{:?} changed since it was read",
                    key
                )));
            }
        }

        for (id, staged) in &self.staged_books {
            let stored = state
                .books
                .get(id)
                .ok_or_else(|| DomainError::not_found("Book", id))?;
            if stored.version != staged.version {
                return Err(DomainError::conflict(format!(
                    "Book {} is at version {}, expected {}",
                    id, stored.version, staged.version
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for MockLedgerTransaction {
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.store.ensure_available()?;
        let store = self.store.clone();
        let state = store.state.read().await;
        self.track(&state, EntityKey::User(id));
        Ok(state.users.get(&id).cloned())
    }

    async fn find_book(&mut self, id: Uuid) -> Result<Option<Book>, DomainError> {
        self.store.ensure_available()?;
        let store = self.store.clone();
        let state = store.state.read().await;
        self.track(&state, EntityKey::Book(id));
        if let Some(book) = self.staged_books.get(&id) {
            return Ok(Some(book.clone()));
        }
        Ok(state.books.get(&id).cloned())
    }

    async fn find_loan(&mut self, id: Uuid) -> Result<Option<Loan>, DomainError> {
        self.store.ensure_available()?;
        let store = self.store.clone();
        let state = store.state.read().await;
        self.track(&state, EntityKey::Loan(id));
        if let Some(loan) = self.staged_loans.get(&id) {
            return Ok(Some(loan.clone()));
        }
        Ok(state.loans.get(&id).cloned())
    }

    async fn count_active_loans_for_user(&mut self, user_id: Uuid) -> Result<u64, DomainError> {
        self.store.ensure_available()?;
        let store = self.store.clone();
        let state = store.state.read().await;
        self.track(&state, EntityKey::UserLoans(user_id));
        let count = self
            .user_loans(&state, user_id)
            .iter()
            .filter(|loan| loan.is_checked_out())
            .count();
        Ok(count as u64)
    }

    async fn find_active_loan_for_user_and_book(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> Result<Option<Loan>, DomainError> {
        self.store.ensure_available()?;
        let store = self.store.clone();
        let state = store.state.read().await;
        self.track(&state, EntityKey::UserLoans(user_id));
        Ok(self
            .user_loans(&state, user_id)
            .into_iter()
            .find(|loan| loan.book_id == book_id && loan.is_checked_out()))
    }

    async fn save_book(&mut self, book: &Book) -> Result<(), DomainError> {
        self.store.ensure_available()?;
        self.staged_books.insert(book.id, book.clone());
        Ok(())
    }

    async fn save_loan(&mut self, loan: &Loan) -> Result<(), DomainError> {
        self.store.ensure_available()?;
        self.staged_loans.insert(loan.id, loan.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.store.ensure_available()?;
        if self.store.take_forced_conflict() {
            return Err(DomainError::conflict("Forced commit conflict"));
        }

        let this = *self;
        let store = this.store.clone();
        let mut state = store.state.write().await;
        this.validate(&state)?;

        for (id, mut book) in this.staged_books {
            book.version += 1;
            state.bump(EntityKey::Book(id));
            state.books.insert(id, book);
        }
        for (id, loan) in this.staged_loans {
            state.bump(EntityKey::Loan(id));
            state.bump(EntityKey::UserLoans(loan.user_id));
            state.loans.insert(id, loan);
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}
