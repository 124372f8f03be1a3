//! Unit-of-work traits for atomic Book + Loan writes.
//!
//! A ledger operation opens one [`LedgerTransaction`], performs every read it
//! validates against through that transaction, stages its writes, and commits.
//! Either all staged writes become visible or none do. Dropping a transaction
//! without committing discards its writes.
//!
//! Each store picks its own isolation strategy (row locks, optimistic version
//! checks) but must guarantee that two transactions which both read a book's
//! copy counter, or both read a user's active loans, cannot both commit
//! writes based on the same stale read. The loser fails with
//! [`DomainError::Conflict`] or blocks until the winner finishes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::{Book, Loan, User};
use crate::errors::DomainError;

/// Factory for ledger transactions
///
/// # Example
/// ```no_run
/// # use lending_core::repositories::LedgerStore;
/// # use lending_core::errors::DomainError;
/// # async fn example(store: &impl LedgerStore, book_id: uuid::Uuid) -> Result<(), DomainError> {
/// let mut tx = store.begin().await?;
/// if let Some(mut book) = tx.find_book(book_id).await? {
///     book.check_out()?;
///     tx.save_book(&book).await?;
/// }
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a new unit of work
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError>;
}

/// An open unit of work
///
/// Reads see the transaction's own staged writes.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Find a user by ID
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a book by ID
    async fn find_book(&mut self, id: Uuid) -> Result<Option<Book>, DomainError>;

    /// Find a loan by ID
    async fn find_loan(&mut self, id: Uuid) -> Result<Option<Loan>, DomainError>;

    /// Count the user's ACTIVE and OVERDUE loans
    async fn count_active_loans_for_user(&mut self, user_id: Uuid) -> Result<u64, DomainError>;

    /// Find the user's ACTIVE or OVERDUE loan of this book, if any
    async fn find_active_loan_for_user_and_book(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> Result<Option<Loan>, DomainError>;

    /// Stage a book update
    ///
    /// `book.version` must be the version that was read; the store rejects the
    /// commit with a conflict if the stored version moved on.
    async fn save_book(&mut self, book: &Book) -> Result<(), DomainError>;

    /// Stage a loan insert or update
    async fn save_loan(&mut self, loan: &Loan) -> Result<(), DomainError>;

    /// Apply every staged write atomically
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discard every staged write
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}
