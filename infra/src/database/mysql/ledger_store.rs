//! MySQL unit of work for Book + Loan writes
//!
//! Every row the ledger validates against is read with `SELECT ... FOR UPDATE`
//! inside one InnoDB transaction, so two operations on the same user, book or
//! loan serialize on the row lock. Book updates also carry an optimistic
//! `version` check as a second line against lost updates. Deadlocks and
//! lock-wait timeouts surface as `DomainError::Conflict`.

use async_trait::async_trait;
use lending_core::domain::entities::{Book, Loan, LoanStatus, User};
use lending_core::errors::DomainError;
use lending_core::repositories::{LedgerStore, LedgerTransaction};
use sqlx::{MySql, MySqlPool, Transaction};
use uuid::Uuid;

use super::rows::{row_to_book, row_to_loan, row_to_user, BOOK_COLUMNS, LOAN_COLUMNS, USER_COLUMNS};
use crate::database::error::map_sqlx_error;

/// MySQL implementation of LedgerStore
#[derive(Clone)]
pub struct MySqlLedgerStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlLedgerStore {
    /// Create a new MySQL ledger store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for MySqlLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin ledger transaction", e))?;
        Ok(Box::new(MySqlLedgerTransaction { tx }))
    }
}

/// Open InnoDB transaction; rolled back by SQLx if dropped uncommitted
pub struct MySqlLedgerTransaction {
    tx: Transaction<'static, MySql>,
}

#[async_trait]
impl LedgerTransaction for MySqlLedgerTransaction {
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        // Locking the user serializes the per-user cap and duplicate checks
        let query = format!("SELECT {} FROM users WHERE id = ? FOR UPDATE", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("find user", e))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_book(&mut self, id: Uuid) -> Result<Option<Book>, DomainError> {
        let query = format!("SELECT {} FROM books WHERE id = ? FOR UPDATE", BOOK_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("find book", e))?;

        row.as_ref().map(row_to_book).transpose()
    }

    async fn find_loan(&mut self, id: Uuid) -> Result<Option<Loan>, DomainError> {
        let query = format!("SELECT {} FROM loans WHERE id = ? FOR UPDATE", LOAN_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("find loan", e))?;

        row.as_ref().map(row_to_loan).transpose()
    }

    async fn count_active_loans_for_user(&mut self, user_id: Uuid) -> Result<u64, DomainError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM loans
            WHERE user_id = ? AND status IN (?, ?)
            "#,
        )
        .bind(user_id.to_string())
        .bind(LoanStatus::Active.as_str())
        .bind(LoanStatus::Overdue.as_str())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("count active loans", e))?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn find_active_loan_for_user_and_book(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
    ) -> Result<Option<Loan>, DomainError> {
        let query = format!(
            "SELECT {} FROM loans WHERE user_id = ? AND book_id = ? AND status IN (?, ?) LIMIT 1",
            LOAN_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(book_id.to_string())
            .bind(LoanStatus::Active.as_str())
            .bind(LoanStatus::Overdue.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("find active loan", e))?;

        row.as_ref().map(row_to_loan).transpose()
    }

    async fn save_book(&mut self, book: &Book) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(book.available_copies)
        .bind(book.id.to_string())
        .bind(book.version)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save book", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::conflict(format!(
                "Book {} changed since version {}",
                book.id, book.version
            )));
        }
        Ok(())
    }

    async fn save_loan(&mut self, loan: &Loan) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO loans (
                id, user_id, book_id, loan_date, due_date, return_date, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                return_date = VALUES(return_date),
                status = VALUES(status),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(loan.id.to_string())
        .bind(loan.user_id.to_string())
        .bind(loan.book_id.to_string())
        .bind(loan.loan_date)
        .bind(loan.due_date)
        .bind(loan.return_date)
        .bind(loan.status.as_str())
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save loan", e))?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit ledger transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback ledger transaction", e))
    }
}
