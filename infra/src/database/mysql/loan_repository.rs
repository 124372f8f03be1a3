//! MySQL implementation of the LoanRepository trait.
//!
//! Reads run directly on the pool. The overdue write is a single
//! compare-and-set `UPDATE` per batch, so rows returned or flagged since the
//! sweeper scanned them are left alone.

use async_trait::async_trait;
use chrono::NaiveDate;
use lending_core::domain::entities::{Loan, LoanStatus};
use lending_core::errors::DomainError;
use lending_core::repositories::{LoanFilter, LoanRepository};
use lending_shared::types::Pagination;
use sqlx::{MySql, MySqlPool, QueryBuilder};
use uuid::Uuid;

use super::rows::{row_to_loan, LOAN_COLUMNS};
use crate::database::error::map_sqlx_error;

/// MySQL implementation of LoanRepository
#[derive(Clone)]
pub struct MySqlLoanRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlLoanRepository {
    /// Create a new MySQL loan repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, MySql>, filter: &LoanFilter) {
        builder.push(" WHERE 1 = 1");
        if let Some(user_id) = filter.user_id {
            builder.push(" AND user_id = ").push_bind(user_id.to_string());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
    }
}

#[async_trait]
impl LoanRepository for MySqlLoanRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Loan>, DomainError> {
        let query = format!("SELECT {} FROM loans WHERE id = ? LIMIT 1", LOAN_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find loan by id", e))?;

        row.as_ref().map(row_to_loan).transpose()
    }

    async fn find_by_status_due_before(
        &self,
        status: LoanStatus,
        date: NaiveDate,
    ) -> Result<Vec<Loan>, DomainError> {
        let query = format!(
            "SELECT {} FROM loans WHERE status = ? AND due_date < ? ORDER BY due_date, id",
            LOAN_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(status.as_str())
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find loans due before", e))?;

        rows.iter().map(row_to_loan).collect()
    }

    async fn save_overdue(&self, loans: &[Loan], as_of: NaiveDate) -> Result<u64, DomainError> {
        if let Some(loan) = loans.iter().find(|l| l.status != LoanStatus::Overdue) {
            return Err(DomainError::internal(format!(
                "Loan {} passed to save_overdue with status {}",
                loan.id, loan.status
            )));
        }
        let Some(updated_at) = loans.iter().map(|l| l.updated_at).max() else {
            return Ok(0);
        };

        let mut builder = QueryBuilder::<MySql>::new("UPDATE loans SET status = ");
        builder
            .push_bind(LoanStatus::Overdue.as_str())
            .push(", updated_at = ")
            .push_bind(updated_at)
            .push(" WHERE status = ")
            .push_bind(LoanStatus::Active.as_str())
            .push(" AND due_date < ")
            .push_bind(as_of)
            .push(" AND id IN (");
        let mut ids = builder.separated(", ");
        for loan in loans {
            ids.push_bind(loan.id.to_string());
        }
        ids.push_unseparated(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("mark loans overdue", e))?;

        tracing::debug!(
            requested = loans.len(),
            updated = result.rows_affected(),
            "Overdue batch written"
        );
        Ok(result.rows_affected())
    }

    async fn list(
        &self,
        filter: &LoanFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Loan>, u64), DomainError> {
        let mut count = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM loans");
        Self::push_filter(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count loans", e))?;

        let mut select = QueryBuilder::<MySql>::new(format!("SELECT {} FROM loans", LOAN_COLUMNS));
        Self::push_filter(&mut select, filter);
        select
            .push(" ORDER BY loan_date DESC, id ASC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list loans", e))?;

        let loans = rows.iter().map(row_to_loan).collect::<Result<Vec<_>, _>>()?;
        Ok((loans, u64::try_from(total).unwrap_or(0)))
    }
}
