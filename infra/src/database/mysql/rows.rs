//! Row to entity mapping shared by the MySQL stores
//!
//! UUIDs are stored as `CHAR(36)`; enums as their upper-case names.

use lending_core::domain::entities::{Book, Loan, LoanStatus, User, UserRole};
use lending_core::errors::DomainError;
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

pub(crate) const USER_COLUMNS: &str = "id, email, full_name, role, created_at";

pub(crate) const BOOK_COLUMNS: &str =
    "id, title, author, isbn, total_copies, available_copies, version";

pub(crate) const LOAN_COLUMNS: &str =
    "id, user_id, book_id, loan_date, due_date, return_date, status, created_at, updated_at";

fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", name, e)))
}

fn uuid_column(row: &MySqlRow, name: &str) -> Result<Uuid, DomainError> {
    let raw: String = column(row, name)?;
    Uuid::parse_str(&raw)
        .map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", name, e)))
}

pub(crate) fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
    let role: String = column(row, "role")?;
    Ok(User {
        id: uuid_column(row, "id")?,
        email: column(row, "email")?,
        full_name: column(row, "full_name")?,
        role: role.parse::<UserRole>().map_err(DomainError::internal)?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn row_to_book(row: &MySqlRow) -> Result<Book, DomainError> {
    Ok(Book {
        id: uuid_column(row, "id")?,
        title: column(row, "title")?,
        author: column(row, "author")?,
        isbn: column(row, "isbn")?,
        total_copies: column(row, "total_copies")?,
        available_copies: column(row, "available_copies")?,
        version: column(row, "version")?,
    })
}

pub(crate) fn row_to_loan(row: &MySqlRow) -> Result<Loan, DomainError> {
    let status: String = column(row, "status")?;
    Ok(Loan {
        id: uuid_column(row, "id")?,
        user_id: uuid_column(row, "user_id")?,
        book_id: uuid_column(row, "book_id")?,
        loan_date: column(row, "loan_date")?,
        due_date: column(row, "due_date")?,
        return_date: column(row, "return_date")?,
        status: status.parse::<LoanStatus>().map_err(DomainError::internal)?,
        created_at: column(row, "created_at")?,
        updated_at: column(row, "updated_at")?,
    })
}
