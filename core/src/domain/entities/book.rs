//! Book entity with its copy counters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult, RuleViolation};

/// A catalogue title with a fixed number of physical copies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier for the book
    pub id: Uuid,

    pub title: String,

    pub author: String,

    pub isbn: String,

    /// Physical copies owned by the library
    pub total_copies: u32,

    /// Copies not currently checked out (`0 <= available_copies <= total_copies`)
    pub available_copies: u32,

    /// Optimistic concurrency counter, bumped by the store on every write
    pub version: u64,
}

impl Book {
    /// Creates a new Book with every copy on the shelf
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        total_copies: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            total_copies,
            available_copies: total_copies,
            version: 0,
        }
    }

    /// At least one copy is on the shelf
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// Copies currently held by ACTIVE or OVERDUE loans
    pub fn checked_out_copies(&self) -> u32 {
        self.total_copies.saturating_sub(self.available_copies)
    }

    /// Takes one copy off the shelf
    pub fn check_out(&mut self) -> Result<(), RuleViolation> {
        if !self.is_available() {
            return Err(RuleViolation::BookUnavailable);
        }
        self.available_copies -= 1;
        Ok(())
    }

    /// Puts one copy back on the shelf
    ///
    /// Fails when every copy is already on the shelf, which means the
    /// counter and the loan records have drifted apart.
    pub fn check_in(&mut self) -> DomainResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(DomainError::internal(format!(
                "Book {} already has all {} copies available",
                self.id, self.total_copies
            )));
        }
        self.available_copies += 1;
        Ok(())
    }
}
