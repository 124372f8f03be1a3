//! User entity representing a library patron or staff member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a user; drives authorization only, never loan rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Regular patron
    Borrower,
    /// Staff handling loans and returns
    Librarian,
    /// Full administrative access
    Admin,
}

impl UserRole {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Borrower => "BORROWER",
            UserRole::Librarian => "LIBRARIAN",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            // Older rows use the original `USER` role name for patrons
            "BORROWER" | "USER" => Ok(UserRole::Borrower),
            "LIBRARIAN" => Ok(UserRole::Librarian),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    pub email: String,

    pub full_name: String,

    pub role: UserRole,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance
    pub fn new(email: impl Into<String>, full_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            full_name: full_name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// Shorthand for a new borrower
    pub fn borrower(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self::new(email, full_name, UserRole::Borrower)
    }
}
