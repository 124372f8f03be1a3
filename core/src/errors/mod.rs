//! Domain-specific error types and error handling.

mod rule_violation;

pub use rule_violation::RuleViolation;

use std::fmt::Display;
use thiserror::Error;

/// Core domain errors surfaced by the loan ledger and overdue sweeper
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Resource not found: {resource} {id}")]
    NotFound { resource: String, id: String },

    #[error("Business rule violation: {0}")]
    RuleViolation(#[from] RuleViolation),

    /// A concurrent write invalidated the operation's preconditions
    #[error("Conflicting concurrent update: {message}")]
    Conflict { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(resource: &str, id: impl Display) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::RuleViolation(_) => "RULE_VIOLATION",
            DomainError::Conflict { .. } => "CONFLICT",
            DomainError::Unavailable { .. } => "UNAVAILABLE",
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Only conflicts are worth re-running the whole validate-then-write sequence for
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict { .. })
    }

    /// The rule that was violated, if this is a rule violation
    pub fn rule_violation(&self) -> Option<&RuleViolation> {
        match self {
            DomainError::RuleViolation(rule) => Some(rule),
            _ => None,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
