//! Borrowing policy configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Default cap on concurrently checked-out loans per user
pub const DEFAULT_MAX_LOANS_PER_USER: u32 = 5;

/// Default loan period in days
pub const DEFAULT_LOAN_DURATION_DAYS: u32 = 14;

/// Borrowing rules and conflict-retry policy for the loan ledger
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LendingConfig {
    /// Maximum number of ACTIVE or OVERDUE loans a user may hold
    #[serde(default = "default_max_loans_per_user")]
    pub max_loans_per_user: u32,

    /// Days between loan date and due date
    #[serde(default = "default_loan_duration_days")]
    pub loan_duration_days: u32,

    /// Whether OVERDUE loans may be returned (ACTIVE loans always can)
    #[serde(default = "default_allow_overdue_returns")]
    pub allow_overdue_returns: bool,

    /// Attempts per ledger operation when the store reports a write conflict
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff between conflict retries in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            max_loans_per_user: default_max_loans_per_user(),
            loan_duration_days: default_loan_duration_days(),
            allow_overdue_returns: default_allow_overdue_returns(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl LendingConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_loans_per_user: env_or("LENDING_MAX_LOANS_PER_USER", defaults.max_loans_per_user),
            loan_duration_days: env_or("LENDING_LOAN_DURATION_DAYS", defaults.loan_duration_days),
            allow_overdue_returns: env_or(
                "LENDING_ALLOW_OVERDUE_RETURNS",
                defaults.allow_overdue_returns,
            ),
            max_attempts: env_or("LENDING_MAX_ATTEMPTS", defaults.max_attempts),
            retry_backoff_ms: env_or("LENDING_RETRY_BACKOFF_MS", defaults.retry_backoff_ms),
        }
    }

    /// Override the per-user loan cap
    pub fn with_max_loans_per_user(mut self, max: u32) -> Self {
        self.max_loans_per_user = max;
        self
    }

    /// Override the loan period
    pub fn with_loan_duration_days(mut self, days: u32) -> Self {
        self.loan_duration_days = days;
        self
    }

    /// Allow or forbid returning OVERDUE loans
    pub fn with_overdue_returns(mut self, allow: bool) -> Self {
        self.allow_overdue_returns = allow;
        self
    }

    /// Override the conflict retry policy
    pub fn with_retry(mut self, max_attempts: u32, backoff_ms: u64) -> Self {
        self.max_attempts = max_attempts;
        self.retry_backoff_ms = backoff_ms;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_loans_per_user == 0 {
            return Err(ConfigError::invalid(
                "lending.max_loans_per_user",
                "must be at least 1",
            ));
        }
        if self.loan_duration_days == 0 {
            return Err(ConfigError::invalid(
                "lending.loan_duration_days",
                "must be at least 1",
            ));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "lending.max_attempts",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_max_loans_per_user() -> u32 {
    DEFAULT_MAX_LOANS_PER_USER
}

fn default_loan_duration_days() -> u32 {
    DEFAULT_LOAN_DURATION_DAYS
}

fn default_allow_overdue_returns() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    25
}
