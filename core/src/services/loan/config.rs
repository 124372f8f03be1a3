//! Configuration for the loan service

use lending_shared::config::LendingConfig;
use std::time::Duration;

/// Configuration for the loan service
#[derive(Debug, Clone)]
pub struct LoanServiceConfig {
    /// Cap on ACTIVE or OVERDUE loans per user
    pub max_loans_per_user: u32,
    /// Days between loan date and due date
    pub loan_duration_days: u32,
    /// Whether OVERDUE loans can be returned
    pub allow_overdue_returns: bool,
    /// Attempts per operation before a conflict is surfaced to the caller
    pub max_attempts: u32,
    /// Base delay between conflict retries
    pub retry_backoff: Duration,
}

impl Default for LoanServiceConfig {
    fn default() -> Self {
        Self::from(&LendingConfig::default())
    }
}

impl From<&LendingConfig> for LoanServiceConfig {
    fn from(config: &LendingConfig) -> Self {
        Self {
            max_loans_per_user: config.max_loans_per_user,
            loan_duration_days: config.loan_duration_days,
            allow_overdue_returns: config.allow_overdue_returns,
            max_attempts: config.max_attempts.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}
