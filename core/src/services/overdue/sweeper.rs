//! Overdue sweeper service
//!
//! Scans for ACTIVE loans past their due date and flags them OVERDUE in
//! batches. Writes are compare-and-set, so loans returned or flagged while
//! the sweep is running are skipped rather than overwritten. Book rows are
//! never touched.

use chrono::NaiveDate;
use lending_shared::config::SweeperConfig;
use mockable::Clock;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::entities::LoanStatus;
use crate::errors::DomainError;
use crate::repositories::LoanRepository;

/// Service flagging past-due loans as OVERDUE
pub struct OverdueSweeper<R: LoanRepository + 'static> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    config: SweeperConfig,
}

impl<R: LoanRepository> OverdueSweeper<R> {
    /// Create a new overdue sweeper
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, config: SweeperConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Flag every ACTIVE loan due strictly before `as_of` as OVERDUE
    ///
    /// Idempotent: running it twice for the same date changes nothing the
    /// second time.
    ///
    /// # Returns
    /// * `Ok(SweepResult)` - Counts of scanned, flagged and skipped loans
    /// * `Err(DomainError)` - If the scan or a batch write fails
    pub async fn sweep_overdue(&self, as_of: NaiveDate) -> Result<SweepResult, DomainError> {
        info!(%as_of, "Starting overdue sweep");

        let candidates = self
            .repository
            .find_by_status_due_before(LoanStatus::Active, as_of)
            .await?;

        let mut result = SweepResult {
            scanned: candidates.len(),
            ..SweepResult::default()
        };
        if candidates.is_empty() {
            info!(%as_of, "No loans to flag overdue");
            return Ok(result);
        }

        let now = self.clock.utc();
        let mut flagged = Vec::with_capacity(candidates.len());
        for mut loan in candidates {
            // Guards against repositories returning rows outside the query
            if !loan.should_be_overdue(as_of) || loan.mark_overdue(now).is_err() {
                result.skipped += 1;
                continue;
            }
            flagged.push(loan);
        }

        let batch_size = self.config.batch_size.max(1);
        for batch in flagged.chunks(batch_size) {
            let updated = self.repository.save_overdue(batch, as_of).await?;
            let updated = usize::try_from(updated).unwrap_or(batch.len()).min(batch.len());
            result.marked_overdue += updated;
            result.skipped += batch.len() - updated;
        }

        info!(
            %as_of,
            scanned = result.scanned,
            marked_overdue = result.marked_overdue,
            skipped = result.skipped,
            "Overdue sweep completed"
        );

        Ok(result)
    }

    /// Sweep as of today's date according to the injected clock
    pub async fn run_sweep(&self) -> Result<SweepResult, DomainError> {
        let today = self.clock.utc().date_naive();
        self.sweep_overdue(today).await
    }

    /// Start the sweeper as a background task
    ///
    /// This spawns a tokio task that sweeps at regular intervals. The first
    /// sweep runs immediately. A failed cycle is logged and the schedule
    /// continues.
    pub fn start_background_task(self: Arc<Self>) -> Option<tokio::task::JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Overdue sweeper is disabled");
            return None;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Overdue sweeper started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                if let Err(e) = self.run_sweep().await {
                    error!("Overdue sweep cycle failed: {}", e);
                }
            }
        }))
    }
}

/// Result of a sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    /// ACTIVE past-due loans found by the scan
    pub scanned: usize,
    /// Loans actually moved to OVERDUE
    pub marked_overdue: usize,
    /// Loans returned or flagged concurrently, left as they were
    pub skipped: usize,
}

impl SweepResult {
    /// Whether the sweep changed anything
    pub fn is_noop(&self) -> bool {
        self.marked_overdue == 0
    }
}
