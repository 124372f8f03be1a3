//! Lending worker: runs the overdue sweeper against MySQL.
//!
//! Usage: `lending-worker [--once]`. With `--once` a single sweep runs for
//! today's date and the process exits; otherwise the sweeper runs on its
//! configured schedule until Ctrl-C.

use anyhow::{bail, Context};
use lending_core::services::OverdueSweeper;
use lending_infra::database::{DatabasePool, MySqlLoanRepository};
use lending_infra::telemetry;
use lending_shared::config::{AppConfig, Environment};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env files if present
    dotenvy::dotenv().ok();
    dotenvy::from_filename(Environment::from_env().env_file()).ok();

    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.logging)?;

    info!(environment = %config.environment, "Starting lending worker");

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the database")?;
    pool.run_migrations().await?;
    if !pool.health_check().await? {
        bail!("database health check failed");
    }
    info!("{}", pool.get_statistics());

    let loans = Arc::new(MySqlLoanRepository::new(pool.get_pool().clone()));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let sweeper = Arc::new(OverdueSweeper::new(loans, clock, config.sweeper.clone()));

    if std::env::args().any(|arg| arg == "--once") {
        let result = sweeper.run_sweep().await?;
        info!(
            scanned = result.scanned,
            marked_overdue = result.marked_overdue,
            skipped = result.skipped,
            "Single sweep finished"
        );
        pool.close().await;
        return Ok(());
    }

    let task = sweeper.start_background_task();

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    if let Some(task) = task {
        task.abort();
    }
    pool.close().await;

    Ok(())
}
