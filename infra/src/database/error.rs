//! Translation of SQLx errors into domain errors
//!
//! Raw driver errors never leave this crate. Lock conflicts become
//! `Conflict` so the ledger retries them, connectivity problems become
//! `Unavailable`, and everything else is `Internal`.

use lending_core::errors::DomainError;
use sqlx::error::DatabaseError;
use sqlx::mysql::MySqlDatabaseError;

/// MySQL `ER_LOCK_DEADLOCK`
pub const ER_LOCK_DEADLOCK: u16 = 1213;

/// MySQL `ER_LOCK_WAIT_TIMEOUT`
pub const ER_LOCK_WAIT_TIMEOUT: u16 = 1205;

/// SQLSTATE for serialization failures, reported with deadlocks
pub const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";

/// Map a SQLx error raised while doing `context`
pub fn map_sqlx_error(context: &str, error: sqlx::Error) -> DomainError {
    match &error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => {
            tracing::warn!(context, error = %error, "Database unavailable");
            DomainError::unavailable(format!("{}: {}", context, error))
        }
        sqlx::Error::Database(db) if is_lock_conflict(db.as_ref()) => {
            tracing::debug!(context, error = %error, "Lock conflict");
            DomainError::conflict(format!("{}: {}", context, error))
        }
        _ => {
            tracing::error!(context, error = %error, "Database error");
            DomainError::internal(format!("{}: {}", context, error))
        }
    }
}

fn is_lock_conflict(error: &(dyn DatabaseError + 'static)) -> bool {
    let number = error
        .try_downcast_ref::<MySqlDatabaseError>()
        .map(MySqlDatabaseError::number);
    is_lock_conflict_code(number, error.code().as_deref())
}

/// Deadlocks and lock-wait timeouts, by MySQL error number or SQLSTATE
pub(crate) fn is_lock_conflict_code(number: Option<u16>, sqlstate: Option<&str>) -> bool {
    matches!(number, Some(ER_LOCK_DEADLOCK) | Some(ER_LOCK_WAIT_TIMEOUT))
        || sqlstate == Some(SQLSTATE_SERIALIZATION_FAILURE)
}
