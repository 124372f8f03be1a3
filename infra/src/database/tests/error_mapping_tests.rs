//! Unit tests for SQLx to domain error mapping

use lending_core::errors::DomainError;

use crate::database::error::{
    is_lock_conflict_code, map_sqlx_error, ER_LOCK_DEADLOCK, ER_LOCK_WAIT_TIMEOUT,
};

#[test]
fn test_pool_and_io_errors_are_unavailable() {
    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

    for error in [
        sqlx::Error::PoolTimedOut,
        sqlx::Error::PoolClosed,
        sqlx::Error::Io(io),
    ] {
        let mapped = map_sqlx_error("find book", error);
        assert!(
            matches!(mapped, DomainError::Unavailable { .. }),
            "got {:?}",
            mapped
        );
        assert!(!mapped.is_retryable());
    }
}

#[test]
fn test_other_errors_are_internal() {
    let mapped = map_sqlx_error("find loan", sqlx::Error::RowNotFound);
    assert!(matches!(mapped, DomainError::Internal { .. }));

    let mapped = map_sqlx_error("save loan", sqlx::Error::Protocol("bad packet".into()));
    assert_eq!(mapped.code(), "INTERNAL_ERROR");
}

#[test]
fn test_context_is_kept_in_message() {
    let mapped = map_sqlx_error("count active loans", sqlx::Error::PoolTimedOut);
    assert!(mapped.to_string().contains("count active loans"));
}

#[test]
fn test_lock_conflict_codes() {
    assert!(is_lock_conflict_code(Some(ER_LOCK_DEADLOCK), None));
    assert!(is_lock_conflict_code(Some(ER_LOCK_WAIT_TIMEOUT), Some("HY000")));
    assert!(is_lock_conflict_code(None, Some("40001")));

    // Duplicate key is a data problem, not a conflict to retry
    assert!(!is_lock_conflict_code(Some(1062), Some("23000")));
    assert!(!is_lock_conflict_code(None, None));
}
