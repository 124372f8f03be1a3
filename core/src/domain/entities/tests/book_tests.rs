//! Unit tests for Book copy counters

use crate::domain::entities::book::Book;
use crate::errors::{DomainError, RuleViolation};

#[test]
fn test_new_book_has_all_copies_available() {
    let book = Book::new("Dune", "Frank Herbert", "9780441013593", 3);
    assert_eq!(book.total_copies, 3);
    assert_eq!(book.available_copies, 3);
    assert_eq!(book.checked_out_copies(), 0);
    assert_eq!(book.version, 0);
    assert!(book.is_available());
}

#[test]
fn test_check_out_until_empty() {
    let mut book = Book::new("Dune", "Frank Herbert", "9780441013593", 2);

    assert!(book.check_out().is_ok());
    assert!(book.check_out().is_ok());
    assert_eq!(book.available_copies, 0);
    assert_eq!(book.checked_out_copies(), 2);
    assert!(!book.is_available());

    assert_eq!(book.check_out(), Err(RuleViolation::BookUnavailable));
    assert_eq!(book.available_copies, 0);
}

#[test]
fn test_check_in_never_exceeds_total() {
    let mut book = Book::new("Dune", "Frank Herbert", "9780441013593", 1);
    book.check_out().unwrap();

    assert!(book.check_in().is_ok());
    assert_eq!(book.available_copies, 1);

    let err = book.check_in().unwrap_err();
    assert!(matches!(err, DomainError::Internal { .. }));
    assert_eq!(book.available_copies, 1);
}
