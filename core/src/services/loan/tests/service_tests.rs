//! Loan ledger behaviour against the in-memory store

use chrono::Days;
use lending_shared::config::LendingConfig;
use lending_shared::types::Pagination;
use mockable::Clock;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Loan, LoanStatus};
use crate::errors::{DomainError, RuleViolation};
use crate::repositories::{LoanFilter, MockLibraryStore};
use crate::services::loan::{LoanService, LoanServiceConfig};
use crate::services::test_support::{
    assert_counter_invariant, fixture_clock, seed_book, seed_user, MutableClock,
};

fn config() -> LoanServiceConfig {
    LoanServiceConfig::from(&LendingConfig::default().with_retry(3, 0))
}

fn service(
    store: &MockLibraryStore,
    clock: &MutableClock,
    config: LoanServiceConfig,
) -> LoanService<MockLibraryStore, MockLibraryStore> {
    let store = Arc::new(store.clone());
    LoanService::new(store.clone(), store, Arc::new(clock.clone()), config)
}

fn rule(result: Result<Loan, DomainError>) -> RuleViolation {
    match result {
        Err(DomainError::RuleViolation(rule)) => rule,
        other => panic!("expected a rule violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_loan_sets_dates_and_decrements_copies() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Ada").await;
    let book = seed_book(&store, "Dune", 2).await;

    let loan = ledger.create_loan(user.id, book.id).await.unwrap();

    assert_eq!(loan.status, LoanStatus::Active);
    assert_eq!(loan.loan_date, clock.today());
    assert_eq!(loan.due_date, clock.today().checked_add_days(Days::new(14)).unwrap());
    assert_eq!(loan.return_date, None);
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 1);
    assert_counter_invariant(&store, &book).await;
}

#[tokio::test]
async fn test_create_loan_unknown_user_or_book() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Ada").await;
    let book = seed_book(&store, "Dune", 1).await;

    let missing_user = ledger.create_loan(Uuid::new_v4(), book.id).await;
    assert!(matches!(
        missing_user,
        Err(DomainError::NotFound { ref resource, .. }) if resource == "User"
    ));

    let missing_book = ledger.create_loan(user.id, Uuid::new_v4()).await;
    assert!(matches!(
        missing_book,
        Err(DomainError::NotFound { ref resource, .. }) if resource == "Book"
    ));

    // User is checked before book
    let both = ledger.create_loan(Uuid::new_v4(), Uuid::new_v4()).await;
    assert!(matches!(
        both,
        Err(DomainError::NotFound { ref resource, .. }) if resource == "User"
    ));
}

#[tokio::test]
async fn test_single_copy_scenario() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let first = seed_user(&store, "First").await;
    let second = seed_user(&store, "Second").await;
    let book = seed_book(&store, "Emma", 1).await;

    let loan = ledger.create_loan(first.id, book.id).await.unwrap();
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 0);
    assert_eq!(loan.due_date, clock.today().checked_add_days(Days::new(14)).unwrap());

    let refused = ledger.create_loan(second.id, book.id).await;
    assert_eq!(rule(refused), RuleViolation::BookUnavailable);

    let returned = ledger.return_book(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.return_date, Some(clock.today()));
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 1);

    ledger.create_loan(second.id, book.id).await.unwrap();
    assert_counter_invariant(&store, &book).await;
}

#[tokio::test]
async fn test_max_loans_scenario() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Greedy").await;

    for i in 0..5 {
        let book = seed_book(&store, &format!("Volume {}", i), 1).await;
        ledger.create_loan(user.id, book.id).await.unwrap();
    }
    let sixth = seed_book(&store, "Volume 6", 3).await;

    let refused = ledger.create_loan(user.id, sixth.id).await;
    assert_eq!(rule(refused), RuleViolation::MaxLoansReached { limit: 5 });
    assert_eq!(store.book(sixth.id).await.unwrap().available_copies, 3);
}

#[tokio::test]
async fn test_loan_cap_follows_config_and_counts_overdue_loans() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let mut cfg = config();
    cfg.max_loans_per_user = 2;
    let ledger = service(&store, &clock, cfg);
    let user = seed_user(&store, "Capped").await;
    let a = seed_book(&store, "A", 1).await;
    let b = seed_book(&store, "B", 1).await;
    let c = seed_book(&store, "C", 1).await;

    ledger.create_loan(user.id, a.id).await.unwrap();
    let mut overdue = ledger.create_loan(user.id, b.id).await.unwrap();
    overdue.mark_overdue(clock.utc()).unwrap();
    store.insert_loan(overdue.clone()).await;

    let refused = ledger.create_loan(user.id, c.id).await;
    assert_eq!(rule(refused), RuleViolation::MaxLoansReached { limit: 2 });

    ledger.return_book(overdue.id).await.unwrap();
    ledger.create_loan(user.id, c.id).await.unwrap();
}

#[tokio::test]
async fn test_cap_is_checked_before_availability() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let mut cfg = config();
    cfg.max_loans_per_user = 1;
    let ledger = service(&store, &clock, cfg);
    let user = seed_user(&store, "Ordered").await;
    let other = seed_user(&store, "Other").await;
    let held = seed_book(&store, "Held", 1).await;
    let empty = seed_book(&store, "Empty", 1).await;

    ledger.create_loan(user.id, held.id).await.unwrap();
    ledger.create_loan(other.id, empty.id).await.unwrap();

    let refused = ledger.create_loan(user.id, empty.id).await;
    assert_eq!(rule(refused), RuleViolation::MaxLoansReached { limit: 1 });
}

#[tokio::test]
async fn test_duplicate_loan_of_same_book() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Twice").await;
    let book = seed_book(&store, "Popular", 3).await;

    ledger.create_loan(user.id, book.id).await.unwrap();
    let refused = ledger.create_loan(user.id, book.id).await;

    assert_eq!(rule(refused), RuleViolation::DuplicateLoan);
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 2);
    assert_counter_invariant(&store, &book).await;
}

#[tokio::test]
async fn test_availability_is_checked_before_duplicate() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Holder").await;
    let book = seed_book(&store, "Solo", 1).await;

    ledger.create_loan(user.id, book.id).await.unwrap();
    let refused = ledger.create_loan(user.id, book.id).await;

    assert_eq!(rule(refused), RuleViolation::BookUnavailable);
}

#[tokio::test]
async fn test_return_is_not_idempotent() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Returner").await;
    let book = seed_book(&store, "Beloved", 2).await;

    let loan = ledger.create_loan(user.id, book.id).await.unwrap();
    ledger.return_book(loan.id).await.unwrap();
    let second = ledger.return_book(loan.id).await;

    assert_eq!(
        rule(second),
        RuleViolation::LoanNotActive {
            status: LoanStatus::Returned
        }
    );
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 2);
    assert_counter_invariant(&store, &book).await;
}

#[tokio::test]
async fn test_return_unknown_loan() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());

    let result = ledger.return_book(Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(DomainError::NotFound { ref resource, .. }) if resource == "Loan"
    ));
}

#[tokio::test]
async fn test_overdue_return_follows_policy() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let user = seed_user(&store, "Late").await;
    let book = seed_book(&store, "Ulysses", 1).await;

    let lenient = service(&store, &clock, config());
    let mut loan = lenient.create_loan(user.id, book.id).await.unwrap();
    clock.advance_days(30);
    loan.mark_overdue(clock.utc()).unwrap();
    store.insert_loan(loan.clone()).await;

    let mut strict_cfg = config();
    strict_cfg.allow_overdue_returns = false;
    let strict = service(&store, &clock, strict_cfg);
    let refused = strict.return_book(loan.id).await;
    assert_eq!(
        rule(refused),
        RuleViolation::LoanNotActive {
            status: LoanStatus::Overdue
        }
    );
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 0);

    let returned = lenient.return_book(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(returned.return_date, Some(clock.today()));
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 1);
}

#[tokio::test]
async fn test_conflicts_are_retried() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Retry").await;
    let book = seed_book(&store, "Contended", 1).await;

    store.fail_next_commits(2);
    let loan = ledger.create_loan(user.id, book.id).await.unwrap();

    assert_eq!(store.loans().await.len(), 1);
    assert_eq!(store.loan(loan.id).await.unwrap().status, LoanStatus::Active);
    assert_counter_invariant(&store, &book).await;
}

#[tokio::test]
async fn test_conflict_surfaces_after_max_attempts() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Unlucky").await;
    let book = seed_book(&store, "Contended", 1).await;

    store.fail_next_commits(3);
    let result = ledger.create_loan(user.id, book.id).await;

    assert!(matches!(result, Err(DomainError::Conflict { .. })));
    assert!(store.loans().await.is_empty());
    assert_eq!(store.book(book.id).await.unwrap().available_copies, 1);

    // The budget is per call
    ledger.create_loan(user.id, book.id).await.unwrap();
}

#[tokio::test]
async fn test_rule_violations_are_not_retried() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Once").await;
    let book = seed_book(&store, "Gone", 0).await;

    store.fail_next_commits(1);
    let refused = ledger.create_loan(user.id, book.id).await;
    assert_eq!(rule(refused), RuleViolation::BookUnavailable);

    // The pending conflict is only consumed by the next commit, then retried
    let other = seed_book(&store, "Here", 1).await;
    let result = ledger.create_loan(user.id, other.id).await;
    assert!(result.is_ok());
    assert_eq!(store.loans().await.len(), 1);
}

#[tokio::test]
async fn test_unavailable_store_is_surfaced() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Offline").await;
    let book = seed_book(&store, "Offline", 1).await;

    store.set_unavailable(true);
    let create = ledger.create_loan(user.id, book.id).await;
    let get = ledger.get_loan(Uuid::new_v4()).await;
    let list = ledger.list_loans(LoanFilter::all(), Pagination::default()).await;

    assert!(matches!(create, Err(DomainError::Unavailable { .. })));
    assert!(matches!(get, Err(DomainError::Unavailable { .. })));
    assert!(matches!(list, Err(DomainError::Unavailable { .. })));
}

#[tokio::test]
async fn test_get_loan() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let user = seed_user(&store, "Reader").await;
    let book = seed_book(&store, "Kindred", 1).await;

    let loan = ledger.create_loan(user.id, book.id).await.unwrap();
    assert_eq!(ledger.get_loan(loan.id).await.unwrap(), loan);

    let missing = ledger.get_loan(Uuid::new_v4()).await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_list_loans_pagination_and_filters() {
    let store = MockLibraryStore::new();
    let clock = fixture_clock();
    let ledger = service(&store, &clock, config());
    let reader = seed_user(&store, "Reader").await;
    let other = seed_user(&store, "Other").await;

    let mut reader_loans = Vec::new();
    for i in 0..3 {
        let book = seed_book(&store, &format!("Book {}", i), 2).await;
        reader_loans.push(ledger.create_loan(reader.id, book.id).await.unwrap());
        ledger.create_loan(other.id, book.id).await.unwrap();
        clock.advance_days(1);
    }
    ledger.return_book(reader_loans[0].id).await.unwrap();

    let page = ledger
        .list_loans(LoanFilter::all().for_user(reader.id), Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next);
    assert!(!page.has_prev);
    assert_eq!(page.data[0].id, reader_loans[2].id);
    assert_eq!(page.data[1].id, reader_loans[1].id);

    let returned = ledger
        .list_loans(
            LoanFilter::all().with_status(LoanStatus::Returned),
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(returned.total, 1);
    assert_eq!(returned.data[0].id, reader_loans[0].id);

    let everything = ledger
        .list_loans(LoanFilter::all(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(everything.total, 6);
    assert!(!everything.has_next);
}
