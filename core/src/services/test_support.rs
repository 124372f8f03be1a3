//! Fixtures shared by the service tests

use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Arc, Mutex};

use crate::domain::entities::{Book, User};
use crate::repositories::MockLibraryStore;

/// Clock whose time only moves when told to
#[derive(Debug, Clone)]
pub(crate) struct MutableClock(Arc<Mutex<DateTime<Utc>>>);

impl MutableClock {
    pub(crate) fn at(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    pub(crate) fn advance_days(&self, days: u64) {
        let mut now = self.0.lock().expect("clock mutex");
        *now = now
            .checked_add_days(Days::new(days))
            .expect("date in range");
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.utc().date_naive()
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// 2024-03-01 09:00 UTC
pub(crate) fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

pub(crate) fn fixture_clock() -> MutableClock {
    MutableClock::at(fixture_now())
}

pub(crate) async fn seed_user(store: &MockLibraryStore, name: &str) -> User {
    let email = format!("{}@example.org", name.to_lowercase());
    store.insert_user(User::borrower(email, name)).await
}

pub(crate) async fn seed_book(store: &MockLibraryStore, title: &str, copies: u32) -> Book {
    store
        .insert_book(Book::new(title, "Anonymous", format!("isbn-{}", title), copies))
        .await
}

/// `available_copies` agrees with the committed ACTIVE/OVERDUE loans
pub(crate) async fn assert_counter_invariant(store: &MockLibraryStore, book: &Book) {
    let stored = store.book(book.id).await.expect("book exists");
    let checked_out = store.checked_out_count(book.id).await;
    assert!(stored.available_copies <= stored.total_copies);
    assert_eq!(
        stored.available_copies,
        stored.total_copies - checked_out,
        "counter drifted for {}",
        stored.title
    );
}
