//! Overdue sweeper for periodic maintenance of loan statuses
//!
//! Promotes ACTIVE loans whose due date has passed to OVERDUE, either on
//! demand or from a background tokio task.

mod sweeper;


pub use sweeper::{OverdueSweeper, SweepResult};
