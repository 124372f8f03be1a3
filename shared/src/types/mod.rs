//! Type definitions shared across crates
//!
//! - `pagination` - Page requests and paginated results for list queries

pub mod pagination;

pub use pagination::{PaginatedResponse, Pagination};
