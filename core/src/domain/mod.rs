//! Domain layer containing the lending entities and their state rules.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
