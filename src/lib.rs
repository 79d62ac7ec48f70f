//! Haven Feed - candidate feed and match lifecycle service for the Haven dating app
//!
//! This library serves paginated candidate profiles (excluding blocked,
//! liked and matched users without composite indexes) and reacts to like
//! and block creation events to maintain match records idempotently.

pub mod config;
pub mod core;
pub mod identity;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{match_key, ExclusionSet};
pub use crate::models::{Cursor, FeedItem, FeedPage, Profile};
pub use crate::services::{DocumentStore, FeedService, MatchService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        assert_eq!(match_key("u2", "u1"), "u1_u2");
    }
}
