// Service exports
pub mod feed;
pub mod matching;
pub mod store;

pub use feed::{FeedError, FeedService};
pub use matching::MatchService;
pub use store::{Collections, DocumentStore, Filter, HttpStore, MemoryStore, Scan, StoreError};
