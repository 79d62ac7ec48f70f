//! Document-store interface.
//!
//! The store organizes records into named collections keyed by id and
//! offers exactly the primitives this service leans on: point reads,
//! atomic create-if-absent writes, deletes, and single-sort-key range
//! scans with equality prefilters. Create-if-absent is the only
//! concurrency-control primitive; no external locking exists anywhere.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpStore;
pub use memory::MemoryStore;

/// Errors that can occur when interacting with the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Absence of the target record, the expected outcome for deletes that
    /// lost a race.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// A create-if-absent that lost a race. A success path for idempotent
    /// writers, never an error to surface.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::AlreadyExists(_))
    }
}

/// Equality-style prefilter on a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the given value.
    Eq(&'static str, Value),
    /// Array field contains the given value. May require a cross-partition
    /// index the deployment does not have; callers treat failures of such
    /// scans as degradable.
    Contains(&'static str, Value),
}

/// A single-sort-key range scan.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    pub filters: Vec<Filter>,
    /// Sort field, descending.
    pub order_desc: Option<&'static str>,
    /// Resume strictly after this sort-key value (exclusive, in scan
    /// direction).
    pub start_after: Option<Value>,
    pub limit: Option<usize>,
}

impl Scan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field, value.into()));
        self
    }

    pub fn contains(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Contains(field, value.into()));
        self
    }

    pub fn order_desc(mut self, field: &'static str) -> Self {
        self.order_desc = Some(field);
        self
    }

    pub fn start_after(mut self, value: impl Into<Value>) -> Self {
        self.start_after = Some(value.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// The persistence seam. Every method is a suspension point; no lock is
/// held across any of them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read. Absent keys fail with `NotFound`.
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// Atomic create-if-absent. Fails with `AlreadyExists` when the key is
    /// already taken; the first writer wins and every other writer sees the
    /// conflict.
    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Point delete. Absent keys fail with `NotFound`, which callers on
    /// cleanup paths treat as success.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Range scan; returned documents carry their id under `$id`.
    async fn scan(&self, collection: &str, scan: Scan) -> Result<Vec<Value>, StoreError>;

    /// Liveness probe for health reporting.
    async fn health(&self) -> Result<(), StoreError>;
}

/// Collection IDs resolved from configuration
#[derive(Debug, Clone)]
pub struct Collections {
    pub profiles: String,
    pub likes: String,
    pub blocks: String,
    pub matches: String,
}

impl From<&crate::config::CollectionSettings> for Collections {
    fn from(settings: &crate::config::CollectionSettings) -> Self {
        Self {
            profiles: settings.profiles.clone(),
            likes: settings.likes.clone(),
            blocks: settings.blocks.clone(),
            matches: settings.matches.clone(),
        }
    }
}
