use std::sync::Arc;

use chrono::Utc;

use crate::core::pairing::{like_key, match_key, valid_pair};
use crate::models::domain::Match;
use crate::services::store::{Collections, DocumentStore};

/// Reactive match lifecycle: reciprocity detection on like creation, match
/// creation, and match teardown on block creation.
///
/// Trigger deliveries are at-least-once and unordered, so every path here
/// is idempotent by construction: record keys derive from the participant
/// pair, creation is create-if-absent, and absence on delete is success.
/// Failures are contained to the event being handled.
pub struct MatchService {
    store: Arc<dyn DocumentStore>,
    collections: Collections,
}

impl MatchService {
    pub fn new(store: Arc<dyn DocumentStore>, collections: Collections) -> Self {
        Self { store, collections }
    }

    /// A like record (from -> to) was created. If the mirrored like
    /// already exists this is a mutual-like event; otherwise the record
    /// sits until the reciprocal like's own trigger fires.
    pub async fn handle_like_created(&self, from: &str, to: &str) -> bool {
        if !valid_pair(from, to) {
            tracing::debug!("Ignoring like event with unusable pair {:?} -> {:?}", from, to);
            return false;
        }

        let mirrored = like_key(to, from);
        match self.store.get(&self.collections.likes, &mirrored).await {
            Ok(_) => {
                self.create_match(from, to).await;
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("No reciprocal like yet for {} -> {}", from, to);
            }
            Err(e) => {
                tracing::error!(
                    "Reciprocity lookup failed for {} -> {}: {}",
                    from,
                    to,
                    e
                );
            }
        }
        true
    }

    /// A block record (blocker -> subject) was created. Tear down the
    /// pair's match if one exists; outstanding one-sided likes are left
    /// standing.
    pub async fn handle_block_created(&self, blocker: &str, subject: &str) -> bool {
        if !valid_pair(blocker, subject) {
            tracing::debug!(
                "Ignoring block event with unusable pair {:?} -> {:?}",
                blocker,
                subject
            );
            return false;
        }

        let key = match_key(blocker, subject);
        match self.store.delete(&self.collections.matches, &key).await {
            Ok(()) => {
                tracing::info!("Match {} torn down after block", key);
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!("No match {} to tear down", key);
            }
            Err(e) => {
                tracing::error!("Match {} teardown failed: {}", key, e);
            }
        }
        true
    }

    /// Durably create the match for an unordered pair, then retire both
    /// consumed likes.
    ///
    /// Both directions of the mutual like can race through here; the
    /// store's atomic create-if-absent decides the winner and the loser's
    /// conflict is absorbed. Like cleanup runs after the create attempt
    /// either way.
    async fn create_match(&self, a: &str, b: &str) {
        let key = match_key(a, b);
        let record = Match::new(a, b, Utc::now());

        match serde_json::to_value(&record) {
            Ok(doc) => match self.store.insert(&self.collections.matches, &key, doc).await {
                Ok(()) => {
                    tracing::info!("Match {} created", key);
                }
                Err(e) if e.is_conflict() => {
                    tracing::debug!("Match {} already present, racing trigger won", key);
                }
                Err(e) => {
                    tracing::error!("Match {} creation failed: {}", key, e);
                }
            },
            Err(e) => {
                tracing::error!("Match {} record serialization failed: {}", key, e);
            }
        }

        self.retire_like(a, b).await;
        self.retire_like(b, a).await;
    }

    /// Delete a consumed like. The racing handler may have removed it
    /// already; that absence is success.
    async fn retire_like(&self, from: &str, to: &str) {
        let key = like_key(from, to);
        match self.store.delete(&self.collections.likes, &key).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                tracing::warn!("Like {} cleanup failed: {}", key, e);
            }
        }
    }
}
