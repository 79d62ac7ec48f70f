use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::FeedSettings;
use crate::core::exclusion::ExclusionSet;
use crate::core::feed::{absorb_batch, batch_size, clamp_limit};
use crate::models::domain::{Block, Cursor, Like, Match, Profile};
use crate::models::responses::FeedPage;
use crate::services::store::{Collections, DocumentStore, Scan, StoreError};

/// Errors that can occur while serving a feed page
#[derive(Debug, Error)]
pub enum FeedError {
    /// The primary profile scan failed. Surfaced to the caller as a
    /// generic internal error; the diagnostic stays in operator logs.
    #[error("feed scan failed: {0}")]
    Scan(#[source] StoreError),
}

/// Serves candidate pages for a caller: rebuilds the exclusion set from
/// point-in-time reads, then walks the profile scan with bounded refill
/// rounds.
pub struct FeedService {
    store: Arc<dyn DocumentStore>,
    collections: Collections,
    settings: FeedSettings,
}

impl FeedService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collections: Collections,
        settings: FeedSettings,
    ) -> Self {
        Self {
            store,
            collections,
            settings,
        }
    }

    /// Everyone who must not appear in this caller's feed.
    ///
    /// Four independent lookups, each of which degrades to an empty
    /// sub-set on failure: a temporarily too-permissive feed beats a
    /// failed request. The caller's own id is always excluded.
    pub async fn build_exclusions(&self, caller: &str) -> ExclusionSet {
        let (blocked, blockers, liked, matched) = tokio::join!(
            self.blocked_by_caller(caller),
            self.blockers_of_caller(caller),
            self.liked_by_caller(caller),
            self.match_partners(caller),
        );

        let mut exclusions = ExclusionSet::for_caller(caller);
        exclusions.extend(tolerate(blocked, "outgoing-blocks", caller));
        exclusions.extend(tolerate(blockers, "incoming-blocks", caller));
        exclusions.extend(tolerate(liked, "outgoing-likes", caller));
        exclusions.extend(tolerate(matched, "match-members", caller));

        tracing::debug!(
            "Excluding {} users from feed for {}",
            exclusions.len(),
            caller
        );
        exclusions
    }

    /// One page of eligible candidates, newest first.
    ///
    /// The cursor resumes strictly after the last raw candidate of the
    /// prior page, so replaying a cursor never walks backwards. When
    /// filtering leaves the page short and the raw batch was full, the
    /// scan advances and retries, bounded by `refill_rounds`.
    pub async fn fetch_page(
        &self,
        caller: &str,
        limit: Option<u16>,
        cursor: Option<Cursor>,
    ) -> Result<FeedPage, FeedError> {
        let limit = clamp_limit(limit, self.settings.default_limit, self.settings.max_limit);
        let batch = batch_size(limit, usize::from(self.settings.batch_cap));

        let exclusions = self.build_exclusions(caller).await;

        let mut accepted: Vec<Profile> = Vec::with_capacity(limit);
        let mut next_cursor = cursor;
        let mut batch_was_full;
        let mut rounds: u8 = 0;

        loop {
            let mut scan = Scan::new()
                .eq("onboardingCompleted", true)
                .order_desc("updatedAt")
                .limit(batch);
            if let Some(cursor) = next_cursor {
                scan = scan.start_after(cursor.millis());
            }

            let docs = self
                .store
                .scan(&self.collections.profiles, scan)
                .await
                .map_err(FeedError::Scan)?;

            batch_was_full = docs.len() == batch;
            let outcome = absorb_batch(decoded(docs), &exclusions, limit, &mut accepted);

            let advanced = outcome.last_cursor.is_some();
            if let Some(cursor) = outcome.last_cursor {
                next_cursor = Some(cursor);
            }

            rounds += 1;
            if accepted.len() >= limit
                || !batch_was_full
                || !advanced
                || rounds > self.settings.refill_rounds
            {
                break;
            }
        }

        let page = FeedPage {
            items: accepted
                .into_iter()
                .filter_map(Profile::into_feed_item)
                .collect(),
            next_cursor,
            has_more: batch_was_full,
        };

        tracing::info!(
            "Returning {} feed items for {} (has_more: {})",
            page.items.len(),
            caller,
            page.has_more
        );
        Ok(page)
    }

    async fn blocked_by_caller(&self, caller: &str) -> Result<Vec<String>, StoreError> {
        let docs = self
            .store
            .scan(&self.collections.blocks, Scan::new().eq("blockerUid", caller))
            .await?;
        Ok(decoded::<Block>(docs)
            .into_iter()
            .map(|b| b.subject_uid)
            .collect())
    }

    /// Cross-caller scan: blocks naming the caller as subject. The store
    /// may lack the index this needs, which is one of the failures the
    /// builder tolerates.
    async fn blockers_of_caller(&self, caller: &str) -> Result<Vec<String>, StoreError> {
        let docs = self
            .store
            .scan(&self.collections.blocks, Scan::new().eq("subjectUid", caller))
            .await?;
        Ok(decoded::<Block>(docs)
            .into_iter()
            .map(|b| b.blocker_uid)
            .collect())
    }

    async fn liked_by_caller(&self, caller: &str) -> Result<Vec<String>, StoreError> {
        let docs = self
            .store
            .scan(&self.collections.likes, Scan::new().eq("fromUid", caller))
            .await?;
        Ok(decoded::<Like>(docs).into_iter().map(|l| l.to_uid).collect())
    }

    async fn match_partners(&self, caller: &str) -> Result<Vec<String>, StoreError> {
        let docs = self
            .store
            .scan(
                &self.collections.matches,
                Scan::new().contains("members", caller),
            )
            .await?;
        Ok(decoded::<Match>(docs)
            .into_iter()
            .filter_map(|m| m.partner_of(caller).map(String::from))
            .collect())
    }
}

/// Collapse a degradable lookup failure into the empty set, keeping the
/// diagnostic for operators.
fn tolerate(
    result: Result<Vec<String>, StoreError>,
    lookup: &str,
    caller: &str,
) -> Vec<String> {
    match result {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(
                "{} lookup failed for {}, treating as empty: {}",
                lookup,
                caller,
                e
            );
            Vec::new()
        }
    }
}

fn decoded<T: DeserializeOwned>(docs: Vec<Value>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| serde_json::from_value(doc).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tolerate_swallows_failures() {
        let ok = tolerate(Ok(vec!["a".to_string()]), "outgoing-likes", "me");
        assert_eq!(ok, vec!["a"]);

        let degraded = tolerate(
            Err(StoreError::Api("missing index".into())),
            "incoming-blocks",
            "me",
        );
        assert!(degraded.is_empty());
    }
}
