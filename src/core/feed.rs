//! Pure page-assembly mechanics for the candidate feed.
//!
//! The scan itself lives in the service layer; everything here operates on
//! already-fetched batches so the filtering contract can be tested without
//! a store.

use crate::core::exclusion::ExclusionSet;
use crate::models::domain::{Cursor, Profile};

/// Clamp a requested page size into the allowed window. Zero and absent
/// requests get sane values instead of errors.
pub fn clamp_limit(requested: Option<u16>, default: u16, max: u16) -> usize {
    let limit = requested.unwrap_or(default);
    usize::from(limit.clamp(1, max.max(1)))
}

/// Raw candidates fetched per scan round. Over-fetching absorbs filter
/// attrition without needing a multi-predicate index.
pub fn batch_size(limit: usize, cap: usize) -> usize {
    (limit * 3).min(cap).max(1)
}

/// A profile is feed-eligible when it is onboarded, not hidden, carries the
/// sort key, and has the required display fields (a non-blank name and at
/// least one photo).
pub fn is_feed_eligible(profile: &Profile) -> bool {
    profile.onboarding_completed
        && !profile.hide_mode
        && profile.updated_at.is_some()
        && !profile.display_name.trim().is_empty()
        && !profile.photos.is_empty()
}

/// What one scan round contributed.
#[derive(Debug)]
pub struct BatchOutcome {
    /// How many raw candidates the round fetched, before any filtering.
    pub raw_len: usize,
    /// Resume point: the sort key of the last raw candidate. Intentionally
    /// not the last accepted one, so pagination progress is independent of
    /// filter attrition.
    pub last_cursor: Option<Cursor>,
}

/// Filter one raw batch in arrival order, appending accepted profiles
/// until `limit` is reached.
pub fn absorb_batch(
    batch: Vec<Profile>,
    exclusions: &ExclusionSet,
    limit: usize,
    accepted: &mut Vec<Profile>,
) -> BatchOutcome {
    let raw_len = batch.len();
    let last_cursor = batch
        .last()
        .and_then(|p| p.updated_at)
        .map(Cursor::from_datetime);

    for profile in batch {
        if accepted.len() >= limit {
            break;
        }
        if exclusions.contains(&profile.uid) {
            continue;
        }
        if !is_feed_eligible(&profile) {
            continue;
        }
        accepted.push(profile);
    }

    BatchOutcome {
        raw_len,
        last_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn ts(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    fn profile(uid: &str, millis: i64) -> Profile {
        Profile {
            uid: uid.to_string(),
            display_name: format!("User {uid}"),
            bio: String::new(),
            photos: vec!["photo".to_string()],
            onboarding_completed: true,
            hide_mode: false,
            updated_at: Some(ts(millis)),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_clamp_limit_bounds() {
        assert_eq!(clamp_limit(Some(0), 25, 50), 1);
        assert_eq!(clamp_limit(Some(1000), 25, 50), 50);
        assert_eq!(clamp_limit(None, 25, 50), 25);
        assert_eq!(clamp_limit(Some(10), 25, 50), 10);
    }

    #[test]
    fn test_batch_size_capped() {
        assert_eq!(batch_size(25, 150), 75);
        assert_eq!(batch_size(50, 150), 150);
        assert_eq!(batch_size(50, 90), 90);
    }

    #[test]
    fn test_eligibility_requirements() {
        let good = profile("u1", 100);
        assert!(is_feed_eligible(&good));

        let mut hidden = profile("u2", 100);
        hidden.hide_mode = true;
        assert!(!is_feed_eligible(&hidden));

        let mut onboarding = profile("u3", 100);
        onboarding.onboarding_completed = false;
        assert!(!is_feed_eligible(&onboarding));

        let mut no_sort_key = profile("u4", 100);
        no_sort_key.updated_at = None;
        assert!(!is_feed_eligible(&no_sort_key));

        let mut blank_name = profile("u5", 100);
        blank_name.display_name = "   ".to_string();
        assert!(!is_feed_eligible(&blank_name));

        let mut no_photos = profile("u6", 100);
        no_photos.photos.clear();
        assert!(!is_feed_eligible(&no_photos));
    }

    #[test]
    fn test_absorb_batch_filters_and_preserves_order() {
        let exclusions = ExclusionSet::for_caller("me");
        let mut hidden = profile("hidden", 400);
        hidden.hide_mode = true;

        let batch = vec![
            profile("a", 500),
            hidden,
            profile("me", 300),
            profile("b", 200),
        ];

        let mut accepted = Vec::new();
        let outcome = absorb_batch(batch, &exclusions, 10, &mut accepted);

        assert_eq!(outcome.raw_len, 4);
        let ids: Vec<&str> = accepted.iter().map(|p| p.uid.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_cursor_comes_from_last_raw_candidate() {
        let exclusions = ExclusionSet::for_caller("me");
        let mut tail = profile("tail", 100);
        tail.hide_mode = true; // filtered out, yet still the resume point

        let batch = vec![profile("a", 500), tail];
        let mut accepted = Vec::new();
        let outcome = absorb_batch(batch, &exclusions, 10, &mut accepted);

        assert_eq!(accepted.len(), 1);
        assert_eq!(outcome.last_cursor, Some(Cursor::from_millis(100)));
    }

    #[test]
    fn test_absorb_batch_stops_at_limit() {
        let exclusions = ExclusionSet::for_caller("me");
        let batch = (0..10).map(|i| profile(&format!("u{i}"), 1000 - i)).collect();

        let mut accepted = Vec::new();
        let outcome = absorb_batch(batch, &exclusions, 3, &mut accepted);

        assert_eq!(accepted.len(), 3);
        assert_eq!(outcome.raw_len, 10);
        // Cursor still advances past the whole batch.
        assert_eq!(outcome.last_cursor, Some(Cursor::from_millis(991)));
    }

    #[test]
    fn test_empty_batch_yields_no_cursor() {
        let exclusions = ExclusionSet::for_caller("me");
        let mut accepted = Vec::new();
        let outcome = absorb_batch(Vec::new(), &exclusions, 5, &mut accepted);
        assert_eq!(outcome.raw_len, 0);
        assert!(outcome.last_cursor.is_none());
    }
}
