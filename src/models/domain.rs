use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::pairing::sorted_pair;

/// A user profile as stored in the profiles collection.
///
/// The document id is the owning user's id. Beyond the fields the feed
/// cares about, profiles carry arbitrary app-specific attributes which are
/// passed through untouched via `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "$id")]
    pub uid: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(rename = "onboardingCompleted", default)]
    pub onboarding_completed: bool,
    #[serde(rename = "hideMode", default)]
    pub hide_mode: bool,
    /// Monotonic per write; a profile without it is not feed-eligible.
    #[serde(
        rename = "updatedAt",
        with = "chrono::serde::ts_milliseconds_option",
        default
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Project this profile into the shape the feed returns to clients.
    ///
    /// Returns `None` when `updated_at` is missing, since feed items must
    /// carry the sort key they were scanned under.
    pub fn into_feed_item(self) -> Option<FeedItem> {
        let updated_at = self.updated_at?;
        Some(FeedItem {
            id: self.uid,
            display_name: self.display_name.trim().to_string(),
            bio: self.bio,
            photos: self.photos,
            updated_at: updated_at.timestamp_millis(),
            extra: self.extra,
        })
    }
}

/// The client-facing projection of an eligible profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    pub bio: String,
    pub photos: Vec<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directed like edge, keyed by `{from}_{to}`.
///
/// Created by the liking user upstream; this service only reads and retires
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "fromUid")]
    pub from_uid: String,
    #[serde(rename = "toUid")]
    pub to_uid: String,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A directed block edge, keyed by `{blocker}_{subject}`.
///
/// Queryable both by blocker (who did I block) and by subject (who blocked
/// me). Never removed by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "blockerUid")]
    pub blocker_uid: String,
    #[serde(rename = "subjectUid")]
    pub subject_uid: String,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// An undirected match between two users, keyed by the sorted pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub members: Vec<String>,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "lastActivityAt", with = "chrono::serde::ts_milliseconds")]
    pub last_activity_at: DateTime<Utc>,
}

impl Match {
    /// Build a fresh match record for an unordered pair. Members are stored
    /// sorted so the record is identical regardless of which like arrived
    /// last.
    pub fn new(a: &str, b: &str, at: DateTime<Utc>) -> Self {
        let (first, second) = sorted_pair(a, b);
        Self {
            members: vec![first.to_string(), second.to_string()],
            created_at: at,
            last_activity_at: at,
        }
    }

    pub fn involves(&self, uid: &str) -> bool {
        self.members.iter().any(|m| m == uid)
    }

    /// The other participant, if `uid` is one of the members.
    pub fn partner_of(&self, uid: &str) -> Option<&str> {
        if !self.involves(uid) {
            return None;
        }
        self.members.iter().find(|m| *m != uid).map(String::as_str)
    }
}

/// Opaque continuation token for the feed scan.
///
/// Wraps the `updated_at` millis of the last raw candidate a scan round
/// touched; values are non-increasing across successive pages of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cursor(i64);

impl Cursor {
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.timestamp_millis())
    }

    pub fn millis(self) -> i64 {
        self.0
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0.to_string()
    }
}

impl TryFrom<String> for Cursor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map(Cursor)
            .map_err(|_| format!("invalid cursor: {value:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_wire_names_and_extras() {
        let doc = json!({
            "$id": "u1",
            "displayName": "Avery",
            "bio": "hello",
            "photos": ["p1"],
            "onboardingCompleted": true,
            "hideMode": false,
            "updatedAt": 1700000000000i64,
            "soberDate": "2023-01-01",
        });

        let profile: Profile = serde_json::from_value(doc).unwrap();
        assert_eq!(profile.uid, "u1");
        assert_eq!(profile.display_name, "Avery");
        assert!(profile.onboarding_completed);
        assert_eq!(
            profile.updated_at.unwrap().timestamp_millis(),
            1700000000000
        );
        assert_eq!(profile.extra.get("soberDate").unwrap(), "2023-01-01");
    }

    #[test]
    fn test_profile_defaults_for_missing_fields() {
        let profile: Profile = serde_json::from_value(json!({"$id": "u2"})).unwrap();
        assert!(!profile.onboarding_completed);
        assert!(!profile.hide_mode);
        assert!(profile.updated_at.is_none());
        assert!(profile.photos.is_empty());
    }

    #[test]
    fn test_feed_item_projection_requires_updated_at() {
        let without: Profile = serde_json::from_value(json!({"$id": "u3"})).unwrap();
        assert!(without.into_feed_item().is_none());

        let with: Profile = serde_json::from_value(json!({
            "$id": "u4",
            "displayName": "  Blair  ",
            "photos": ["p"],
            "updatedAt": 1700000000000i64,
            "soberDate": "2022-06-01",
        }))
        .unwrap();
        let item = with.into_feed_item().unwrap();
        assert_eq!(item.display_name, "Blair");
        assert_eq!(item.updated_at, 1700000000000);
        assert_eq!(item.extra.get("soberDate").unwrap(), "2022-06-01");
    }

    #[test]
    fn test_match_members_sorted() {
        let now = Utc::now();
        let m = Match::new("zoe", "adam", now);
        assert_eq!(m.members, vec!["adam", "zoe"]);
        assert_eq!(m.created_at, m.last_activity_at);
        assert_eq!(m.partner_of("zoe"), Some("adam"));
        assert_eq!(m.partner_of("nobody"), None);
    }

    #[test]
    fn test_cursor_is_an_opaque_string_on_the_wire() {
        let cursor = Cursor::from_millis(1700000000000);
        let wire = serde_json::to_value(cursor).unwrap();
        assert_eq!(wire, json!("1700000000000"));

        let decoded: Cursor = serde_json::from_value(wire).unwrap();
        assert_eq!(decoded.millis(), 1700000000000);

        let bad: Result<Cursor, _> = serde_json::from_value(json!("not-a-cursor"));
        assert!(bad.is_err());
    }
}
