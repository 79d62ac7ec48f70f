use serde::{Deserialize, Serialize};

use crate::models::domain::Cursor;

/// Request body for a feed page.
///
/// `limit` is clamped server-side; `cursor` resumes a prior scan. A
/// malformed cursor is rejected at deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedRequest {
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    pub cursor: Option<Cursor>,
}

/// Trigger payload: a like record was created.
///
/// Delivered at least once, with no ordering guarantee relative to other
/// events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeCreatedEvent {
    #[serde(alias = "from_uid", rename = "fromUid")]
    pub from_uid: String,
    #[serde(alias = "to_uid", rename = "toUid")]
    pub to_uid: String,
}

/// Trigger payload: a block record was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockCreatedEvent {
    #[serde(alias = "blocker_uid", rename = "blockerUid")]
    pub blocker_uid: String,
    #[serde(alias = "subject_uid", rename = "subjectUid")]
    pub subject_uid: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feed_request_defaults() {
        let req: FeedRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.limit.is_none());
        assert!(req.cursor.is_none());
    }

    #[test]
    fn test_feed_request_rejects_malformed_cursor() {
        let req: Result<FeedRequest, _> =
            serde_json::from_value(json!({"cursor": "garbage"}));
        assert!(req.is_err());
    }

    #[test]
    fn test_event_payloads_accept_snake_case_aliases() {
        let like: LikeCreatedEvent =
            serde_json::from_value(json!({"from_uid": "a", "to_uid": "b"})).unwrap();
        assert_eq!(like.from_uid, "a");

        let block: BlockCreatedEvent =
            serde_json::from_value(json!({"blockerUid": "a", "subjectUid": "b"})).unwrap();
        assert_eq!(block.subject_uid, "b");
    }
}
