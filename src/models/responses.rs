use serde::{Deserialize, Serialize};

use crate::models::domain::{Cursor, FeedItem};

/// One page of the candidate feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    #[serde(rename = "nextCursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<Cursor>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

/// Acknowledgement for a trigger delivery.
///
/// `processed` is informational only; redeliveries of an already-handled
/// event still ack successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerAck {
    pub processed: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
