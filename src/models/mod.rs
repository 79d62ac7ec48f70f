// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Block, Cursor, FeedItem, Like, Match, Profile};
pub use requests::{BlockCreatedEvent, FeedRequest, LikeCreatedEvent};
pub use responses::{ErrorResponse, FeedPage, HealthResponse, TriggerAck};
