// Route exports
pub mod events;
pub mod feed;

use std::sync::Arc;

use actix_web::web;

use crate::identity::IdentityVerifier;
use crate::services::{DocumentStore, FeedService, MatchService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub feed: Arc<FeedService>,
    pub matching: Arc<MatchService>,
    pub identity: Arc<IdentityVerifier>,
    /// Shared secret the trigger endpoints require when set.
    pub event_key: Option<String>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(feed::configure)
            .configure(events::configure),
    );
}
