use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::AppState;
use crate::models::{ErrorResponse, FeedRequest, HealthResponse};
use crate::services::FeedError;

/// Configure the caller-facing routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/feed", web::post().to(feed_page));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health().await.is_ok();
    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Feed endpoint
///
/// POST /api/v1/feed
///
/// Request body:
/// ```json
/// {
///   "limit": 25,
///   "cursor": "1700000000000"
/// }
/// ```
///
/// Requires a verified caller identity; the page excludes the caller and
/// everyone in their block/like/match relationships.
async fn feed_page(
    state: web::Data<AppState>,
    req: web::Json<FeedRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let caller = match state.identity.caller_uid(&http_req) {
        Ok(uid) => uid,
        Err(e) => {
            tracing::info!("Rejected unauthenticated feed request: {}", e);
            return HttpResponse::Unauthorized().json(ErrorResponse {
                error: "unauthenticated".to_string(),
                message: "Sign in required.".to_string(),
                status_code: 401,
            });
        }
    };

    tracing::debug!(
        "Serving feed for {}: limit={:?}, cursor={:?}",
        caller,
        req.limit,
        req.cursor
    );

    match state.feed.fetch_page(&caller, req.limit, req.cursor).await {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(FeedError::Scan(e)) => {
            tracing::error!("Feed scan failed for {}: {}", caller, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "internal".to_string(),
                message: "The feed is temporarily unavailable.".to_string(),
                status_code: 500,
            })
        }
    }
}
