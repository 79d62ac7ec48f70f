use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::AppState;
use crate::models::{BlockCreatedEvent, ErrorResponse, LikeCreatedEvent, TriggerAck};

const EVENT_KEY_HEADER: &str = "x-haven-event-key";

/// Configure the trigger routes invoked by the document-store platform.
///
/// Both endpoints receive at-least-once deliveries with no ordering
/// guarantee; the handlers behind them are idempotent, so redeliveries
/// ack successfully.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/events/like-created", web::post().to(like_created))
        .route("/events/block-created", web::post().to(block_created));
}

fn authorized(state: &AppState, req: &HttpRequest) -> bool {
    let Some(expected) = &state.event_key else {
        return true;
    };
    req.headers()
        .get(EVENT_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |key| key == expected.as_str())
}

fn rejected() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "unauthorized".to_string(),
        message: "Missing or invalid event key.".to_string(),
        status_code: 401,
    })
}

/// Trigger endpoint: a like record was created
///
/// POST /api/v1/events/like-created
async fn like_created(
    state: web::Data<AppState>,
    payload: web::Json<LikeCreatedEvent>,
    http_req: HttpRequest,
) -> impl Responder {
    if !authorized(&state, &http_req) {
        tracing::info!("Rejected like event without valid event key");
        return rejected();
    }

    let processed = state
        .matching
        .handle_like_created(&payload.from_uid, &payload.to_uid)
        .await;
    HttpResponse::Ok().json(TriggerAck { processed })
}

/// Trigger endpoint: a block record was created
///
/// POST /api/v1/events/block-created
async fn block_created(
    state: web::Data<AppState>,
    payload: web::Json<BlockCreatedEvent>,
    http_req: HttpRequest,
) -> impl Responder {
    if !authorized(&state, &http_req) {
        tracing::info!("Rejected block event without valid event key");
        return rejected();
    }

    let processed = state
        .matching
        .handle_block_created(&payload.blocker_uid, &payload.subject_uid)
        .await;
    HttpResponse::Ok().json(TriggerAck { processed })
}
