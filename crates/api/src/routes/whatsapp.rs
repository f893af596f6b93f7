//! WhatsApp webhook routes.

use ara_core::ledger::LedgerRepository;
use ara_integrations::whatsapp::{VerifyParams, WebhookPayload, verify_challenge};
use ara_shared::AppError;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tracing::{info, warn};

use crate::{ApiError, AppState};

/// Creates the webhook routes.
pub fn routes<R: LedgerRepository + 'static>() -> Router<AppState<R>> {
    Router::new().route(
        "/webhook/whatsapp",
        get(verify::<R>).post(receive::<R>),
    )
}

fn not_configured() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "NOT_CONFIGURED",
            "message": "WhatsApp integration is not configured",
        })),
    )
        .into_response()
}

/// GET `/webhook/whatsapp` - Subscription verification handshake.
async fn verify<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let Some(messaging) = &state.messaging else {
        return not_configured();
    };

    match verify_challenge(&params, &messaging.verify_token) {
        Some(challenge) => {
            info!("webhook verified");
            (StatusCode::OK, challenge.to_string()).into_response()
        }
        None => {
            warn!(mode = ?params.mode, "webhook verification rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// POST `/webhook/whatsapp` - Inbound messages.
///
/// Always acknowledges a well-formed payload; per-message failures are
/// answered to the sender, not to the webhook caller.
async fn receive<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    body: String,
) -> Result<Response, ApiError> {
    let Some(messaging) = &state.messaging else {
        return Ok(not_configured());
    };

    let payload: WebhookPayload = serde_json::from_str(&body)
        .map_err(|e| AppError::InvalidArgument(format!("malformed webhook payload: {e}")))?;
    let envelopes = payload.envelopes();
    let outcomes = messaging.pipeline.process_batch(&envelopes).await;
    info!(messages = envelopes.len(), "webhook processed");

    Ok((
        StatusCode::OK,
        Json(json!({ "status": "ok", "outcomes": outcomes })),
    )
        .into_response())
}
