//! Health check endpoints.

use ara_core::ledger::LedgerRepository;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether the WhatsApp channel is wired.
    pub messaging: bool,
}

/// Health check handler.
async fn health_check<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        messaging: state.messaging.is_some(),
    })
}

/// Creates health check routes.
pub fn routes<R: LedgerRepository + 'static>() -> Router<AppState<R>> {
    Router::new().route("/health", get(health_check::<R>))
}
