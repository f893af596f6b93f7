//! Subscription lifecycle routes.

use ara_core::access::TrialStatus;
use ara_core::ledger::LedgerRepository;
use ara_core::subscription::{PaymentWebhook, SubscriptionInfo, WebhookOutcome};
use ara_shared::types::UserId;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::parse_id;
use crate::{ApiError, AppState};

/// Creates the subscription routes.
pub fn routes<R: LedgerRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route("/users/{user_id}/trial-status", get(trial_status::<R>))
        .route("/users/{user_id}/info", get(subscription_info::<R>))
        .route(
            "/users/{user_id}",
            post(create_subscription::<R>).delete(cancel_subscription::<R>),
        )
        .route("/users/{user_id}/renew", post(renew_subscription::<R>))
        .route("/webhook/payment", post(payment_webhook::<R>))
}

/// Body of a subscription request.
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    /// Opaque payment method label.
    pub payment_method: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    /// Fixed acknowledgement text.
    pub message: &'static str,
    /// Whether the webhook changed anything.
    pub outcome: WebhookOutcome,
}

/// GET `/subscriptions/users/{user_id}/trial-status`
async fn trial_status<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<TrialStatus>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    Ok(Json(state.subscriptions.check_trial_status(user_id).await?))
}

/// GET `/subscriptions/users/{user_id}/info`
async fn subscription_info<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<SubscriptionInfo>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    Ok(Json(state.subscriptions.get_subscription_info(user_id).await?))
}

/// POST `/subscriptions/users/{user_id}`
async fn create_subscription<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> Result<Json<Value>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let subscription = state
        .subscriptions
        .create_subscription(user_id, &payload.payment_method)
        .await?;

    Ok(Json(json!({
        "message": "Subscription created successfully",
        "subscription": subscription,
    })))
}

/// DELETE `/subscriptions/users/{user_id}`
async fn cancel_subscription<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    state.subscriptions.cancel_subscription(user_id).await?;
    Ok(Json(json!({ "message": "Subscription cancelled successfully" })))
}

/// POST `/subscriptions/users/{user_id}/renew`
async fn renew_subscription<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let user = state.subscriptions.renew_subscription(user_id).await?;
    Ok(Json(json!({
        "message": "Subscription renewed successfully",
        "subscription_expires_at": user.subscription_expires_at,
    })))
}

/// POST `/subscriptions/webhook/payment`
async fn payment_webhook<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Json(payload): Json<Value>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let hook = PaymentWebhook::from_json(&payload)?;
    let payment_id = hook.payment_id.clone();
    let outcome = state.subscriptions.process_payment_webhook(hook).await?;
    info!(payment_id = %payment_id, outcome = ?outcome, "payment webhook handled");

    Ok(Json(WebhookResponse {
        message: "Payment webhook processed successfully",
        outcome,
    }))
}
