//! API route definitions.

use std::str::FromStr;

use ara_core::ledger::LedgerRepository;
use ara_shared::AppError;
use axum::Router;

use crate::AppState;

pub mod financial;
pub mod health;
pub mod subscriptions;
pub mod whatsapp;

/// Creates the API router with all routes.
pub fn api_routes<R: LedgerRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .merge(health::routes::<R>())
        .merge(whatsapp::routes::<R>())
        .nest("/financial", financial::routes::<R>())
        .nest("/subscriptions", subscriptions::routes::<R>())
}

/// Parses a path id, rejecting malformed values as `INVALID_ARGUMENT`.
pub(crate) fn parse_id<T>(raw: &str, what: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| AppError::InvalidArgument(format!("invalid {what} id {raw:?}: {e}")))
}
