//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - The query API over the ledger, reports and subscriptions
//! - The WhatsApp webhook that feeds the intake pipeline
//! - Error rendering

pub mod error;
pub mod routes;

use std::sync::Arc;

use ara_core::intake::IntakePipeline;
use ara_core::ledger::{LedgerRepository, TransactionService};
use ara_core::reports::ReportService;
use ara_core::subscription::SubscriptionService;
use axum::Router;
use chrono_tz::Tz;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Conversational channel wiring, present when the messaging integrations are configured.
pub struct Messaging<R: LedgerRepository> {
    /// Inbound message pipeline.
    pub pipeline: IntakePipeline<R>,
    /// Token expected in the webhook verification handshake.
    pub verify_token: String,
}

/// Application state shared across handlers.
pub struct AppState<R: LedgerRepository> {
    /// Ledger operations.
    pub transactions: TransactionService<R>,
    /// Summaries and reports.
    pub reports: ReportService<R>,
    /// Subscription lifecycle.
    pub subscriptions: SubscriptionService<R>,
    /// Conversational channel, if configured.
    pub messaging: Option<Arc<Messaging<R>>>,
}

impl<R: LedgerRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            transactions: self.transactions.clone(),
            reports: self.reports.clone(),
            subscriptions: self.subscriptions.clone(),
            messaging: self.messaging.clone(),
        }
    }
}

impl<R: LedgerRepository> AppState<R> {
    /// Builds the services over one repository.
    pub fn new(repo: Arc<R>, tz: Tz) -> Self {
        let transactions = TransactionService::new(Arc::clone(&repo), tz);
        Self {
            reports: ReportService::new(transactions.clone()),
            subscriptions: SubscriptionService::new(repo),
            transactions,
            messaging: None,
        }
    }

    /// Enables the conversational channel.
    #[must_use]
    pub fn with_messaging(mut self, messaging: Messaging<R>) -> Self {
        self.messaging = Some(Arc::new(messaging));
        self
    }
}

/// Creates the main application router.
pub fn create_router<R: LedgerRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
