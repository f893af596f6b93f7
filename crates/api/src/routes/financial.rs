//! Ledger and report query routes.

use ara_core::ledger::{
    CategorySummary, DEFAULT_CATEGORY_LIMIT, FinancialSummary, LedgerRepository, Period,
    Transaction,
};
use ara_core::reports::DetailedReport;
use ara_shared::types::{Currency, TransactionId, UserId};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::parse_id;
use crate::{ApiError, AppState};

const DEFAULT_TRANSACTION_LIMIT: u64 = 10;

/// Creates the financial routes.
pub fn routes<R: LedgerRepository + 'static>() -> Router<AppState<R>> {
    Router::new()
        .route("/users/{user_id}/summary", get(conversational_summary::<R>))
        .route("/users/{user_id}/today", get(today_summary::<R>))
        .route("/users/{user_id}/report", get(detailed_report::<R>))
        .route("/users/{user_id}/balance", get(balance::<R>))
        .route("/users/{user_id}/transactions", get(transactions::<R>))
        .route("/users/{user_id}/categories", get(categories::<R>))
        .route(
            "/transactions/{transaction_id}/correct",
            put(correct_transaction::<R>),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// `?period=` query.
#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    /// `today`, `week` or `month`.
    pub period: Option<String>,
}

/// `?limit=` query.
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    /// Maximum number of rows.
    pub limit: Option<u64>,
}

/// `?period=&limit=` query.
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    /// Window; unrecognized values fall back to today.
    pub period: Option<String>,
    /// Maximum number of buckets.
    pub limit: Option<usize>,
}

/// Body of a correction.
#[derive(Debug, Deserialize)]
pub struct CorrectTransactionRequest {
    /// New amount.
    pub amount: Decimal,
    /// New description.
    pub description: String,
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// The user.
    pub user_id: UserId,
    /// Income minus expenses, all time.
    pub balance: Decimal,
    /// Always BRL.
    pub currency: Currency,
}

/// Transaction list response.
#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    /// The user.
    pub user_id: UserId,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    /// Number of rows returned.
    pub count: usize,
}

/// Top categories response.
#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    /// The user.
    pub user_id: UserId,
    /// Effective period.
    pub period: String,
    /// Largest buckets first.
    pub categories: Vec<CategorySummary>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/financial/users/{user_id}/summary` - Conversational summary text.
async fn conversational_summary<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Value>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let period = query.period.unwrap_or_else(|| "today".to_string());
    let summary = state
        .reports
        .generate_conversational_summary(user_id, &period)
        .await?;

    Ok(Json(json!({
        "summary": summary,
        "period": period,
        "user_id": user_id,
    })))
}

/// GET `/financial/users/{user_id}/today` - Today's totals.
async fn today_summary<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<FinancialSummary>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    Ok(Json(state.transactions.get_financial_summary(user_id).await?))
}

/// GET `/financial/users/{user_id}/report` - Detailed report.
async fn detailed_report<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<DetailedReport>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let period = query.period.as_deref().unwrap_or("today");
    Ok(Json(
        state.reports.generate_detailed_report(user_id, period).await?,
    ))
}

/// GET `/financial/users/{user_id}/balance` - All-time balance.
async fn balance<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let balance = state.transactions.get_user_balance(user_id).await?;
    Ok(Json(BalanceResponse {
        user_id,
        balance,
        currency: Currency::Brl,
    }))
}

/// GET `/financial/users/{user_id}/transactions` - Recent transactions.
async fn transactions<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let transactions = state
        .transactions
        .get_user_transactions(user_id, query.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT))
        .await?;
    Ok(Json(TransactionsResponse {
        user_id,
        count: transactions.len(),
        transactions,
    }))
}

/// GET `/financial/users/{user_id}/categories` - Top categories.
async fn categories<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(user_id): Path<String>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let user_id: UserId = parse_id(&user_id, "user")?;
    let period = Period::parse_or_today(query.period.as_deref());
    let categories = state
        .transactions
        .top_categories(user_id, period, query.limit.unwrap_or(DEFAULT_CATEGORY_LIMIT))
        .await?;
    Ok(Json(CategoriesResponse {
        user_id,
        period: period.as_str().to_string(),
        categories,
    }))
}

/// PUT `/financial/transactions/{transaction_id}/correct` - Correct amount and description.
async fn correct_transaction<R: LedgerRepository + 'static>(
    State(state): State<AppState<R>>,
    Path(transaction_id): Path<String>,
    Json(payload): Json<CorrectTransactionRequest>,
) -> Result<Json<Value>, ApiError> {
    let transaction_id: TransactionId = parse_id(&transaction_id, "transaction")?;
    let transaction = state
        .transactions
        .correct_transaction(transaction_id, payload.amount, &payload.description)
        .await?;
    info!(%transaction_id, "transaction corrected");

    Ok(Json(json!({
        "message": "Transaction corrected successfully",
        "transaction": transaction,
    })))
}
