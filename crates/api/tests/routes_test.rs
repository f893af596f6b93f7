//! Router tests over the in-memory ledger.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ara_api::{AppState, Messaging, create_router};
use ara_core::intake::{
    AudioTranscriber, Collaborators, ExtractedTransaction, IntakeError, IntakePipeline,
    MediaRef, MessageSender, ReceiptReader, TransactionExtractor,
};
use ara_core::ledger::{
    InMemoryLedger, LedgerRepository, TransactionService, TransactionSource, TransactionType,
};
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono_tz::America::Sao_Paulo;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

const PHONE: &str = "5511987654321";

struct Fixed;

#[async_trait]
impl TransactionExtractor for Fixed {
    async fn extract(&self, _text: &str) -> Result<ExtractedTransaction, IntakeError> {
        Ok(ExtractedTransaction {
            amount: dec!(45),
            transaction_type: TransactionType::Income,
            description: "Venda de cachorro-quente".into(),
            date: None,
        })
    }
}

#[async_trait]
impl AudioTranscriber for Fixed {
    async fn transcribe(&self, _media: &MediaRef) -> Result<String, IntakeError> {
        Err(IntakeError::upstream("not in tests"))
    }
}

#[async_trait]
impl ReceiptReader for Fixed {
    async fn read_receipt(&self, _media: &MediaRef) -> Result<ExtractedTransaction, IntakeError> {
        Err(IntakeError::upstream("not in tests"))
    }
}

#[derive(Default)]
struct Outbox(Mutex<Vec<(String, String)>>);

#[async_trait]
impl MessageSender for Outbox {
    async fn send(&self, to: &str, body: &str) -> Result<(), IntakeError> {
        self.0.lock().unwrap().push((to.into(), body.into()));
        Ok(())
    }
}

fn app() -> (Router, Arc<InMemoryLedger>) {
    let repo = Arc::new(InMemoryLedger::new());
    (
        create_router(AppState::new(Arc::clone(&repo), Sao_Paulo)),
        repo,
    )
}

fn app_with_messaging() -> (Router, Arc<InMemoryLedger>, Arc<Outbox>) {
    let repo = Arc::new(InMemoryLedger::new());
    let outbox = Arc::new(Outbox::default());
    let pipeline = IntakePipeline::new(
        TransactionService::new(Arc::clone(&repo), Sao_Paulo),
        Collaborators {
            extractor: Arc::new(Fixed),
            transcriber: Arc::new(Fixed),
            receipts: Arc::new(Fixed),
            sender: Arc::clone(&outbox) as Arc<dyn MessageSender>,
        },
        Duration::from_secs(5),
    );
    let state = AppState::new(Arc::clone(&repo), Sao_Paulo).with_messaging(Messaging {
        pipeline,
        verify_token: "s3cret".into(),
    });
    (create_router(state), repo, outbox)
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn seed(repo: &Arc<InMemoryLedger>) -> String {
    let service = TransactionService::new(Arc::clone(repo), Sao_Paulo);
    let user = repo.get_or_create_user(PHONE).await.unwrap();
    service
        .create_transaction(
            user.id,
            dec!(100),
            "venda",
            TransactionType::Income,
            TransactionSource::Text,
        )
        .await
        .unwrap();
    service
        .create_transaction(
            user.id,
            dec!(30),
            "gás",
            TransactionType::Expense,
            TransactionSource::Text,
        )
        .await
        .unwrap();
    user.id.to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = call(&app, Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["messaging"], false);
}

#[tokio::test]
async fn test_balance_and_transactions() {
    let (app, repo) = app();
    let user_id = seed(&repo).await;

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/financial/users/{user_id}/balance"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], "70");
    assert_eq!(body["currency"], "BRL");

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/financial/users/{user_id}/transactions?limit=1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_summary_and_categories() {
    let (app, repo) = app();
    let user_id = seed(&repo).await;

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/financial/users/{user_id}/summary"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "today");
    assert!(body["summary"].as_str().unwrap().contains("R$ 70,00"));

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/financial/users/{user_id}/categories?period=bogus&limit=1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "today");
    assert_eq!(body["categories"].as_array().unwrap().len(), 1);
    assert_eq!(body["categories"][0]["description"], "venda");
}

#[tokio::test]
async fn test_unknown_period_is_bad_request() {
    let (app, repo) = app();
    let user_id = seed(&repo).await;
    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/v1/financial/users/{user_id}/report?period=decade"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_malformed_and_unknown_ids() {
    let (app, _) = app();
    let (status, _) = call(
        &app,
        Method::GET,
        "/api/v1/financial/users/not-a-uuid/balance",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::GET,
        "/api/v1/financial/users/0190f5c0-0000-7000-8000-000000000000/balance",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_correct_transaction() {
    let (app, repo) = app();
    let user_id = seed(&repo).await;
    let (_, list) = call(
        &app,
        Method::GET,
        &format!("/api/v1/financial/users/{user_id}/transactions"),
        None,
    )
    .await;
    let tx_id = list["transactions"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::PUT,
        &format!("/api/v1/financial/transactions/{tx_id}/correct"),
        Some(json!({"amount": "12.50", "description": "pão"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transaction corrected successfully");
    assert_eq!(body["transaction"]["description"], "pão");
    assert!(body["transaction"]["correction_data"].is_object());
}

#[tokio::test]
async fn test_subscription_lifecycle() {
    let (app, repo) = app();
    let user_id = seed(&repo).await;
    let base = format!("/api/v1/subscriptions/users/{user_id}");

    let (status, body) = call(&app, Method::GET, &format!("{base}/trial-status"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_trial_transactions"], 48);

    let (status, body) = call(
        &app,
        Method::POST,
        &base,
        Some(json!({"payment_method": "pix"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription"]["status"], "active");

    let (status, body) = call(
        &app,
        Method::POST,
        &base,
        Some(json!({"payment_method": "pix"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");

    let (status, body) = call(&app, Method::GET, &format!("{base}/info"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription_status"], "active");

    let (status, _) = call(&app, Method::DELETE, &base, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::DELETE, &base, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_payment_webhook() {
    let (app, repo) = app();
    let user_id = seed(&repo).await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/subscriptions/webhook/payment",
        Some(json!({"user_id": user_id, "status": "approved", "payment_id": "pay_1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["result"], "applied");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/v1/subscriptions/webhook/payment",
        Some(json!({"user_id": user_id, "status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_whatsapp_without_integration_is_unavailable() {
    let (app, _) = app();
    let (status, _) = call(&app, Method::POST, "/api/v1/webhook/whatsapp", Some(json!({}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_whatsapp_verification_handshake() {
    let (app, _, _) = app_with_messaging();

    let request = Request::builder()
        .uri("/api/v1/webhook/whatsapp?hub.mode=subscribe&hub.verify_token=s3cret&hub.challenge=42")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"42");

    let request = Request::builder()
        .uri("/api/v1/webhook/whatsapp?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_whatsapp_message_is_recorded() {
    let (app, repo, outbox) = app_with_messaging();
    let payload = json!({
        "object": "whatsapp_business_account",
        "entry": [{"changes": [{"value": {"messages": [
            {"from": PHONE, "id": "wamid.1", "timestamp": "1", "type": "text",
             "text": {"body": "vendi 45 de cachorro-quente"}}
        ]}}]}]
    });

    let (status, body) = call(&app, Method::POST, "/api/v1/webhook/whatsapp", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["outcomes"][0]["outcome"], "recorded");

    let user = repo.find_user_by_phone(PHONE).await.unwrap().unwrap();
    assert_eq!(user.trial_transactions_count, 1);
    let sent = outbox.0.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, PHONE);
    assert!(sent[0].1.starts_with("Transação registrada!"));
}

#[tokio::test]
async fn test_whatsapp_bad_message_does_not_reject_siblings() {
    let (app, repo, _) = app_with_messaging();
    let payload = json!({
        "entry": [{"changes": [{"value": {"messages": [
            {"id": "wamid.bad", "type": "text", "text": {"body": "sem remetente"}},
            {"from": PHONE, "type": "text", "text": {"body": "vendi 45"}}
        ]}}]}]
    });

    let (status, body) = call(&app, Method::POST, "/api/v1/webhook/whatsapp", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcomes"].as_array().unwrap().len(), 1);
    assert_eq!(body["outcomes"][0]["outcome"], "recorded");

    let user = repo.find_user_by_phone(PHONE).await.unwrap().unwrap();
    assert_eq!(user.trial_transactions_count, 1);
}

#[tokio::test]
async fn test_whatsapp_malformed_payload() {
    let (app, _, _) = app_with_messaging();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhook/whatsapp")
        .body(Body::from("not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
