//! Ara API Server
//!
//! Main entry point: the WhatsApp webhook and the query API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ara_api::{AppState, Messaging, create_router};
use ara_core::intake::{Collaborators, IntakePipeline};
use ara_core::ledger::{InMemoryLedger, LedgerRepository, TransactionService};
use ara_db::{LedgerStore, Migrator, connect};
use ara_integrations::{
    MediaFetcher, OpenAiClient, OpenAiExtractor, OpenAiReceiptReader, WhatsAppClient,
    WhisperTranscriber,
};
use ara_shared::AppConfig;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HTTP_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ara=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    match &config.database {
        Some(database) => {
            let db = connect(database).await?;
            info!("Connected to database");
            Migrator::up(&db, None).await?;
            info!("Migrations applied");
            serve(Arc::new(LedgerStore::new(db)), &config).await
        }
        None => {
            warn!("No database configured; using the in-memory ledger (data is lost on restart)");
            serve(Arc::new(InMemoryLedger::new()), &config).await
        }
    }
}

async fn serve<R: LedgerRepository + 'static>(repo: Arc<R>, config: &AppConfig) -> anyhow::Result<()> {
    let tz = config.ledger.tz().map_err(anyhow::Error::msg)?;
    info!(timezone = %tz, "Ledger configured");

    let mut state = AppState::new(repo, tz);
    match messaging(config, state.transactions.clone())? {
        Some(messaging) => {
            info!("WhatsApp channel enabled");
            state = state.with_messaging(messaging);
        }
        None => warn!("OpenAI or WhatsApp not configured; webhook will answer 503"),
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn messaging<R: LedgerRepository>(
    config: &AppConfig,
    transactions: TransactionService<R>,
) -> anyhow::Result<Option<Messaging<R>>> {
    let (Some(openai), Some(whatsapp)) = (&config.openai, &config.whatsapp) else {
        return Ok(None);
    };

    let http = reqwest::Client::builder()
        .timeout(HTTP_CLIENT_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;

    let whatsapp_client = Arc::new(WhatsAppClient::new(http.clone(), whatsapp));
    let media: Arc<dyn MediaFetcher> = whatsapp_client.clone();
    let ai = OpenAiClient::new(http, openai);

    let collaborators = Collaborators {
        extractor: Arc::new(OpenAiExtractor::new(ai.clone())),
        transcriber: Arc::new(WhisperTranscriber::new(ai.clone(), Arc::clone(&media))),
        receipts: Arc::new(OpenAiReceiptReader::new(ai, media)),
        sender: whatsapp_client,
    };

    Ok(Some(Messaging {
        pipeline: IntakePipeline::new(
            transactions,
            collaborators,
            config.intake.extraction_timeout(),
        ),
        verify_token: whatsapp.verify_token.clone(),
    }))
}
