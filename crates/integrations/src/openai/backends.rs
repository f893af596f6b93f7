//! Intake collaborators backed by [`OpenAiClient`].

use std::sync::Arc;

use ara_core::intake::{
    AudioTranscriber, ExtractedTransaction, IntakeError, MediaRef, ReceiptReader,
    TransactionExtractor,
};
use async_trait::async_trait;
use base64::Engine;
use tracing::debug;

use super::client::OpenAiClient;
use super::parsing::parse_extraction;
use super::types::{ChatContent, ChatMessage, ContentPart, ImageUrl};
use crate::error::IntegrationError;
use crate::media::MediaFetcher;

const SYSTEM_PROMPT: &str = "Você é um assistente financeiro para MEIs brasileiros. Extraia informações de transações financeiras de textos em português. Responda apenas em JSON.";

const RECEIPT_PROMPT: &str = "Leia este recibo e extraia os seguintes campos: tipo (income/expense), valor (número), descrição (estabelecimento ou item principal), data (se houver, senão vazio). Responda apenas em JSON.";

const EXTRACTION_MAX_TOKENS: u32 = 100;
const RECEIPT_MAX_TOKENS: u32 = 300;

fn extraction_prompt(text: &str) -> String {
    format!(
        "Extraia os seguintes campos do texto: tipo (income/expense), valor (float), descrição, data (se houver, senão vazio). Responda apenas em JSON.\nTexto: {text}"
    )
}

/// Extracts transactions from free text with a chat model.
#[derive(Debug, Clone)]
pub struct OpenAiExtractor {
    client: OpenAiClient,
}

impl OpenAiExtractor {
    /// Create an extractor.
    #[must_use]
    pub const fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransactionExtractor for OpenAiExtractor {
    async fn extract(&self, text: &str) -> Result<ExtractedTransaction, IntakeError> {
        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(ChatContent::Text(extraction_prompt(text))),
        ];
        let answer = self
            .client
            .chat_completion(self.client.chat_model(), messages, Some(EXTRACTION_MAX_TOKENS))
            .await?;
        Ok(parse_extraction(&answer)?)
    }
}

/// Downloads a voice note and transcribes it.
#[derive(Clone)]
pub struct WhisperTranscriber {
    client: OpenAiClient,
    media: Arc<dyn MediaFetcher>,
}

impl WhisperTranscriber {
    /// Create a transcriber that downloads audio through `media`.
    #[must_use]
    pub fn new(client: OpenAiClient, media: Arc<dyn MediaFetcher>) -> Self {
        Self { client, media }
    }
}

#[async_trait]
impl AudioTranscriber for WhisperTranscriber {
    async fn transcribe(&self, media: &MediaRef) -> Result<String, IntakeError> {
        let audio = self.media.fetch(media).await?;
        debug!(media_id = %media.media_id, bytes = audio.bytes.len(), "audio downloaded");

        let text = self.client.transcribe(audio).await?;
        if text.trim().is_empty() {
            return Err(IntegrationError::invalid("empty transcription").into());
        }
        Ok(text)
    }
}

/// Reads receipt photos with a vision model.
#[derive(Clone)]
pub struct OpenAiReceiptReader {
    client: OpenAiClient,
    media: Arc<dyn MediaFetcher>,
}

impl OpenAiReceiptReader {
    /// Create a reader that downloads images through `media`.
    #[must_use]
    pub fn new(client: OpenAiClient, media: Arc<dyn MediaFetcher>) -> Self {
        Self { client, media }
    }
}

#[async_trait]
impl ReceiptReader for OpenAiReceiptReader {
    async fn read_receipt(&self, media: &MediaRef) -> Result<ExtractedTransaction, IntakeError> {
        let image = self.media.fetch(media).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

        let messages = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(ChatContent::Parts(vec![
                ContentPart::Text {
                    text: RECEIPT_PROMPT.to_string(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:{};base64,{encoded}", image.mime_type),
                    },
                },
            ])),
        ];

        let answer = self
            .client
            .chat_completion(self.client.vision_model(), messages, Some(RECEIPT_MAX_TOKENS))
            .await?;
        Ok(parse_extraction(&answer)?)
    }
}
