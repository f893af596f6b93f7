//! HTTP client for the OpenAI API.

use ara_shared::config::OpenAiConfig;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, TranscriptionResponse,
};
use crate::error::{IntegrationError, Result, check_status};
use crate::media::MediaBlob;

/// Shared OpenAI client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    vision_model: String,
    transcription_model: String,
}

impl OpenAiClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(http_client: Client, config: &OpenAiConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
            transcription_model: config.transcription_model.clone(),
        }
    }

    pub(super) fn chat_model(&self) -> &str {
        &self.chat_model
    }

    pub(super) fn vision_model(&self) -> &str {
        &self.vision_model
    }

    /// Run a chat completion and return the first choice's content.
    pub(super) async fn chat_completion(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = check_status("OpenAI", response).await?;

        let chat_response: ChatCompletionResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| IntegrationError::invalid("no choices in completion"))?;

        debug!(model, content = %content, "chat completion");
        Ok(content)
    }

    /// Transcribe an audio clip.
    pub(super) async fn transcribe(&self, audio: MediaBlob) -> Result<String> {
        let file = Part::bytes(audio.bytes)
            .file_name("audio.ogg")
            .mime_str(&audio.mime_type)?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.transcription_model.clone());

        let response = self
            .http_client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;
        let response = check_status("OpenAI", response).await?;

        let transcription: TranscriptionResponse = response.json().await?;
        Ok(transcription.text)
    }
}
