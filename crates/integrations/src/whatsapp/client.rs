//! Graph API client: outbound text messages and media download.

use ara_core::intake::{IntakeError, MediaRef, MessageSender};
use ara_shared::config::WhatsAppConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IntegrationError, Result, check_status};
use crate::media::{MediaBlob, MediaFetcher};

/// Client for one WhatsApp business phone number.
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    http_client: Client,
    base_url: String,
    api_version: String,
    phone_number_id: String,
    access_token: String,
}

#[derive(Debug, Serialize)]
struct OutboundText<'a> {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct MediaInfo {
    url: String,
    #[serde(default)]
    mime_type: Option<String>,
}

impl WhatsAppClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(http_client: Client, config: &WhatsAppConfig) -> Self {
        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            phone_number_id: config.phone_number_id.clone(),
            access_token: config.access_token.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{path}", self.base_url, self.api_version)
    }

    /// Send a plain text message.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        let message = OutboundText {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to,
            kind: "text",
            text: TextBody { body },
        };

        let response = self
            .http_client
            .post(self.endpoint(&format!("{}/messages", self.phone_number_id)))
            .bearer_auth(&self.access_token)
            .json(&message)
            .send()
            .await?;
        check_status("WhatsApp", response).await?;

        debug!(to, "message sent");
        Ok(())
    }

    /// Resolve a media id to its download URL, then download it.
    pub async fn download_media(&self, media_id: &str) -> Result<MediaBlob> {
        let response = self
            .http_client
            .get(self.endpoint(media_id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let info: MediaInfo = check_status("WhatsApp", response).await?.json().await?;

        let response = self
            .http_client
            .get(&info.url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let bytes = check_status("WhatsApp", response).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(IntegrationError::invalid(format!("media {media_id} is empty")));
        }

        Ok(MediaBlob {
            bytes: bytes.to_vec(),
            mime_type: info
                .mime_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        })
    }
}

#[async_trait]
impl MessageSender for WhatsAppClient {
    async fn send(&self, to: &str, body: &str) -> std::result::Result<(), IntakeError> {
        Ok(self.send_text(to, body).await?)
    }
}

#[async_trait]
impl MediaFetcher for WhatsAppClient {
    async fn fetch(&self, media: &MediaRef) -> Result<MediaBlob> {
        let mut blob = self.download_media(&media.media_id).await?;
        if let Some(mime) = &media.mime_type {
            // The webhook's type is more specific than the CDN's.
            blob.mime_type.clone_from(mime);
        }
        Ok(blob)
    }
}
