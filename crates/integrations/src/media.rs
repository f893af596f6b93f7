//! Media download seam between the transport and the extraction backends.

use ara_core::intake::MediaRef;
use async_trait::async_trait;

use crate::error::Result;

/// Downloaded media bytes.
#[derive(Debug, Clone)]
pub struct MediaBlob {
    /// Raw bytes.
    pub bytes: Vec<u8>,
    /// MIME type reported by the transport.
    pub mime_type: String,
}

/// Fetches media referenced by an inbound message.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Download the asset.
    async fn fetch(&self, media: &MediaRef) -> Result<MediaBlob>;
}
