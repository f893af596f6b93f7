//! External collaborator contracts.
//!
//! Concrete implementations live in the integrations crate; tests use mocks.

use async_trait::async_trait;

use super::error::IntakeError;
use super::types::{ExtractedTransaction, MediaRef};

/// Turns free text into a transaction candidate.
#[async_trait]
pub trait TransactionExtractor: Send + Sync {
    /// Extract a transaction from text.
    async fn extract(&self, text: &str) -> Result<ExtractedTransaction, IntakeError>;
}

/// Turns a voice note into text.
#[async_trait]
pub trait AudioTranscriber: Send + Sync {
    /// Transcribe an audio asset.
    async fn transcribe(&self, media: &MediaRef) -> Result<String, IntakeError>;
}

/// Reads a receipt photo into a transaction candidate.
#[async_trait]
pub trait ReceiptReader: Send + Sync {
    /// Extract a transaction from an image asset.
    async fn read_receipt(&self, media: &MediaRef) -> Result<ExtractedTransaction, IntakeError>;
}

/// Delivers a reply to a user.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message to a handle.
    async fn send(&self, to: &str, body: &str) -> Result<(), IntakeError>;
}
