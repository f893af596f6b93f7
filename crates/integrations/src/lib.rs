//! External collaborators for the intake pipeline.
//!
//! - `openai` - transaction extraction from text, transcription and receipt reading
//! - `whatsapp` - outbound messages, media download and webhook payloads

pub mod error;
pub mod media;
pub mod openai;
pub mod whatsapp;

pub use error::IntegrationError;
pub use media::MediaFetcher;
pub use openai::{OpenAiClient, OpenAiExtractor, OpenAiReceiptReader, WhisperTranscriber};
pub use whatsapp::WhatsAppClient;
