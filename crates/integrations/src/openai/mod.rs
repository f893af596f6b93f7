//! OpenAI-backed extraction.
//!
//! Talks to any server implementing the OpenAI chat completions and audio
//! transcription APIs. `base_url` includes the version prefix, e.g.
//! `https://api.openai.com/v1`.

mod backends;
mod client;
pub mod parsing;
mod types;

pub use backends::{OpenAiExtractor, OpenAiReceiptReader, WhisperTranscriber};
pub use client::OpenAiClient;
