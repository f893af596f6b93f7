//! WhatsApp Cloud API transport.

mod client;
pub mod webhook;

pub use client::WhatsAppClient;
pub use webhook::{VerifyParams, WebhookPayload, verify_challenge};
