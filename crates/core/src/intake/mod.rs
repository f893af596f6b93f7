//! Conversational intake.
//!
//! - `types`: message envelope, extraction result and outcomes
//! - `collaborators`: extractor and transport contracts
//! - `replies`: fixed user-facing texts
//! - `pipeline`: the per-message sequence

pub mod collaborators;
pub mod error;
pub mod pipeline;
pub mod replies;
pub mod types;


pub use collaborators::{AudioTranscriber, MessageSender, ReceiptReader, TransactionExtractor};
pub use error::IntakeError;
pub use pipeline::{Collaborators, IntakePipeline};
pub use types::{ExtractedTransaction, IntakeOutcome, MediaRef, MessageEnvelope, MessageKind};
