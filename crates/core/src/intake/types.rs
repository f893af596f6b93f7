//! Inbound message envelope and extraction results.

use ara_shared::types::TransactionId;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::TransactionType;

/// Reference to a media asset held by the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Transport-side asset id.
    pub media_id: String,
    /// MIME type, when the transport reports one.
    pub mime_type: Option<String>,
}

/// Kind-specific payload of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text.
    Text {
        /// Message body.
        body: String,
    },
    /// Voice note.
    Audio(MediaRef),
    /// Photo, expected to be a receipt.
    Image(MediaRef),
    /// Anything else (stickers, locations, ...).
    Unsupported {
        /// Transport-reported type name.
        kind: String,
    },
}

/// One inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope {
    /// Sender handle (phone number).
    pub sender: String,
    /// Transport message id, for logging.
    pub message_id: Option<String>,
    /// Payload.
    pub kind: MessageKind,
}

impl MessageEnvelope {
    /// Text message helper.
    #[must_use]
    pub fn text(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message_id: None,
            kind: MessageKind::Text { body: body.into() },
        }
    }
}

/// Transaction candidate produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    /// Magnitude; must be non-negative to be recorded.
    pub amount: Decimal,
    /// Income or expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Free-text description.
    pub description: String,
    /// Date mentioned in the message, if any. Informational only.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// How the pipeline finished a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IntakeOutcome {
    /// A transaction was created and confirmed.
    Recorded {
        /// The new transaction.
        transaction_id: TransactionId,
    },
    /// Gate denied; limit prompt sent.
    TrialLimitReached,
    /// Extractor failed or timed out; apology sent.
    ExtractionFailed,
    /// Persisting failed; try-again reply sent.
    PersistFailed,
    /// Unsupported message kind; help reply sent.
    Unsupported,
    /// The sender could not be resolved to a user.
    UserUnavailable,
}
