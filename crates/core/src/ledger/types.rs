//! Account ledger domain types.
//!
//! A `User` is keyed by its external contact handle (phone number) and carries
//! the trial counter and subscription state. Transactions reference their
//! owner by `UserId` only; there is no back-pointer from user to transactions.

use ara_shared::types::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription lifecycle state of a user.
///
/// Allowed edges:
/// - Trial → Active (subscribe or approved payment)
/// - Active → Cancelled (cancel or refund)
/// - Active → Trial (payment failure revert)
/// - Cancelled → Active (resubscribe)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Default state with a capped number of transactions.
    #[default]
    Trial,
    /// Paying user, unlimited transactions.
    Active,
    /// Subscription ended.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trial" => Some(Self::Trial),
            "active" => Some(Self::Active),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if moving from `self` to `next` is a legal edge.
    ///
    /// Writing the current state again is always allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (*self, next),
            (Self::Trial, Self::Trial | Self::Active)
                | (Self::Active, Self::Active | Self::Cancelled | Self::Trial)
                | (Self::Cancelled, Self::Cancelled | Self::Active)
        )
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money in.
    Income,
    /// Money out.
    Expense,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Portuguese label used in conversational replies.
    #[must_use]
    pub const fn label_pt(&self) -> &'static str {
        match self {
            Self::Income => "receita",
            Self::Expense => "despesa",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Channel the transaction was reported through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionSource {
    /// Plain text message.
    Text,
    /// Transcribed voice note.
    Voice,
    /// Receipt photo.
    Image,
}

impl TransactionSource {
    /// Returns the string representation of the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Image => "image",
        }
    }

    /// Parses a source from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "voice" => Some(Self::Voice),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque unique id.
    pub id: UserId,
    /// Unique external contact handle.
    pub phone_number: String,
    /// When the user first contacted the system.
    pub created_at: DateTime<Utc>,
    /// Number of transactions created so far. Never decreases.
    pub trial_transactions_count: i32,
    /// Current subscription state.
    pub subscription_status: SubscriptionStatus,
    /// Present once the user has ever been active.
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

impl User {
    /// Builds a fresh trial user for a handle.
    #[must_use]
    pub fn new_trial(phone_number: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(),
            phone_number: phone_number.into(),
            created_at: now,
            trial_transactions_count: 0,
            subscription_status: SubscriptionStatus::Trial,
            subscription_expires_at: None,
        }
    }
}

/// Audit snapshot written by the latest correction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    /// Amount before this correction.
    pub original_amount: Decimal,
    /// Description before this correction.
    pub original_description: String,
    /// Amount after this correction.
    pub corrected_amount: Decimal,
    /// Description after this correction.
    pub corrected_description: String,
    /// When the correction happened.
    pub corrected_at: DateTime<Utc>,
}

/// Input for inserting a transaction row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Owner.
    pub user_id: UserId,
    /// Non-negative magnitude.
    pub amount: Decimal,
    /// Free-text description, also the category key.
    pub description: String,
    /// Income or expense.
    pub transaction_type: TransactionType,
    /// Reporting channel.
    pub source: TransactionSource,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}
