//! Subscription value objects and the payment webhook payload.

use ara_shared::types::{Currency, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SubscriptionError;
use crate::ledger::SubscriptionStatus;

/// Monthly price in BRL.
pub const MONTHLY_PRICE: Decimal = Decimal::from_parts(990, 0, 0, false, 2);

/// Length of one paid period.
pub const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Result of a direct subscribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscriber.
    pub user_id: UserId,
    /// Always active right after creation.
    pub status: SubscriptionStatus,
    /// Caller-supplied payment method label.
    pub payment_method: String,
    /// Monthly price.
    pub amount: Decimal,
    /// Price currency.
    pub currency: Currency,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// End of the paid period.
    pub expires_at: DateTime<Utc>,
}

/// Subscription and trial snapshot for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    /// The user.
    pub user_id: UserId,
    /// Current status.
    pub subscription_status: SubscriptionStatus,
    /// Transactions counted so far.
    pub trial_transactions_count: i32,
    /// `50 - count`.
    pub remaining_trial_transactions: i32,
    /// Count reached the cap.
    pub is_trial_expired: bool,
    /// Expiry, if the user was ever active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    /// Whole days until expiry, floored; zero without an expiry.
    pub days_until_expiry: i64,
    /// Monthly price.
    pub monthly_price: Decimal,
    /// Price currency.
    pub currency: Currency,
}

/// Payment status values reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Payment confirmed.
    Approved,
    /// Payment failed.
    Failed,
    /// Payment cancelled before capture.
    Cancelled,
    /// Captured payment returned.
    Refunded,
    /// Anything else; processed as a no-op.
    Unrecognized(String),
}

impl PaymentStatus {
    /// Maps a raw gateway value.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "approved" => Self::Approved,
            "failed" => Self::Failed,
            "cancelled" => Self::Cancelled,
            "refunded" => Self::Refunded,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Target subscription status, if this payment status drives one.
    #[must_use]
    pub const fn target_status(&self) -> Option<SubscriptionStatus> {
        match self {
            Self::Approved => Some(SubscriptionStatus::Active),
            Self::Failed | Self::Cancelled => Some(SubscriptionStatus::Trial),
            Self::Refunded => Some(SubscriptionStatus::Cancelled),
            Self::Unrecognized(_) => None,
        }
    }
}

/// Validated payment webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentWebhook {
    /// The paying user.
    pub user_id: UserId,
    /// Gateway outcome.
    pub status: PaymentStatus,
    /// Gateway reference, kept for audit.
    pub payment_id: String,
}

impl PaymentWebhook {
    /// Validates a JSON object with string fields `user_id`, `status` and
    /// `payment_id`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidWebhook` when a field is missing, not a string, or
    /// `user_id` is not a UUID.
    pub fn from_json(payload: &Value) -> Result<Self, SubscriptionError> {
        let obj = payload
            .as_object()
            .ok_or_else(|| SubscriptionError::invalid_webhook("payload must be a JSON object"))?;

        let user_id = str_field(obj, "user_id")?
            .parse::<UserId>()
            .map_err(|e| SubscriptionError::invalid_webhook(format!("invalid user_id: {e}")))?;
        let status = PaymentStatus::parse(str_field(obj, "status")?);
        let payment_id = str_field(obj, "payment_id")?;
        if payment_id.trim().is_empty() {
            return Err(SubscriptionError::invalid_webhook("invalid payment_id"));
        }

        Ok(Self {
            user_id,
            status,
            payment_id: payment_id.to_string(),
        })
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, name: &str) -> Result<&'a str, SubscriptionError> {
    obj.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| SubscriptionError::invalid_webhook(format!("invalid {name}")))
}

/// What a webhook did to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WebhookOutcome {
    /// Status (and possibly expiry) was written.
    Applied {
        /// Status before.
        from: SubscriptionStatus,
        /// Status after.
        to: SubscriptionStatus,
    },
    /// Nothing was written.
    Ignored {
        /// Why.
        reason: String,
    },
}
