//! Subscription manager errors.

use ara_shared::AppError;
use ara_shared::types::UserId;
use thiserror::Error;

use crate::ledger::{LedgerError, SubscriptionStatus};

/// Subscription operation errors.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// Direct subscribe on a user who is already active.
    #[error("user {0} already has an active subscription")]
    AlreadyActive(UserId),

    /// Cancel or renew on a user who is not active.
    #[error("user {user_id} does not have an active subscription (status: {status})")]
    NotActive {
        /// The user.
        user_id: UserId,
        /// Current status.
        status: SubscriptionStatus,
    },

    /// Payment webhook payload failed validation.
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),

    /// Underlying ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl SubscriptionError {
    /// Create an invalid webhook error.
    #[must_use]
    pub fn invalid_webhook(msg: impl Into<String>) -> Self {
        Self::InvalidWebhook(msg.into())
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::AlreadyActive(_) | SubscriptionError::NotActive { .. } => {
                Self::Conflict(err.to_string())
            }
            SubscriptionError::InvalidWebhook(_) => Self::InvalidArgument(err.to_string()),
            SubscriptionError::Ledger(e) => e.into(),
        }
    }
}
