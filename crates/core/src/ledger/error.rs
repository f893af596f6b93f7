//! Ledger and transaction service errors.

use ara_shared::AppError;
use ara_shared::types::{TransactionId, UserId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// User id does not resolve.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Transaction id does not resolve.
    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// A transaction was requested for a user that does not exist.
    #[error("invalid user reference: {0}")]
    InvalidReference(UserId),

    /// Malformed input such as an unknown period or a negative amount.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transaction was stored but the trial counter was not incremented.
    #[error("transaction {transaction_id} persisted but trial counter increment failed: {source}")]
    PartialFailure {
        /// The persisted transaction.
        transaction_id: TransactionId,
        /// The increment failure.
        #[source]
        source: Box<LedgerError>,
    },

    /// Storage backend failure.
    #[error("repository error: {0}")]
    Repository(String),
}

impl LedgerError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let msg = err.to_string();
        match err {
            LedgerError::UserNotFound(_) | LedgerError::TransactionNotFound(_) => {
                Self::NotFound(msg)
            }
            LedgerError::InvalidReference(_) | LedgerError::InvalidArgument(_) => {
                Self::InvalidArgument(msg)
            }
            LedgerError::PartialFailure { .. } => Self::PartialFailure(msg),
            LedgerError::Repository(_) => Self::UpstreamFailure(msg),
        }
    }
}
