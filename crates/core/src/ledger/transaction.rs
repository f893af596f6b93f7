//! Transaction record.

use ara_shared::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CorrectionRecord, NewTransaction, TransactionSource, TransactionType};

/// A persisted income or expense entry.
///
/// `amount` and `description` always hold the latest corrected values; the
/// prior values of the most recent correction live in `correction_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque unique id.
    pub id: TransactionId,
    /// Owning user.
    pub user_id: UserId,
    /// Non-negative magnitude in BRL.
    pub amount: Decimal,
    /// Description, also used as the category key.
    pub description: String,
    /// Income or expense. Never changed by corrections.
    pub transaction_type: TransactionType,
    /// Reporting channel. Never changed by corrections.
    pub source: TransactionSource,
    /// Set at creation.
    pub created_at: DateTime<Utc>,
    /// Time of the latest correction.
    pub corrected_at: Option<DateTime<Utc>>,
    /// Snapshot of the latest correction.
    pub correction_data: Option<CorrectionRecord>,
}

impl Transaction {
    /// Materializes a new record with a fresh id.
    #[must_use]
    pub fn from_new(input: NewTransaction) -> Self {
        Self {
            id: TransactionId::new(),
            user_id: input.user_id,
            amount: input.amount,
            description: input.description,
            transaction_type: input.transaction_type,
            source: input.source,
            created_at: input.created_at,
            corrected_at: None,
            correction_data: None,
        }
    }

    /// Signed contribution to the balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Builds the correction record against the current values.
    #[must_use]
    pub fn correction(
        &self,
        new_amount: Decimal,
        new_description: &str,
        now: DateTime<Utc>,
    ) -> CorrectionRecord {
        CorrectionRecord {
            original_amount: self.amount,
            original_description: self.description.clone(),
            corrected_amount: new_amount,
            corrected_description: new_description.to_string(),
            corrected_at: now,
        }
    }

    /// Overwrites amount and description and stores the audit record.
    pub fn apply_correction(&mut self, record: CorrectionRecord) {
        self.amount = record.corrected_amount;
        self.description.clone_from(&record.corrected_description);
        self.corrected_at = Some(record.corrected_at);
        self.correction_data = Some(record);
    }
}
