//! Ledger doubles shared by unit tests across modules.

use ara_shared::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};

use super::error::LedgerError;
use super::memory::InMemoryLedger;
use super::period::Window;
use super::repository::LedgerRepository;
use super::transaction::Transaction;
use super::types::{CorrectionRecord, NewTransaction, SubscriptionStatus, User};

/// Delegates to the in-memory store but fails every counter increment.
#[derive(Debug, Default)]
pub(crate) struct BrokenCounter(pub(crate) InMemoryLedger);

impl LedgerRepository for BrokenCounter {
    async fn get_or_create_user(&self, phone: &str) -> Result<User, LedgerError> {
        self.0.get_or_create_user(phone).await
    }
    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        self.0.find_user(id).await
    }
    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, LedgerError> {
        self.0.find_user_by_phone(phone).await
    }
    async fn update_subscription_status(
        &self,
        id: UserId,
        status: SubscriptionStatus,
    ) -> Result<User, LedgerError> {
        self.0.update_subscription_status(id, status).await
    }
    async fn update_subscription_expiry(
        &self,
        id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<User, LedgerError> {
        self.0.update_subscription_expiry(id, expires_at).await
    }
    async fn increment_trial_count(&self, _id: UserId) -> Result<i32, LedgerError> {
        Err(LedgerError::repository("counter unavailable"))
    }
    async fn insert_transaction(&self, input: NewTransaction) -> Result<Transaction, LedgerError> {
        self.0.insert_transaction(input).await
    }
    async fn find_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        self.0.find_transaction(id).await
    }
    async fn list_transactions(&self, user_id: UserId, limit: u64) -> Result<Vec<Transaction>, LedgerError> {
        self.0.list_transactions(user_id, limit).await
    }
    async fn transactions_in(
        &self,
        user_id: UserId,
        window: Option<Window>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.0.transactions_in(user_id, window).await
    }
    async fn save_correction(
        &self,
        id: TransactionId,
        record: CorrectionRecord,
    ) -> Result<Transaction, LedgerError> {
        self.0.save_correction(id, record).await
    }
}
