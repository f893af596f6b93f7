//! Storage contract for the account ledger.

use std::future::Future;

use ara_shared::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};

use super::error::LedgerError;
use super::period::Window;
use super::transaction::Transaction;
use super::types::{CorrectionRecord, NewTransaction, SubscriptionStatus, User};

/// Repository trait for ledger persistence.
///
/// Implemented by the db crate against PostgreSQL and by
/// [`InMemoryLedger`](super::InMemoryLedger). Updates that target a missing
/// row fail with `UserNotFound` / `TransactionNotFound`.
pub trait LedgerRepository: Send + Sync {
    /// Idempotent lookup-or-insert keyed by phone number.
    ///
    /// Concurrent calls with the same handle must yield one row.
    fn get_or_create_user(
        &self,
        phone_number: &str,
    ) -> impl Future<Output = Result<User, LedgerError>> + Send;

    /// Find user by ID.
    fn find_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, LedgerError>> + Send;

    /// Find user by phone number.
    fn find_user_by_phone(
        &self,
        phone_number: &str,
    ) -> impl Future<Output = Result<Option<User>, LedgerError>> + Send;

    /// Overwrite the subscription status.
    fn update_subscription_status(
        &self,
        id: UserId,
        status: SubscriptionStatus,
    ) -> impl Future<Output = Result<User, LedgerError>> + Send;

    /// Overwrite the subscription expiry.
    fn update_subscription_expiry(
        &self,
        id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = Result<User, LedgerError>> + Send;

    /// Atomically add exactly one to the trial counter and return the new value.
    fn increment_trial_count(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<i32, LedgerError>> + Send;

    /// Persist a new transaction.
    fn insert_transaction(
        &self,
        input: NewTransaction,
    ) -> impl Future<Output = Result<Transaction, LedgerError>> + Send;

    /// Find transaction by ID.
    fn find_transaction(
        &self,
        id: TransactionId,
    ) -> impl Future<Output = Result<Option<Transaction>, LedgerError>> + Send;

    /// Most recent transactions first, at most `limit`.
    fn list_transactions(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> impl Future<Output = Result<Vec<Transaction>, LedgerError>> + Send;

    /// Transactions created inside `window`, or all of them when `None`.
    fn transactions_in(
        &self,
        user_id: UserId,
        window: Option<Window>,
    ) -> impl Future<Output = Result<Vec<Transaction>, LedgerError>> + Send;

    /// Store a correction: overwrite amount/description and the audit record.
    fn save_correction(
        &self,
        id: TransactionId,
        record: CorrectionRecord,
    ) -> impl Future<Output = Result<Transaction, LedgerError>> + Send;
}
