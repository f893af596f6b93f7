//! In-process ledger store.
//!
//! Writes for a given user go through a single `DashMap` shard lock, so the
//! trial counter increment is atomic without any extra locking.

use ara_shared::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use super::error::LedgerError;
use super::period::Window;
use super::repository::LedgerRepository;
use super::transaction::Transaction;
use super::types::{CorrectionRecord, NewTransaction, SubscriptionStatus, User};

/// `DashMap`-backed implementation of [`LedgerRepository`].
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    users: DashMap<UserId, User>,
    by_phone: DashMap<String, UserId>,
    transactions: DashMap<TransactionId, Transaction>,
}

impl InMemoryLedger {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users stored.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn update_user(
        &self,
        id: UserId,
        f: impl FnOnce(&mut User),
    ) -> Result<User, LedgerError> {
        let mut user = self
            .users
            .get_mut(&id)
            .ok_or(LedgerError::UserNotFound(id))?;
        f(user.value_mut());
        Ok(user.clone())
    }

    fn user_rows(&self, user_id: UserId, window: Option<Window>) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| window.is_none_or(|w| w.contains(t.created_at)))
            .map(|t| t.value().clone())
            .collect()
    }
}

impl LedgerRepository for InMemoryLedger {
    async fn get_or_create_user(&self, phone_number: &str) -> Result<User, LedgerError> {
        let id = *self
            .by_phone
            .entry(phone_number.to_string())
            .or_insert_with(|| {
                let user = User::new_trial(phone_number, Utc::now());
                let id = user.id;
                self.users.insert(id, user);
                id
            });

        self.users
            .get(&id)
            .map(|u| u.clone())
            .ok_or_else(|| LedgerError::repository(format!("handle index points at missing user {id}")))
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, LedgerError> {
        let Some(id) = self.by_phone.get(phone_number).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn update_subscription_status(
        &self,
        id: UserId,
        status: SubscriptionStatus,
    ) -> Result<User, LedgerError> {
        self.update_user(id, |u| u.subscription_status = status)
    }

    async fn update_subscription_expiry(
        &self,
        id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<User, LedgerError> {
        self.update_user(id, |u| u.subscription_expires_at = expires_at)
    }

    async fn increment_trial_count(&self, id: UserId) -> Result<i32, LedgerError> {
        self.update_user(id, |u| u.trial_transactions_count += 1)
            .map(|u| u.trial_transactions_count)
    }

    async fn insert_transaction(&self, input: NewTransaction) -> Result<Transaction, LedgerError> {
        if !self.users.contains_key(&input.user_id) {
            return Err(LedgerError::InvalidReference(input.user_id));
        }
        let tx = Transaction::from_new(input);
        self.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    async fn find_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        Ok(self.transactions.get(&id).map(|t| t.clone()))
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut rows = self.user_rows(user_id, None);
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.into_inner().cmp(&a.id.into_inner()))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn transactions_in(
        &self,
        user_id: UserId,
        window: Option<Window>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        Ok(self.user_rows(user_id, window))
    }

    async fn save_correction(
        &self,
        id: TransactionId,
        record: CorrectionRecord,
    ) -> Result<Transaction, LedgerError> {
        let mut tx = self
            .transactions
            .get_mut(&id)
            .ok_or(LedgerError::TransactionNotFound(id))?;
        tx.apply_correction(record);
        Ok(tx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{TransactionSource, TransactionType};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = InMemoryLedger::new();
        let a = store.get_or_create_user("+5511911112222").await.unwrap();
        let b = store.get_or_create_user("+5511911112222").await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_creates_one_row() {
        let store = Arc::new(InMemoryLedger::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.get_or_create_user("+5521900000000").await })
            })
            .collect();

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap().unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryLedger::new());
        let id = store.get_or_create_user("+5531988887777").await.unwrap().id;

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment_trial_count(id).await })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let user = store.find_user(id).await.unwrap().unwrap();
        assert_eq!(user.trial_transactions_count, 50);
    }

    #[tokio::test]
    async fn test_updates_on_missing_user_fail() {
        let store = InMemoryLedger::new();
        let missing = UserId::new();
        assert!(matches!(
            store.increment_trial_count(missing).await,
            Err(LedgerError::UserNotFound(_))
        ));
        assert!(matches!(
            store
                .update_subscription_status(missing, SubscriptionStatus::Active)
                .await,
            Err(LedgerError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transactions_are_scoped_per_user() {
        let store = InMemoryLedger::new();
        let alice = store.get_or_create_user("+5500000000001").await.unwrap();
        let bob = store.get_or_create_user("+5500000000002").await.unwrap();

        for user in [alice.id, bob.id] {
            store
                .insert_transaction(NewTransaction {
                    user_id: user,
                    amount: dec!(10),
                    description: "venda".into(),
                    transaction_type: TransactionType::Income,
                    source: TransactionSource::Text,
                    created_at: Utc::now(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.list_transactions(alice.id, 10).await.unwrap().len(), 1);
        assert_eq!(store.transactions_in(bob.id, None).await.unwrap().len(), 1);
    }
}
