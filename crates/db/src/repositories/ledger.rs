//! PostgreSQL-backed ledger store.

use ara_core::ledger::{
    CorrectionRecord, LedgerError, LedgerRepository, NewTransaction, SubscriptionStatus,
    Transaction, TransactionSource, TransactionType, User, Window,
};
use ara_shared::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::warn;
use uuid::Uuid;

use crate::entities::{sea_orm_active_enums as db_enums, transactions, users};

/// [`LedgerRepository`] over the `users` and `transactions` tables.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    db: DatabaseConnection,
}

impl LedgerStore {
    /// Creates a new ledger store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn user_model(&self, id: UserId) -> Result<users::Model, LedgerError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::UserNotFound(id))
    }

    async fn update_user(
        &self,
        id: UserId,
        apply: impl FnOnce(&mut users::ActiveModel),
    ) -> Result<User, LedgerError> {
        let mut active: users::ActiveModel = self.user_model(id).await?.into();
        apply(&mut active);
        active.updated_at = Set(Utc::now().into());
        let model = active.update(&self.db).await.map_err(db_error)?;
        Ok(user_from_model(model))
    }
}

impl LedgerRepository for LedgerStore {
    async fn get_or_create_user(&self, phone_number: &str) -> Result<User, LedgerError> {
        let now = Utc::now().into();
        let candidate = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            phone_number: Set(phone_number.to_string()),
            trial_transactions_count: Set(0),
            subscription_status: Set(db_enums::SubscriptionStatus::Trial),
            subscription_expires_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // Concurrent first contacts race on the unique phone index; the loser inserts nothing.
        users::Entity::insert(candidate)
            .on_conflict(
                OnConflict::column(users::Column::PhoneNumber)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_error)?;

        self.find_user_by_phone(phone_number).await?.ok_or_else(|| {
            LedgerError::repository(format!("user for {phone_number} missing after upsert"))
        })
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, LedgerError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|m| m.map(user_from_model))
            .map_err(db_error)
    }

    async fn find_user_by_phone(&self, phone_number: &str) -> Result<Option<User>, LedgerError> {
        users::Entity::find()
            .filter(users::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await
            .map(|m| m.map(user_from_model))
            .map_err(db_error)
    }

    async fn update_subscription_status(
        &self,
        id: UserId,
        status: SubscriptionStatus,
    ) -> Result<User, LedgerError> {
        self.update_user(id, |u| u.subscription_status = Set(status_to_db(status)))
            .await
    }

    async fn update_subscription_expiry(
        &self,
        id: UserId,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<User, LedgerError> {
        self.update_user(id, |u| {
            u.subscription_expires_at = Set(expires_at.map(Into::into));
        })
        .await
    }

    async fn increment_trial_count(&self, id: UserId) -> Result<i32, LedgerError> {
        let updated = users::Entity::update_many()
            .col_expr(
                users::Column::TrialTransactionsCount,
                Expr::col(users::Column::TrialTransactionsCount).add(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(id.into_inner()))
            .exec_with_returning(&self.db)
            .await
            .map_err(db_error)?;

        updated
            .first()
            .map(|u| u.trial_transactions_count)
            .ok_or(LedgerError::UserNotFound(id))
    }

    async fn insert_transaction(&self, input: NewTransaction) -> Result<Transaction, LedgerError> {
        if self.find_user(input.user_id).await?.is_none() {
            return Err(LedgerError::InvalidReference(input.user_id));
        }

        let tx = Transaction::from_new(input);
        let model = transactions::ActiveModel {
            id: Set(tx.id.into_inner()),
            user_id: Set(tx.user_id.into_inner()),
            amount: Set(tx.amount),
            description: Set(tx.description.clone()),
            transaction_type: Set(type_to_db(tx.transaction_type)),
            source: Set(source_to_db(tx.source)),
            created_at: Set(tx.created_at.into()),
            corrected_at: Set(None),
            correction_data: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(db_error)?;

        Ok(transaction_from_model(model))
    }

    async fn find_transaction(&self, id: TransactionId) -> Result<Option<Transaction>, LedgerError> {
        transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|m| m.map(transaction_from_model))
            .map_err(db_error)
    }

    async fn list_transactions(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id.into_inner()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map(|rows| rows.into_iter().map(transaction_from_model).collect())
            .map_err(db_error)
    }

    async fn transactions_in(
        &self,
        user_id: UserId,
        window: Option<Window>,
    ) -> Result<Vec<Transaction>, LedgerError> {
        let mut query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id.into_inner()));
        if let Some(window) = window {
            query = query
                .filter(transactions::Column::CreatedAt.gte(window.start))
                .filter(transactions::Column::CreatedAt.lt(window.end));
        }

        query
            .all(&self.db)
            .await
            .map(|rows| rows.into_iter().map(transaction_from_model).collect())
            .map_err(db_error)
    }

    async fn save_correction(
        &self,
        id: TransactionId,
        record: CorrectionRecord,
    ) -> Result<Transaction, LedgerError> {
        let model = transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_error)?
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let snapshot = serde_json::to_value(&record)
            .map_err(|e| LedgerError::repository(format!("correction snapshot: {e}")))?;

        let mut active: transactions::ActiveModel = model.into();
        active.amount = Set(record.corrected_amount);
        active.description = Set(record.corrected_description);
        active.corrected_at = Set(Some(record.corrected_at.into()));
        active.correction_data = Set(Some(snapshot));

        let model = active.update(&self.db).await.map_err(db_error)?;
        Ok(transaction_from_model(model))
    }
}

fn db_error(e: DbErr) -> LedgerError {
    LedgerError::repository(e.to_string())
}

fn user_from_model(m: users::Model) -> User {
    User {
        id: UserId::from_uuid(m.id),
        phone_number: m.phone_number,
        created_at: m.created_at.with_timezone(&Utc),
        trial_transactions_count: m.trial_transactions_count,
        subscription_status: status_from_db(m.subscription_status),
        subscription_expires_at: m.subscription_expires_at.map(|t| t.with_timezone(&Utc)),
    }
}

fn transaction_from_model(m: transactions::Model) -> Transaction {
    let correction_data = m.correction_data.and_then(|json| {
        serde_json::from_value(json)
            .inspect_err(|e| warn!(transaction_id = %m.id, error = %e, "unreadable correction snapshot"))
            .ok()
    });

    Transaction {
        id: TransactionId::from_uuid(m.id),
        user_id: UserId::from_uuid(m.user_id),
        amount: m.amount,
        description: m.description,
        transaction_type: match m.transaction_type {
            db_enums::TransactionType::Income => TransactionType::Income,
            db_enums::TransactionType::Expense => TransactionType::Expense,
        },
        source: match m.source {
            db_enums::TransactionSource::Text => TransactionSource::Text,
            db_enums::TransactionSource::Voice => TransactionSource::Voice,
            db_enums::TransactionSource::Image => TransactionSource::Image,
        },
        created_at: m.created_at.with_timezone(&Utc),
        corrected_at: m.corrected_at.map(|t| t.with_timezone(&Utc)),
        correction_data,
    }
}

const fn status_from_db(s: db_enums::SubscriptionStatus) -> SubscriptionStatus {
    match s {
        db_enums::SubscriptionStatus::Trial => SubscriptionStatus::Trial,
        db_enums::SubscriptionStatus::Active => SubscriptionStatus::Active,
        db_enums::SubscriptionStatus::Cancelled => SubscriptionStatus::Cancelled,
    }
}

const fn status_to_db(s: SubscriptionStatus) -> db_enums::SubscriptionStatus {
    match s {
        SubscriptionStatus::Trial => db_enums::SubscriptionStatus::Trial,
        SubscriptionStatus::Active => db_enums::SubscriptionStatus::Active,
        SubscriptionStatus::Cancelled => db_enums::SubscriptionStatus::Cancelled,
    }
}

const fn type_to_db(t: TransactionType) -> db_enums::TransactionType {
    match t {
        TransactionType::Income => db_enums::TransactionType::Income,
        TransactionType::Expense => db_enums::TransactionType::Expense,
    }
}

const fn source_to_db(s: TransactionSource) -> db_enums::TransactionSource {
    match s {
        TransactionSource::Text => db_enums::TransactionSource::Text,
        TransactionSource::Voice => db_enums::TransactionSource::Voice,
        TransactionSource::Image => db_enums::TransactionSource::Image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_mapping_round_trips() {
        for s in [
            SubscriptionStatus::Trial,
            SubscriptionStatus::Active,
            SubscriptionStatus::Cancelled,
        ] {
            assert_eq!(status_from_db(status_to_db(s)), s);
        }
    }

    #[test]
    fn test_transaction_from_model_reads_snapshot() {
        let now = Utc::now();
        let record = CorrectionRecord {
            original_amount: dec!(50),
            original_description: "venda".into(),
            corrected_amount: dec!(45),
            corrected_description: "venda de pão".into(),
            corrected_at: now,
        };
        let model = transactions::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            amount: dec!(45),
            description: "venda de pão".into(),
            transaction_type: db_enums::TransactionType::Income,
            source: db_enums::TransactionSource::Voice,
            created_at: now.into(),
            corrected_at: Some(now.into()),
            correction_data: Some(serde_json::to_value(&record).unwrap()),
        };

        let tx = transaction_from_model(model);
        assert_eq!(tx.source, TransactionSource::Voice);
        assert_eq!(tx.correction_data, Some(record));
    }

    #[test]
    fn test_unreadable_snapshot_is_dropped() {
        let now = Utc::now();
        let model = transactions::Model {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            amount: dec!(1),
            description: "x".into(),
            transaction_type: db_enums::TransactionType::Expense,
            source: db_enums::TransactionSource::Text,
            created_at: now.into(),
            corrected_at: None,
            correction_data: Some(serde_json::json!({"unexpected": true})),
        };
        assert!(transaction_from_model(model).correction_data.is_none());
    }
}
