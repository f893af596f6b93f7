//! Transaction service: creation, aggregation and corrections.

use std::sync::Arc;

use ara_shared::types::{TransactionId, UserId};
use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::{debug, error};

use super::balance::{self, CategorySummary, FinancialSummary, PeriodSummary};
use super::error::LedgerError;
use super::period::Period;
use super::repository::LedgerRepository;
use super::transaction::Transaction;
use super::types::{NewTransaction, TransactionSource, TransactionType, User};

/// Default number of categories returned by `get_top_categories`.
pub const DEFAULT_CATEGORY_LIMIT: usize = 5;

/// Service over a [`LedgerRepository`].
pub struct TransactionService<R: LedgerRepository> {
    repo: Arc<R>,
    tz: Tz,
}

impl<R: LedgerRepository> Clone for TransactionService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            tz: self.tz,
        }
    }
}

impl<R: LedgerRepository> TransactionService<R> {
    /// Create a new transaction service. `tz` defines "local midnight".
    #[must_use]
    pub fn new(repo: Arc<R>, tz: Tz) -> Self {
        Self { repo, tz }
    }

    /// Underlying repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Business timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Loads a user or fails with `UserNotFound`.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, LedgerError> {
        self.repo
            .find_user(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))
    }

    /// Records a transaction and bumps the user's trial counter.
    ///
    /// The counter is incremented regardless of subscription status. If the
    /// increment fails the row stays persisted and `PartialFailure` is
    /// returned; there is no retry.
    pub async fn create_transaction(
        &self,
        user_id: UserId,
        amount: Decimal,
        description: &str,
        transaction_type: TransactionType,
        source: TransactionSource,
    ) -> Result<Transaction, LedgerError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(LedgerError::invalid_argument(format!(
                "amount must be non-negative, got {amount}"
            )));
        }

        if self.repo.find_user(user_id).await?.is_none() {
            return Err(LedgerError::InvalidReference(user_id));
        }

        let tx = self
            .repo
            .insert_transaction(NewTransaction {
                user_id,
                amount,
                description: description.trim().to_string(),
                transaction_type,
                source,
                created_at: Utc::now(),
            })
            .await?;

        match self.repo.increment_trial_count(user_id).await {
            Ok(count) => {
                debug!(%user_id, transaction_id = %tx.id, trial_count = count, "transaction recorded");
                Ok(tx)
            }
            Err(e) => {
                error!(
                    %user_id,
                    transaction_id = %tx.id,
                    error = %e,
                    "transaction persisted but trial counter increment failed"
                );
                Err(LedgerError::PartialFailure {
                    transaction_id: tx.id,
                    source: Box::new(e),
                })
            }
        }
    }

    /// Up to `limit` transactions, newest first.
    pub async fn get_user_transactions(
        &self,
        user_id: UserId,
        limit: u64,
    ) -> Result<Vec<Transaction>, LedgerError> {
        self.get_user(user_id).await?;
        self.repo.list_transactions(user_id, limit).await
    }

    /// Loads a transaction or fails with `TransactionNotFound`.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.repo
            .find_transaction(id)
            .await?
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    /// Today's income, expenses and profit.
    pub async fn get_financial_summary(
        &self,
        user_id: UserId,
    ) -> Result<FinancialSummary, LedgerError> {
        let summary = self.period_summary(user_id, Period::Today).await?;
        Ok(FinancialSummary {
            user_id,
            date: summary.start_date,
            total_income: summary.total_income,
            total_expenses: summary.total_expenses,
            profit: summary.profit,
        })
    }

    /// Aggregates over a named period. Unknown names are `InvalidArgument`.
    pub async fn get_period_summary(
        &self,
        user_id: UserId,
        period: &str,
    ) -> Result<PeriodSummary, LedgerError> {
        let period = Period::parse(period)?;
        self.period_summary(user_id, period).await
    }

    /// Aggregates over an already parsed period.
    pub async fn period_summary(
        &self,
        user_id: UserId,
        period: Period,
    ) -> Result<PeriodSummary, LedgerError> {
        self.get_user(user_id).await?;
        let window = period.window(Utc::now(), self.tz);
        let rows = self.repo.transactions_in(user_id, Some(window)).await?;
        Ok(PeriodSummary::build(user_id, period, window, &rows))
    }

    /// Overwrites amount and description, keeping the prior values for audit.
    pub async fn correct_transaction(
        &self,
        id: TransactionId,
        new_amount: Decimal,
        new_description: &str,
    ) -> Result<Transaction, LedgerError> {
        if new_amount.is_sign_negative() && !new_amount.is_zero() {
            return Err(LedgerError::invalid_argument(format!(
                "amount must be non-negative, got {new_amount}"
            )));
        }

        let current = self.get_transaction(id).await?;
        let record = current.correction(new_amount, new_description.trim(), Utc::now());
        let corrected = self.repo.save_correction(id, record).await?;
        debug!(transaction_id = %id, "transaction corrected");
        Ok(corrected)
    }

    /// All-time income minus expenses.
    pub async fn get_user_balance(&self, user_id: UserId) -> Result<Decimal, LedgerError> {
        self.get_user(user_id).await?;
        let rows = self.repo.transactions_in(user_id, None).await?;
        Ok(balance::balance(&rows))
    }

    /// Largest `(description, type)` buckets in the period window.
    ///
    /// Absent or unrecognized periods fall back to today.
    pub async fn get_top_categories(
        &self,
        user_id: UserId,
        period: Option<&str>,
        limit: usize,
    ) -> Result<Vec<CategorySummary>, LedgerError> {
        self.top_categories(user_id, Period::parse_or_today(period), limit)
            .await
    }

    /// Same as `get_top_categories` with a parsed period.
    pub async fn top_categories(
        &self,
        user_id: UserId,
        period: Period,
        limit: usize,
    ) -> Result<Vec<CategorySummary>, LedgerError> {
        self.get_user(user_id).await?;
        let window = period.window(Utc::now(), self.tz);
        let rows = self.repo.transactions_in(user_id, Some(window)).await?;
        Ok(balance::top_categories(&rows, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::BrokenCounter;
    use crate::ledger::types::SubscriptionStatus;
    use crate::ledger::InMemoryLedger;
    use chrono::Duration;
    use chrono_tz::America::Sao_Paulo;
    use rust_decimal_macros::dec;

    fn service() -> TransactionService<InMemoryLedger> {
        TransactionService::new(Arc::new(InMemoryLedger::new()), Sao_Paulo)
    }

    async fn user(svc: &TransactionService<InMemoryLedger>) -> User {
        svc.repository()
            .get_or_create_user("+5511987654321")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_list_returns_it_first_and_counts_once() {
        let svc = service();
        let u = user(&svc).await;

        svc.create_transaction(u.id, dec!(10), "antigo", TransactionType::Income, TransactionSource::Text)
            .await
            .unwrap();
        let created = svc
            .create_transaction(u.id, dec!(25.50), "  marmita  ", TransactionType::Expense, TransactionSource::Voice)
            .await
            .unwrap();

        let latest = svc.get_user_transactions(u.id, 1).await.unwrap();
        assert_eq!(latest, vec![created.clone()]);
        assert_eq!(created.description, "marmita");
        assert_eq!(svc.get_user(u.id).await.unwrap().trial_transactions_count, 2);
    }

    #[tokio::test]
    async fn test_counter_keeps_counting_when_active() {
        let svc = service();
        let u = user(&svc).await;
        svc.repository()
            .update_subscription_status(u.id, SubscriptionStatus::Active)
            .await
            .unwrap();

        svc.create_transaction(u.id, dec!(1), "x", TransactionType::Income, TransactionSource::Text)
            .await
            .unwrap();
        assert_eq!(svc.get_user(u.id).await.unwrap().trial_transactions_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_reference() {
        let svc = service();
        let err = svc
            .create_transaction(UserId::new(), dec!(1), "x", TransactionType::Income, TransactionSource::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let svc = service();
        let u = user(&svc).await;
        let err = svc
            .create_transaction(u.id, dec!(-1), "x", TransactionType::Income, TransactionSource::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_increment_failure_is_partial_and_row_persists() {
        let repo = Arc::new(BrokenCounter::default());
        let svc = TransactionService::new(Arc::clone(&repo), Sao_Paulo);
        let u = repo.get_or_create_user("+5511000000000").await.unwrap();

        let err = svc
            .create_transaction(u.id, dec!(5), "x", TransactionType::Income, TransactionSource::Text)
            .await
            .unwrap_err();
        let LedgerError::PartialFailure { transaction_id, .. } = err else {
            panic!("expected partial failure, got {err:?}");
        };

        assert!(svc.get_transaction(transaction_id).await.is_ok());
        assert_eq!(svc.get_user(u.id).await.unwrap().trial_transactions_count, 0);
    }

    #[tokio::test]
    async fn test_today_summary() {
        let svc = service();
        let u = user(&svc).await;
        svc.create_transaction(u.id, dec!(100), "venda", TransactionType::Income, TransactionSource::Text)
            .await
            .unwrap();
        svc.create_transaction(u.id, dec!(30), "gás", TransactionType::Expense, TransactionSource::Text)
            .await
            .unwrap();

        let summary = svc.get_period_summary(u.id, "today").await.unwrap();
        assert_eq!(summary.total_income, dec!(100));
        assert_eq!(summary.total_expenses, dec!(30));
        assert_eq!(summary.profit, dec!(70));
        assert_eq!(summary.transaction_count, 2);

        let today = svc.get_financial_summary(u.id).await.unwrap();
        assert_eq!(today.profit, dec!(70));
    }

    #[tokio::test]
    async fn test_period_summary_excludes_old_rows() {
        let svc = service();
        let u = user(&svc).await;
        svc.repository()
            .insert_transaction(NewTransaction {
                user_id: u.id,
                amount: dec!(500),
                description: "antigo".into(),
                transaction_type: TransactionType::Income,
                source: TransactionSource::Text,
                created_at: Utc::now() - Duration::days(10),
            })
            .await
            .unwrap();

        let week = svc.get_period_summary(u.id, "week").await.unwrap();
        assert_eq!(week.transaction_count, 0);
        let month = svc.get_period_summary(u.id, "month").await.unwrap();
        assert_eq!(month.total_income, dec!(500));
        assert_eq!(svc.get_user_balance(u.id).await.unwrap(), dec!(500));
    }

    #[tokio::test]
    async fn test_unknown_period_is_invalid_argument() {
        let svc = service();
        let u = user(&svc).await;
        let err = svc.get_period_summary(u.id, "year").await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_correction_round_trip() {
        let svc = service();
        let u = user(&svc).await;
        let tx = svc
            .create_transaction(u.id, dec!(12.34), "errado", TransactionType::Expense, TransactionSource::Image)
            .await
            .unwrap();

        svc.correct_transaction(tx.id, dec!(20.00), "fix").await.unwrap();
        let loaded = svc.get_transaction(tx.id).await.unwrap();

        assert_eq!(loaded.amount, dec!(20.00));
        assert_eq!(loaded.description, "fix");
        assert_eq!(loaded.transaction_type, TransactionType::Expense);
        assert_eq!(loaded.source, TransactionSource::Image);
        let record = loaded.correction_data.unwrap();
        assert_eq!(record.original_amount, dec!(12.34));
        assert_eq!(record.original_description, "errado");
        assert_eq!(loaded.corrected_at, Some(record.corrected_at));
    }

    #[tokio::test]
    async fn test_correct_missing_transaction_is_not_found() {
        let svc = service();
        let err = svc
            .correct_transaction(TransactionId::new(), dec!(1), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::TransactionNotFound(_)));
    }

    #[tokio::test]
    async fn test_top_categories_default_to_today() {
        let svc = service();
        let u = user(&svc).await;
        for (amount, desc) in [(dec!(10), "pão"), (dec!(15), "pão"), (dec!(40), "bolo")] {
            svc.create_transaction(u.id, amount, desc, TransactionType::Income, TransactionSource::Text)
                .await
                .unwrap();
        }

        let top = svc.get_top_categories(u.id, Some("all"), 1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].description, "bolo");

        let top = svc.get_top_categories(u.id, None, 5).await.unwrap();
        assert_eq!(top[1].count, 2);
    }

    #[tokio::test]
    async fn test_reads_for_unknown_user_are_not_found() {
        let svc = service();
        let err = svc.get_user_balance(UserId::new()).await.unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));
    }
}
