//! Report generation service.

use ara_shared::types::UserId;
use chrono::Utc;

use super::format;
use super::types::{DetailedReport, TrendAnalysis};
use crate::ledger::{
    DEFAULT_CATEGORY_LIMIT, LedgerError, LedgerRepository, Period, TransactionService,
};

/// Composes transaction aggregates into conversational and structured reports.
///
/// Read-only: never writes to the ledger.
pub struct ReportService<R: LedgerRepository> {
    transactions: TransactionService<R>,
}

impl<R: LedgerRepository> Clone for ReportService<R> {
    fn clone(&self) -> Self {
        Self {
            transactions: self.transactions.clone(),
        }
    }
}

impl<R: LedgerRepository> ReportService<R> {
    /// Creates a new report service.
    #[must_use]
    pub fn new(transactions: TransactionService<R>) -> Self {
        Self { transactions }
    }

    /// Localized narrative summary for a period.
    pub async fn generate_conversational_summary(
        &self,
        user_id: UserId,
        period: &str,
    ) -> Result<String, LedgerError> {
        let period = Period::parse(period)?;
        let summary = self.transactions.period_summary(user_id, period).await?;
        let user = self.transactions.get_user(user_id).await?;
        Ok(format::conversational_summary(&summary, &user))
    }

    /// Summary, balance, top categories, user snapshot and trends.
    pub async fn generate_detailed_report(
        &self,
        user_id: UserId,
        period: &str,
    ) -> Result<DetailedReport, LedgerError> {
        let period = Period::parse(period)?;
        let summary = self.transactions.period_summary(user_id, period).await?;
        let current_balance = self.transactions.get_user_balance(user_id).await?;
        let top_categories = self
            .transactions
            .top_categories(user_id, period, DEFAULT_CATEGORY_LIMIT)
            .await?;
        let user = self.transactions.get_user(user_id).await?;
        let trends = TrendAnalysis::calculate(&summary);

        Ok(DetailedReport {
            user_id,
            period,
            summary,
            current_balance,
            top_categories,
            user,
            generated_at: Utc::now(),
            trends,
        })
    }

    /// Trial status line for the chat channel.
    pub async fn generate_trial_status_message(
        &self,
        user_id: UserId,
    ) -> Result<String, LedgerError> {
        let user = self.transactions.get_user(user_id).await?;
        Ok(format::trial_status_message(&user))
    }

    /// Premium upsell message.
    pub async fn generate_conversion_message(&self, user_id: UserId) -> Result<String, LedgerError> {
        let today = self.transactions.period_summary(user_id, Period::Today).await?;
        let week = self.transactions.period_summary(user_id, Period::Week).await?;
        let balance = self.transactions.get_user_balance(user_id).await?;
        Ok(format::conversion_message(today.profit, week.profit, balance))
    }
}
