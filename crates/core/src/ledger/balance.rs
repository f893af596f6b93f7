//! Income/expense aggregation over transaction sets.
//!
//! All functions here are pure; the service fetches the rows and hands them in.

use std::collections::HashMap;

use ara_shared::types::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::{Period, Window};
use super::transaction::Transaction;
use super::types::TransactionType;

/// Running totals for a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of income amounts.
    pub total_income: Decimal,
    /// Sum of expense amounts.
    pub total_expenses: Decimal,
    /// Number of transactions seen.
    pub count: usize,
}

impl Totals {
    /// Adds one transaction.
    pub fn add(&mut self, tx: &Transaction) {
        match tx.transaction_type {
            TransactionType::Income => self.total_income += tx.amount,
            TransactionType::Expense => self.total_expenses += tx.amount,
        }
        self.count += 1;
    }

    /// Income minus expenses.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.total_income - self.total_expenses
    }

    /// Folds a slice into totals.
    #[must_use]
    pub fn of(transactions: &[Transaction]) -> Self {
        let mut totals = Self::default();
        for tx in transactions {
            totals.add(tx);
        }
        totals
    }
}

/// Today's totals for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    /// The user.
    pub user_id: UserId,
    /// Start of the local day.
    pub date: DateTime<Utc>,
    /// Sum of income.
    pub total_income: Decimal,
    /// Sum of expenses.
    pub total_expenses: Decimal,
    /// Income minus expenses.
    pub profit: Decimal,
}

/// Totals over a named period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// The user.
    pub user_id: UserId,
    /// Which period.
    pub period: Period,
    /// Inclusive window start.
    pub start_date: DateTime<Utc>,
    /// Exclusive window end.
    pub end_date: DateTime<Utc>,
    /// Sum of income.
    pub total_income: Decimal,
    /// Sum of expenses.
    pub total_expenses: Decimal,
    /// Income minus expenses.
    pub profit: Decimal,
    /// Number of transactions in the window.
    pub transaction_count: usize,
}

impl PeriodSummary {
    /// Builds a summary from the rows that fall in `window`.
    #[must_use]
    pub fn build(
        user_id: UserId,
        period: Period,
        window: Window,
        transactions: &[Transaction],
    ) -> Self {
        let mut totals = Totals::default();
        for tx in transactions.iter().filter(|t| window.contains(t.created_at)) {
            totals.add(tx);
        }
        Self {
            user_id,
            period,
            start_date: window.start,
            end_date: window.end,
            total_income: totals.total_income,
            total_expenses: totals.total_expenses,
            profit: totals.profit(),
            transaction_count: totals.count,
        }
    }
}

/// A `(description, type)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Grouping description.
    pub description: String,
    /// Grouping type.
    pub transaction_type: TransactionType,
    /// Number of transactions in the bucket.
    pub count: usize,
    /// Summed amount.
    pub total_amount: Decimal,
}

/// All-time balance: income minus expenses.
#[must_use]
pub fn balance(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(Transaction::signed_amount).sum()
}

/// Groups by `(description, type)` and returns the `limit` largest buckets.
///
/// Ties on amount are broken by description, then type.
#[must_use]
pub fn top_categories(transactions: &[Transaction], limit: usize) -> Vec<CategorySummary> {
    let mut buckets: HashMap<(&str, TransactionType), (usize, Decimal)> = HashMap::new();
    for tx in transactions {
        let entry = buckets
            .entry((tx.description.as_str(), tx.transaction_type))
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += tx.amount;
    }

    let mut categories: Vec<CategorySummary> = buckets
        .into_iter()
        .map(|((description, transaction_type), (count, total_amount))| CategorySummary {
            description: description.to_string(),
            transaction_type,
            count,
            total_amount,
        })
        .collect();

    categories.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.description.cmp(&b.description))
            .then_with(|| a.transaction_type.cmp(&b.transaction_type))
    });
    categories.truncate(limit);
    categories
}
