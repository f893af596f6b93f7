//! Report data types.

use ara_shared::types::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{CategorySummary, Period, PeriodSummary, User};

/// Baseline advice included in every report.
pub const RECOMMEND_KEEP_LOGGING: &str = "Continue registrando suas transações regularmente";
/// Baseline advice included in every report.
pub const RECOMMEND_MONITOR_EXPENSES: &str =
    "Monitore seus gastos para identificar oportunidades de economia";
/// Added when expenses exceed income.
pub const RECOMMEND_REDUCE_EXPENSES: &str = "Considere reduzir despesas para melhorar seu lucro";
/// Added when the period is profitable.
pub const RECOMMEND_KEEP_PROFIT: &str = "Excelente! Você está gerando lucro. Continue assim!";

/// Direction of a metric over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    /// Going up.
    Increasing,
    /// Going down.
    Decreasing,
    /// Flat.
    Stable,
}

/// Trend block attached to a detailed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Profit direction.
    pub profit_trend: TrendDirection,
    /// Income direction.
    pub income_trend: TrendDirection,
    /// Expense direction.
    pub expense_trend: TrendDirection,
    /// Period-over-period growth.
    pub growth_rate: Decimal,
    /// Human-readable advice, in Portuguese.
    pub recommendations: Vec<String>,
}

impl TrendAnalysis {
    /// Heuristic trends for a single period.
    ///
    /// There is no comparison against a prior period yet: directions are
    /// always stable with zero growth, and only the recommendations react to
    /// the numbers.
    // TODO: compare against the preceding window of the same length to fill in real directions.
    #[must_use]
    pub fn calculate(summary: &PeriodSummary) -> Self {
        let mut recommendations = vec![
            RECOMMEND_KEEP_LOGGING.to_string(),
            RECOMMEND_MONITOR_EXPENSES.to_string(),
        ];
        if summary.total_expenses > summary.total_income {
            recommendations.push(RECOMMEND_REDUCE_EXPENSES.to_string());
        }
        if summary.profit > Decimal::ZERO {
            recommendations.push(RECOMMEND_KEEP_PROFIT.to_string());
        }

        Self {
            profit_trend: TrendDirection::Stable,
            income_trend: TrendDirection::Stable,
            expense_trend: TrendDirection::Stable,
            growth_rate: Decimal::ZERO,
            recommendations,
        }
    }
}

/// Structured report over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedReport {
    /// The user.
    pub user_id: UserId,
    /// Reported period.
    pub period: Period,
    /// Period totals.
    pub summary: PeriodSummary,
    /// All-time balance.
    pub current_balance: Decimal,
    /// Top five categories in the period.
    pub top_categories: Vec<CategorySummary>,
    /// User snapshot.
    pub user: User,
    /// Generation time.
    pub generated_at: DateTime<Utc>,
    /// Trend block.
    pub trends: TrendAnalysis,
}
