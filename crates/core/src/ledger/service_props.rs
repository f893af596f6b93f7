//! Property-based tests for ledger aggregation.

use ara_shared::types::UserId;
use chrono::{Duration, Utc};
use chrono_tz::America::Sao_Paulo;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{balance, top_categories, PeriodSummary, Totals};
use super::period::Period;
use super::transaction::Transaction;
use super::types::{NewTransaction, TransactionSource, TransactionType};

/// Strategy to generate non-negative amounts (0.00 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn tx_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)]
}

/// Transactions for one user spread over the last 60 days.
fn rows() -> impl Strategy<Value = Vec<Transaction>> {
    let user_id = UserId::new();
    prop::collection::vec(
        (amount(), tx_type(), "[a-c]", 0i64..60 * 24),
        0..40,
    )
    .prop_map(move |items| {
        let now = Utc::now();
        items
            .into_iter()
            .map(|(amount, transaction_type, description, hours_ago)| {
                Transaction::from_new(NewTransaction {
                    user_id,
                    amount,
                    description,
                    transaction_type,
                    source: TransactionSource::Text,
                    created_at: now - Duration::hours(hours_ago),
                })
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Profit is always income minus expenses, and the balance agrees.
    #[test]
    fn prop_profit_is_income_minus_expenses(rows in rows()) {
        let totals = Totals::of(&rows);
        prop_assert_eq!(totals.profit(), totals.total_income - totals.total_expenses);
        prop_assert_eq!(balance(&rows), totals.profit());
        prop_assert_eq!(totals.count, rows.len());
    }

    /// A period summary only counts rows inside its window.
    #[test]
    fn prop_period_summary_counts_window_only(rows in rows(), period in prop_oneof![
        Just(Period::Today), Just(Period::Week), Just(Period::Month)
    ]) {
        let window = period.window(Utc::now(), Sao_Paulo);
        let summary = PeriodSummary::build(UserId::new(), period, window, &rows);
        let expected = rows.iter().filter(|t| window.contains(t.created_at)).count();
        prop_assert_eq!(summary.transaction_count, expected);
        prop_assert_eq!(summary.profit, summary.total_income - summary.total_expenses);
    }

    /// Category buckets are sorted by amount and never exceed the limit.
    #[test]
    fn prop_top_categories_sorted_and_bounded(rows in rows(), limit in 0usize..8) {
        let top = top_categories(&rows, limit);
        prop_assert!(top.len() <= limit);
        for pair in top.windows(2) {
            prop_assert!(pair[0].total_amount >= pair[1].total_amount);
        }
        if limit >= 6 {
            let counted: usize = top.iter().map(|c| c.count).sum();
            prop_assert_eq!(counted, rows.len());
        }
    }
}
