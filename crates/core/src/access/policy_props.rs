//! Property-based tests for the access policy.

use chrono::Utc;
use proptest::prelude::*;

use super::policy::{
    TRIAL_TRANSACTION_LIMIT, can_create_transaction, check_trial_status, is_trial_expired,
};
use crate::ledger::{SubscriptionStatus, User};

fn user_with(count: i32, status: SubscriptionStatus) -> User {
    let mut u = User::new_trial("+5500000000000", Utc::now());
    u.trial_transactions_count = count;
    u.subscription_status = status;
    u
}

fn any_status() -> impl Strategy<Value = SubscriptionStatus> {
    prop_oneof![
        Just(SubscriptionStatus::Trial),
        Just(SubscriptionStatus::Active),
        Just(SubscriptionStatus::Cancelled),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Trial users under the cap may always create.
    #[test]
    fn prop_trial_under_cap_allowed(count in 0..TRIAL_TRANSACTION_LIMIT) {
        prop_assert!(can_create_transaction(&user_with(count, SubscriptionStatus::Trial)));
    }

    /// Trial users at or over the cap are always denied.
    #[test]
    fn prop_trial_over_cap_denied(count in TRIAL_TRANSACTION_LIMIT..10_000) {
        let u = user_with(count, SubscriptionStatus::Trial);
        prop_assert!(!can_create_transaction(&u));
        prop_assert!(is_trial_expired(&u));
    }

    /// Active users are always allowed, whatever the counter says.
    #[test]
    fn prop_active_always_allowed(count in 0..10_000i32) {
        prop_assert!(can_create_transaction(&user_with(count, SubscriptionStatus::Active)));
    }

    /// Remaining is always cap minus count, and prompting implies trial.
    #[test]
    fn prop_remaining_and_prompt(count in 0..10_000i32, status in any_status()) {
        let s = check_trial_status(&user_with(count, status));
        prop_assert_eq!(s.remaining_trial_transactions, TRIAL_TRANSACTION_LIMIT - count);
        if s.should_prompt_for_subscription {
            prop_assert_eq!(status, SubscriptionStatus::Trial);
        }
    }
}
