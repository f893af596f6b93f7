//! Access policy decisions.

use ara_shared::types::UserId;
use serde::{Deserialize, Serialize};

use crate::ledger::{SubscriptionStatus, User};

/// Hard cap on transactions for non-active users.
pub const TRIAL_TRANSACTION_LIMIT: i32 = 50;

/// Count at which trial users start being prompted to subscribe.
pub const TRIAL_WARNING_THRESHOLD: i32 = 45;

/// Derived trial state of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialStatus {
    /// The user.
    pub user_id: UserId,
    /// Current subscription state.
    pub subscription_status: SubscriptionStatus,
    /// Transactions counted so far.
    pub trial_transactions_count: i32,
    /// `50 - count`; negative once the cap has been passed.
    pub remaining_trial_transactions: i32,
    /// Count reached the cap.
    pub is_trial_expired: bool,
    /// Trial user at or past the warning threshold.
    pub should_prompt_for_subscription: bool,
}

/// Active users always pass; everyone else passes while under the cap.
#[must_use]
pub fn can_create_transaction(user: &User) -> bool {
    user.subscription_status == SubscriptionStatus::Active
        || user.trial_transactions_count < TRIAL_TRANSACTION_LIMIT
}

/// True once the counter reaches the cap, regardless of status.
#[must_use]
pub fn is_trial_expired(user: &User) -> bool {
    user.trial_transactions_count >= TRIAL_TRANSACTION_LIMIT
}

/// Computes remaining count and prompt flag.
#[must_use]
pub fn check_trial_status(user: &User) -> TrialStatus {
    let expired = is_trial_expired(user);
    let should_prompt = user.subscription_status == SubscriptionStatus::Trial
        && (user.trial_transactions_count >= TRIAL_WARNING_THRESHOLD || expired);

    TrialStatus {
        user_id: user.id,
        subscription_status: user.subscription_status,
        trial_transactions_count: user.trial_transactions_count,
        remaining_trial_transactions: TRIAL_TRANSACTION_LIMIT - user.trial_transactions_count,
        is_trial_expired: expired,
        should_prompt_for_subscription: should_prompt,
    }
}
