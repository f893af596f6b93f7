//! Trial/subscription gate.
//!
//! Pure decisions over `User` state: whether a new transaction may be
//! created, whether the trial is exhausted, and whether to prompt for a
//! subscription.

pub mod policy;

#[cfg(test)]
mod policy_props;

pub use policy::{
    TRIAL_TRANSACTION_LIMIT, TRIAL_WARNING_THRESHOLD, TrialStatus, can_create_transaction,
    check_trial_status, is_trial_expired,
};
