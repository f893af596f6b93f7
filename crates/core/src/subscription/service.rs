//! Subscription state machine over the user record.

use std::sync::Arc;

use ara_shared::types::{Currency, UserId};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::error::SubscriptionError;
use super::types::{
    MONTHLY_PRICE, PaymentWebhook, SUBSCRIPTION_PERIOD_DAYS, Subscription, SubscriptionInfo,
    WebhookOutcome,
};
use crate::access::{self, TrialStatus};
use crate::ledger::{LedgerError, LedgerRepository, SubscriptionStatus, User};

/// Service for subscribe, cancel, renew and payment webhooks.
pub struct SubscriptionService<R: LedgerRepository> {
    repo: Arc<R>,
}

impl<R: LedgerRepository> Clone for SubscriptionService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

fn period() -> Duration {
    Duration::days(SUBSCRIPTION_PERIOD_DAYS)
}

impl<R: LedgerRepository> SubscriptionService<R> {
    /// Create a new subscription service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn user(&self, user_id: UserId) -> Result<User, SubscriptionError> {
        self.repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::UserNotFound(user_id).into())
    }

    /// Trial counters and prompt flag for a user.
    pub async fn check_trial_status(&self, user_id: UserId) -> Result<TrialStatus, SubscriptionError> {
        let user = self.user(user_id).await?;
        Ok(access::check_trial_status(&user))
    }

    /// Direct subscribe. Does not verify payment.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` when the user is active.
    pub async fn create_subscription(
        &self,
        user_id: UserId,
        payment_method: &str,
    ) -> Result<Subscription, SubscriptionError> {
        let user = self.user(user_id).await?;
        if user.subscription_status == SubscriptionStatus::Active {
            return Err(SubscriptionError::AlreadyActive(user_id));
        }

        let now = Utc::now();
        let expires_at = now + period();
        self.activate(user_id, expires_at).await?;
        info!(%user_id, from = %user.subscription_status, %expires_at, "subscription created");

        Ok(Subscription {
            user_id,
            status: SubscriptionStatus::Active,
            payment_method: payment_method.to_string(),
            amount: MONTHLY_PRICE,
            currency: Currency::Brl,
            created_at: now,
            expires_at,
        })
    }

    /// Moves an active user to cancelled. Expiry is left untouched.
    ///
    /// # Errors
    ///
    /// `NotActive` when the user is not active.
    pub async fn cancel_subscription(&self, user_id: UserId) -> Result<User, SubscriptionError> {
        let user = self.user(user_id).await?;
        if user.subscription_status != SubscriptionStatus::Active {
            return Err(SubscriptionError::NotActive {
                user_id,
                status: user.subscription_status,
            });
        }

        let updated = self
            .repo
            .update_subscription_status(user_id, SubscriptionStatus::Cancelled)
            .await?;
        info!(%user_id, "subscription cancelled");
        Ok(updated)
    }

    /// Extends an active subscription by one period from the later of now
    /// and the current unexpired expiry.
    ///
    /// # Errors
    ///
    /// `NotActive` when the user is not active.
    pub async fn renew_subscription(&self, user_id: UserId) -> Result<User, SubscriptionError> {
        let user = self.user(user_id).await?;
        if user.subscription_status != SubscriptionStatus::Active {
            return Err(SubscriptionError::NotActive {
                user_id,
                status: user.subscription_status,
            });
        }

        let new_expiry = renewed_expiry(user.subscription_expires_at, Utc::now());
        let updated = self
            .repo
            .update_subscription_expiry(user_id, Some(new_expiry))
            .await?;
        info!(%user_id, %new_expiry, "subscription renewed");
        Ok(updated)
    }

    /// Status, counters and expiry for a user.
    pub async fn get_subscription_info(
        &self,
        user_id: UserId,
    ) -> Result<SubscriptionInfo, SubscriptionError> {
        let user = self.user(user_id).await?;
        let trial = access::check_trial_status(&user);

        Ok(SubscriptionInfo {
            user_id,
            subscription_status: user.subscription_status,
            trial_transactions_count: user.trial_transactions_count,
            remaining_trial_transactions: trial.remaining_trial_transactions,
            is_trial_expired: trial.is_trial_expired,
            subscription_expires_at: user.subscription_expires_at,
            days_until_expiry: user
                .subscription_expires_at
                .map_or(0, |exp| days_until(exp, Utc::now())),
            monthly_price: MONTHLY_PRICE,
            currency: Currency::Brl,
        })
    }

    /// Applies a validated payment webhook.
    ///
    /// Unrecognized statuses and transitions outside the allowed edge set are
    /// logged and ignored.
    pub async fn process_payment_webhook(
        &self,
        hook: PaymentWebhook,
    ) -> Result<WebhookOutcome, SubscriptionError> {
        let user = self.user(hook.user_id).await?;
        let from = user.subscription_status;

        let Some(to) = hook.status.target_status() else {
            warn!(user_id = %hook.user_id, payment_id = %hook.payment_id, status = ?hook.status, "ignoring unrecognized payment status");
            return Ok(WebhookOutcome::Ignored {
                reason: format!("unrecognized payment status {:?}", hook.status),
            });
        };

        if !from.can_transition_to(to) {
            warn!(user_id = %hook.user_id, payment_id = %hook.payment_id, %from, %to, "ignoring payment webhook with illegal transition");
            return Ok(WebhookOutcome::Ignored {
                reason: format!("transition {from} -> {to} not allowed"),
            });
        }

        if to == SubscriptionStatus::Active {
            self.activate(hook.user_id, Utc::now() + period()).await?;
        } else {
            self.repo.update_subscription_status(hook.user_id, to).await?;
        }

        info!(user_id = %hook.user_id, payment_id = %hook.payment_id, %from, %to, "payment webhook applied");
        Ok(WebhookOutcome::Applied { from, to })
    }

    async fn activate(&self, user_id: UserId, expires_at: DateTime<Utc>) -> Result<(), SubscriptionError> {
        self.repo
            .update_subscription_status(user_id, SubscriptionStatus::Active)
            .await?;
        self.repo
            .update_subscription_expiry(user_id, Some(expires_at))
            .await?;
        Ok(())
    }
}

/// Later of `now` and an unexpired `current`, plus one period.
#[must_use]
pub fn renewed_expiry(current: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let base = current.filter(|exp| *exp > now).unwrap_or(now);
    base + period()
}

/// Whole days from `now` to `expiry`, floored.
#[must_use]
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry - now).num_seconds().div_euclid(86_400)
}
