//! Subscription manager.
//!
//! Creates, cancels and renews subscriptions, applies payment webhook
//! outcomes and reports trial/subscription status.

pub mod error;
pub mod service;
pub mod types;

pub use error::SubscriptionError;
pub use service::{SubscriptionService, days_until, renewed_expiry};
pub use types::{
    MONTHLY_PRICE, PaymentStatus, PaymentWebhook, SUBSCRIPTION_PERIOD_DAYS, Subscription,
    SubscriptionInfo, WebhookOutcome,
};
