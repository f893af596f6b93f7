//! Account ledger and transaction service.
//!
//! This module owns the ledger data model and everything computed from it:
//! - Users keyed by phone number, with trial counter and subscription state
//! - Transactions with correction audit records
//! - Period windows (today, week, month)
//! - Balance, period summaries and category rankings
//! - The storage contract and an in-memory implementation

pub mod balance;
pub mod error;
pub mod memory;
pub mod period;
pub mod repository;
pub mod service;
pub mod transaction;
pub mod types;

#[cfg(test)]
mod service_props;
#[cfg(test)]
pub(crate) mod testing;

pub use balance::{CategorySummary, FinancialSummary, PeriodSummary, Totals};
pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use period::{Period, Window};
pub use repository::LedgerRepository;
pub use service::{TransactionService, DEFAULT_CATEGORY_LIMIT};
pub use transaction::Transaction;
pub use types::{
    CorrectionRecord, NewTransaction, SubscriptionStatus, TransactionSource, TransactionType, User,
};
