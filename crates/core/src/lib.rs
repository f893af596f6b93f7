//! Core business logic for Ara.
//!
//! This crate contains the domain with ZERO web or database dependencies.
//! Storage is reached through [`ledger::LedgerRepository`]; external
//! extractors and messaging through the traits in [`intake`].
//!
//! # Modules
//!
//! - `ledger` - Users, transactions, period windows and aggregates
//! - `access` - Trial gate
//! - `subscription` - Subscription lifecycle and payment webhooks
//! - `reports` - Conversational summaries and detailed reports
//! - `intake` - Inbound message pipeline

pub mod access;
pub mod intake;
pub mod ledger;
pub mod reports;
pub mod subscription;
