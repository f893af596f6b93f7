//! Repository implementations.
//!
//! Repositories hide the `SeaORM` details behind the core crate's storage traits.

pub mod ledger;

pub use ledger::LedgerStore;
