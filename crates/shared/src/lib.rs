//! Shared types, errors, and configuration for Ara.
//!
//! This crate provides common types used across all other crates:
//! - Money formatting for the single supported currency (BRL)
//! - Typed IDs for users and transactions
//! - Application-wide error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
