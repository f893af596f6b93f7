//! Financial reporting.
//!
//! Pure composition over the transaction service:
//! - Conversational period summaries (pt-BR)
//! - Detailed reports with trend annotations
//! - Trial status and conversion messages

pub mod format;
pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::*;
