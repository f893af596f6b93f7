//! Application-wide error taxonomy.
//!
//! Every component error eventually maps onto one of these kinds. The query
//! API renders them as structured JSON; the conversational channel never
//! shows their text to end users.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Unknown user or transaction id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed id, unsupported period or malformed webhook payload.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Subscription state transition not allowed from the current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An extractor, transport or storage collaborator failed.
    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    /// Transaction persisted but the trial counter increment failed.
    #[error("Partial failure: {0}")]
    PartialFailure(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidArgument(_) => 400,
            Self::Conflict(_) => 409,
            Self::UpstreamFailure(_) => 502,
            Self::PartialFailure(_) | Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Conflict(_) => "CONFLICT",
            Self::UpstreamFailure(_) => "UPSTREAM_FAILURE",
            Self::PartialFailure(_) => "PARTIAL_FAILURE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
