//! Intake collaborator errors.

use std::time::Duration;

use ara_shared::AppError;
use thiserror::Error;

/// Failures of external collaborators (extractors and transport).
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The collaborator call failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The collaborator did not answer in time.
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),

    /// The collaborator answered with something unusable.
    #[error("unusable extraction: {0}")]
    InvalidExtraction(String),
}

impl IntakeError {
    /// Create an upstream error.
    #[must_use]
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        Self::UpstreamFailure(err.to_string())
    }
}
