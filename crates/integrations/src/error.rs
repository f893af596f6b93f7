//! Integration error types.

use ara_core::intake::IntakeError;
use thiserror::Error;

/// Errors talking to OpenAI or the WhatsApp Cloud API.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{service} API error {status}: {body}")]
    Api {
        /// Which API.
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The API answered but the payload was unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl IntegrationError {
    /// Create an invalid-response error.
    #[must_use]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

impl From<IntegrationError> for IntakeError {
    fn from(err: IntegrationError) -> Self {
        match err {
            IntegrationError::InvalidResponse(msg) => Self::InvalidExtraction(msg),
            other => Self::Upstream(other.to_string()),
        }
    }
}

/// Result alias for integration calls.
pub type Result<T> = std::result::Result<T, IntegrationError>;

/// Turns a non-success response into [`IntegrationError::Api`].
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(IntegrationError::Api {
        service,
        status,
        body,
    })
}
