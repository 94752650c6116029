//! Deliverability verification collaborators.

mod http;

use std::future::Future;

pub use http::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpVerifier, MAX_REQUEST_ADDRESSES, VALIDATE_PATH,
    VerifierConfig,
};

use crate::validate::VerifierVerdict;

/// Errors a verifier can report for a whole batch.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service answered with a non-success status.
    #[error("Verification service returned {code}: {detail}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Detail message from the service, or the status reason.
        detail: String,
    },

    /// Response body was not what the service contract promises.
    #[error("Malformed verifier response: {0}")]
    Malformed(String),

    /// Service is not reachable or refused the work.
    #[error("Verifier unavailable: {0}")]
    Unavailable(String),
}

impl VerifyError {
    /// Creates a status error.
    #[must_use]
    pub fn status(code: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            code,
            detail: detail.into(),
        }
    }

    /// Returns true for 401 responses, which retrying will not fix.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { code: 401, .. })
    }
}

/// Asynchronous deliverability check for a batch of normalized addresses.
///
/// Implementations return one verdict per address in any order. Returning
/// an error marks the whole batch as failed.
pub trait Verifier: Send + Sync + 'static {
    /// Verifies a batch.
    fn verify(
        &self,
        batch: Vec<String>,
    ) -> impl Future<Output = Result<Vec<VerifierVerdict>, VerifyError>> + Send;
}
