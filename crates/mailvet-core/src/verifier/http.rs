//! HTTP client for the backend's bulk validation endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Verifier, VerifyError};
use crate::validate::VerifierVerdict;

/// Default backend location.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Path of the bulk validation endpoint.
pub const VALIDATE_PATH: &str = "/email/validate";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Most addresses the backend accepts in one request.
pub const MAX_REQUEST_ADDRESSES: usize = 1000;

/// Configuration for the HTTP verifier.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Backend base URL, without trailing slash.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl VerifierConfig {
    /// Creates a configuration for the given backend.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the validation endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{VALIDATE_PATH}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    emails: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    results: Vec<VerifierVerdict>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Verifier that posts batches to `POST {base_url}/email/validate`.
#[derive(Debug, Clone)]
pub struct HttpVerifier {
    config: VerifierConfig,
    http_client: Client,
}

impl HttpVerifier {
    /// Creates a verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: VerifierConfig) -> Result<Self, VerifyError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }
}

impl Verifier for HttpVerifier {
    async fn verify(&self, batch: Vec<String>) -> Result<Vec<VerifierVerdict>, VerifyError> {
        if batch.len() > MAX_REQUEST_ADDRESSES {
            return Err(VerifyError::Unavailable(format!(
                "batch of {} exceeds the {MAX_REQUEST_ADDRESSES} address limit",
                batch.len()
            )));
        }

        let mut request = self
            .http_client
            .post(self.config.endpoint())
            .json(&ValidateRequest { emails: &batch });
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string();
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or(fallback);
            return Err(VerifyError::status(status.as_u16(), detail));
        }

        let body: ValidateResponse = response
            .json()
            .await
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;
        debug!(
            "Verifier answered {} of {} addresses",
            body.results.len(),
            batch.len()
        );
        Ok(body.results)
    }
}
