//! Shared HTTP plumbing for provider backends
//!
//! One `reqwest::Client` per backend, reused across calls. This layer makes a
//! single attempt and classifies the outcome; retries belong to
//! [`RetryPolicy`](crate::RetryPolicy) so that one knob bounds every call.

use regex::Regex;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use reelsmith_utils::error::LlmError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the client cannot be constructed
    pub fn new() -> Result<Self, LlmError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| LlmError::Misconfiguration(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send one request and map failure statuses onto `LlmError`.
    ///
    /// # Errors
    ///
    /// - `ProviderAuth` for 401/403
    /// - `ProviderQuota` for 429
    /// - `ProviderOutage` for 5xx
    /// - `Timeout` when the deadline passes
    /// - `Transport` for anything else, with credentials redacted
    pub async fn execute(
        &self,
        request: RequestBuilder,
        timeout: Duration,
        provider: &str,
    ) -> Result<Response, LlmError> {
        debug!(provider, timeout_secs = timeout.as_secs(), "Sending HTTP request");

        let response = request.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout { duration: timeout }
            } else {
                LlmError::Transport(format!(
                    "{provider} request failed: {}",
                    redact_error_message(&e.to_string())
                ))
            }
        })?;

        let status = response.status();
        if status.is_client_error() {
            return Err(map_client_error(status, provider));
        }
        if status.is_server_error() {
            return Err(LlmError::ProviderOutage(format!(
                "{provider} returned server error: {status}"
            )));
        }
        Ok(response)
    }
}

fn map_client_error(status: StatusCode, provider: &str) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            LlmError::ProviderAuth(format!("{provider} authentication failed: {status}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            LlmError::ProviderQuota(format!("{provider} rate limit exceeded: {status}"))
        }
        _ => LlmError::Transport(format!("{provider} returned client error: {status}")),
    }
}

static URL_WITH_CREDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(https?://)[^:@\s]+:[^@\s]+@").expect("credential URL regex is valid")
});

/// 32+ character runs of key-like characters.
static POTENTIAL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_-]{32,}").expect("key regex is valid")
});

/// Strip URL credentials and key-like tokens before a message is logged or surfaced.
pub fn redact_error_message(message: &str) -> String {
    let redacted = URL_WITH_CREDS.replace_all(message, "$1[REDACTED]@");
    POTENTIAL_KEY.replace_all(&redacted, "[REDACTED]").into_owned()
}
