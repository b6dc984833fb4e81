//! Exponential backoff around single generation calls.
//!
//! Retries cover transient failures of one call. They are independent of the
//! pipeline's refinement iterations, which cover output that parsed but fell
//! short on quality.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use reelsmith_config::Config;
use reelsmith_utils::error::{LlmError, ParseError};

use crate::types::{GenerationBackend, LlmInvocation, LlmResult};

/// Attempt count and backoff base for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            base_delay,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.retry_attempts(), config.retry_base_delay())
    }

    /// Delay before retry `n` (zero-based): `base * 2^n`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(retry))
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The last error is returned.
    async fn run<T, E, Fut>(
        &self,
        stage: &str,
        mut op: impl FnMut() -> Fut,
        is_transient: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        E: std::fmt::Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < attempts && is_transient(&err) => {
                    let delay = self.delay_for(attempt - 1);
                    warn!(
                        stage,
                        attempt,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Generation call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// One free-form call with retries on transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last `LlmError` once attempts run out, or the first
    /// permanent one.
    pub async fn generate(
        &self,
        backend: &dyn GenerationBackend,
        inv: &LlmInvocation,
    ) -> Result<LlmResult, LlmError> {
        self.run(&inv.stage, move || backend.generate(inv), LlmError::is_transient)
            .await
    }

    /// One structured call, parsed with `parse`.
    ///
    /// A parse failure counts as transient: the same call is made again.
    ///
    /// # Errors
    ///
    /// Returns the last attempt's failure, which is a [`ParseError`] when the
    /// final answer did not parse.
    pub async fn generate_structured<T, F>(
        &self,
        backend: &dyn GenerationBackend,
        inv: &LlmInvocation,
        parse: F,
    ) -> Result<T, StructuredCallError>
    where
        T: Send,
        F: Fn(&str) -> Result<T, ParseError> + Sync,
    {
        self.generate_parsed(backend, inv, true, parse).await
    }

    /// One free-form call whose text must pass `check`, retried like
    /// [`RetryPolicy::generate_structured`] but without JSON framing.
    ///
    /// # Errors
    ///
    /// Same as [`RetryPolicy::generate_structured`].
    pub async fn generate_checked<T, F>(
        &self,
        backend: &dyn GenerationBackend,
        inv: &LlmInvocation,
        check: F,
    ) -> Result<T, StructuredCallError>
    where
        T: Send,
        F: Fn(&str) -> Result<T, ParseError> + Sync,
    {
        self.generate_parsed(backend, inv, false, check).await
    }

    async fn generate_parsed<T, F>(
        &self,
        backend: &dyn GenerationBackend,
        inv: &LlmInvocation,
        structured: bool,
        parse: F,
    ) -> Result<T, StructuredCallError>
    where
        T: Send,
        F: Fn(&str) -> Result<T, ParseError> + Sync,
    {
        let parse = &parse;
        self.run(
            &inv.stage,
            move || async move {
                let result = if structured {
                    backend.generate_structured(inv).await?
                } else {
                    backend.generate(inv).await?
                };
                parse(&result.text).map_err(StructuredCallError::from)
            },
            StructuredCallError::is_transient,
        )
        .await
    }
}

/// Failure of a structured call after retries.
#[derive(Debug, Error)]
pub enum StructuredCallError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl StructuredCallError {
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Llm(err) => err.is_transient(),
            Self::Parse(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedBackend;
    use reelsmith_utils::types::ModelClass;

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    fn inv() -> LlmInvocation {
        LlmInvocation::new("content", ModelClass::Fast, "prompt")
    }

    fn parse_number(text: &str) -> Result<u32, ParseError> {
        text.trim().parse().map_err(|_| ParseError {
            message: "not a number".to_string(),
            line: 1,
            column: 1,
            offset: 0,
            snippet: text.chars().take(10).collect(),
        })
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100));
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let backend = ScriptedBackend::new()
            .with_error("content", LlmError::ProviderOutage("503".to_string()))
            .with_error("content", LlmError::Transport("reset".to_string()))
            .with_text("content", "ok");

        let result = policy().generate(&backend, &inv()).await.unwrap();
        assert_eq!(result.text, "ok");
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let backend = ScriptedBackend::new()
            .with_error("content", LlmError::ProviderAuth("401".to_string()))
            .with_text("content", "never used");

        let err = policy().generate(&backend, &inv()).await.unwrap_err();
        assert!(matches!(err, LlmError::ProviderAuth(_)));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_attempts_bound_total_calls() {
        let backend = ScriptedBackend::new();
        for _ in 0..5 {
            backend.push_error("content", LlmError::Timeout { duration: Duration::from_secs(1) });
        }

        let err = policy().generate(&backend, &inv()).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout { .. }));
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_parse_failure_counts_as_transient() {
        let backend = ScriptedBackend::new()
            .with_text("content", "garbage")
            .with_text("content", "42");

        let value = policy()
            .generate_structured(&backend, &inv(), parse_number)
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert!(backend.calls().iter().all(|call| call.structured));
    }

    #[tokio::test]
    async fn test_checked_call_is_free_form() {
        let backend = ScriptedBackend::new()
            .with_text("content", "nope")
            .with_text("content", "7");

        let value = policy()
            .generate_checked(&backend, &inv(), parse_number)
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert!(backend.calls().iter().all(|call| !call.structured));
    }

    #[tokio::test]
    async fn test_last_parse_error_surfaces() {
        let backend = ScriptedBackend::new()
            .with_text("content", "first")
            .with_text("content", "second")
            .with_text("content", "third");

        let err = policy()
            .generate_structured(&backend, &inv(), parse_number)
            .await
            .unwrap_err();
        match err {
            StructuredCallError::Parse(parse) => assert_eq!(parse.snippet, "third"),
            StructuredCallError::Llm(other) => panic!("unexpected: {other}"),
        }
    }
}
