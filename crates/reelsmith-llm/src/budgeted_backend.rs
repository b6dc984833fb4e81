//! Per-run cap on generation calls
//!
//! The cap counts attempted calls, not successful ones, so retries cannot
//! bypass it.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, warn};

use reelsmith_utils::error::LlmError;

use crate::types::{GenerationBackend, LlmInvocation, LlmResult};

pub struct BudgetedBackend {
    inner: Arc<dyn GenerationBackend>,
    used: AtomicU32,
    limit: u32,
}

impl BudgetedBackend {
    #[must_use]
    pub fn new(inner: Arc<dyn GenerationBackend>, limit: u32) -> Self {
        debug!(limit, provider = inner.provider(), "Creating call budget");
        Self {
            inner,
            used: AtomicU32::new(0),
            limit,
        }
    }

    /// Wrap `inner` when a limit is configured, otherwise hand it back as is.
    #[must_use]
    pub fn wrap(inner: Arc<dyn GenerationBackend>, limit: Option<u32>) -> Arc<dyn GenerationBackend> {
        match limit {
            Some(limit) => Arc::new(Self::new(inner, limit)),
            None => inner,
        }
    }

    #[must_use]
    pub fn call_count(&self) -> u32 {
        self.used.load(Ordering::SeqCst)
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    fn take_slot(&self) -> Result<u32, LlmError> {
        let current = self.used.fetch_add(1, Ordering::SeqCst);
        if current >= self.limit {
            let attempted = current + 1;
            warn!(limit = self.limit, attempted, "Call budget exceeded");
            return Err(LlmError::BudgetExceeded {
                limit: self.limit,
                attempted,
            });
        }
        debug!(call_count = current + 1, limit = self.limit, "Call budget check passed");
        Ok(current + 1)
    }
}

#[async_trait]
impl GenerationBackend for BudgetedBackend {
    fn provider(&self) -> &str {
        self.inner.provider()
    }

    async fn generate(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.take_slot()?;
        self.inner.generate(inv).await
    }

    async fn generate_structured(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.take_slot()?;
        self.inner.generate_structured(inv).await
    }
}
