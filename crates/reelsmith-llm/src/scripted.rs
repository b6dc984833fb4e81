//! Scripted generation backend for tests.
//!
//! Responses are queued per stage label so concurrent stages stay
//! deterministic. Every call is recorded, and the peak number of calls in
//! flight is tracked so tests can observe the concurrent fast path.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reelsmith_utils::error::LlmError;
use reelsmith_utils::types::ModelClass;

use crate::types::{GenerationBackend, LlmInvocation, LlmResult};

/// One call as the backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub stage: String,
    pub model_class: ModelClass,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub structured: bool,
}

#[derive(Default)]
pub struct ScriptedBackend {
    queues: Mutex<HashMap<String, VecDeque<Result<String, LlmError>>>>,
    repeat: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(self, stage: &str, text: impl Into<String>) -> Self {
        self.push_text(stage, text);
        self
    }

    #[must_use]
    pub fn with_error(self, stage: &str, error: LlmError) -> Self {
        self.push_error(stage, error);
        self
    }

    /// Answer every call for `stage` with `text` once its queue is empty.
    #[must_use]
    pub fn with_repeat(self, stage: &str, text: impl Into<String>) -> Self {
        lock(&self.repeat).insert(stage.to_string(), text.into());
        self
    }

    /// Sleep this long inside every call.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push_text(&self, stage: &str, text: impl Into<String>) {
        self.push(stage, Ok(text.into()));
    }

    pub fn push_error(&self, stage: &str, error: LlmError) {
        self.push(stage, Err(error));
    }

    fn push(&self, stage: &str, response: Result<String, LlmError>) {
        lock(&self.queues)
            .entry(stage.to_string())
            .or_default()
            .push_back(response);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    #[must_use]
    pub fn calls_for(&self, stage: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.stage == stage)
            .cloned()
            .collect()
    }

    /// Highest number of calls that were running at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(&self, inv: &LlmInvocation, structured: bool) -> Result<LlmResult, LlmError> {
        lock(&self.calls).push(RecordedCall {
            stage: inv.stage.clone(),
            model_class: inv.model_class,
            system: inv.system_prompt().to_string(),
            prompt: inv.prompt.clone(),
            temperature: inv.temperature,
            max_tokens: inv.max_tokens,
            structured,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let queued = lock(&self.queues)
            .get_mut(&inv.stage)
            .and_then(VecDeque::pop_front);
        let response = match queued {
            Some(response) => response,
            None => lock(&self.repeat).get(&inv.stage).cloned().ok_or_else(|| {
                LlmError::Unsupported(format!("no scripted response left for stage '{}'", inv.stage))
            }),
        };

        response.map(|text| LlmResult::new(text, "scripted", inv.model_class.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.answer(inv, false).await
    }

    /// Records the caller's prompt, not the JSON reframing.
    async fn generate_structured(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.answer(inv, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queues_are_per_stage_then_repeat() {
        let backend = ScriptedBackend::new()
            .with_text("content", "first")
            .with_text("code", "scene")
            .with_repeat("content", "again");
        let content = LlmInvocation::new("content", ModelClass::Fast, "p");
        let code = LlmInvocation::new("code", ModelClass::Fast, "p");

        assert_eq!(backend.generate(&code).await.unwrap().text, "scene");
        assert_eq!(backend.generate(&content).await.unwrap().text, "first");
        assert_eq!(backend.generate(&content).await.unwrap().text, "again");
        assert!(matches!(
            backend.generate(&code).await,
            Err(LlmError::Unsupported(_))
        ));
        assert_eq!(backend.calls_for("content").len(), 2);
    }

    #[tokio::test]
    async fn test_concurrency_is_observed() {
        let backend = ScriptedBackend::new()
            .with_latency(Duration::from_millis(20))
            .with_repeat("a", "x")
            .with_repeat("b", "y");
        let a = LlmInvocation::new("a", ModelClass::Fast, "p");
        let b = LlmInvocation::new("b", ModelClass::Fast, "p");

        let (left, right) = tokio::join!(backend.generate(&a), backend.generate(&b));
        assert!(left.is_ok() && right.is_ok());
        assert_eq!(backend.max_in_flight(), 2);
    }
}
