//! Scripted renderer for tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use reelsmith_utils::error::RenderError;

use crate::renderer::{RenderOutcome, Renderer};

/// Plays back queued outcomes and records the script text seen by each call,
/// so tests can observe patches between attempts.
#[derive(Default)]
pub struct ScriptedRenderer {
    outcomes: Mutex<VecDeque<RenderOutcome>>,
    sources: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ScriptedRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_success(self, artifact: impl Into<PathBuf>) -> Self {
        lock(&self.outcomes).push_back(RenderOutcome::Rendered(artifact.into()));
        self
    }

    #[must_use]
    pub fn with_failure(self, reason: impl Into<String>) -> Self {
        lock(&self.outcomes).push_back(RenderOutcome::Failed(reason.into()));
        self
    }

    /// Script contents at each call, in order. An unreadable script is recorded as empty.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        lock(&self.sources).clone()
    }
}

#[async_trait]
impl Renderer for ScriptedRenderer {
    async fn render(&self, script: &Path) -> Result<RenderOutcome, RenderError> {
        lock(&self.sources).push(std::fs::read_to_string(script).unwrap_or_default());
        Ok(lock(&self.outcomes).pop_front().unwrap_or_else(|| {
            RenderOutcome::Failed("no scripted render outcome left".to_string())
        }))
    }
}
