//! Bounded render-and-repair loop
//!
//! Each failed attempt is classified and the persisted script is patched in
//! place, so the next attempt renders the cumulative patch. No patch follows
//! the final attempt.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use reelsmith_utils::error::RenderError;

use crate::renderer::{RenderOutcome, Renderer};
use crate::rules::{RepairRule, repair};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What one attempt did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderAttempt {
    /// One-based.
    pub attempt: u32,
    pub outcome: AttemptOutcome,
    /// Patch applied after this attempt, `None` after a success or the final failure.
    pub repair: Option<RepairRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Rendered { path: PathBuf },
    Failed { reason: String },
}

/// A successful recovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredRender {
    pub artifact: PathBuf,
    pub attempts: Vec<RenderAttempt>,
}

/// Render `script`, repairing it between failed attempts.
///
/// # Errors
///
/// Returns `RenderError::Exhausted` carrying the last failure reason after
/// `max_attempts` failed renders, and `RenderError::Io` or `RenderError::Spawn`
/// when the script cannot be patched or the renderer cannot run.
pub async fn render_with_recovery(
    renderer: &dyn Renderer,
    script: &Path,
    max_attempts: u32,
) -> Result<RecoveredRender, RenderError> {
    render_with_recovery_observed(renderer, script, max_attempts, &mut |_| {}).await
}

/// [`render_with_recovery`], calling `observer` after every attempt.
///
/// # Errors
///
/// As [`render_with_recovery`].
pub async fn render_with_recovery_observed(
    renderer: &dyn Renderer,
    script: &Path,
    max_attempts: u32,
    observer: &mut (dyn FnMut(&RenderAttempt) + Send),
) -> Result<RecoveredRender, RenderError> {
    let max_attempts = max_attempts.max(1);
    let mut attempts = Vec::new();

    for attempt in 1..=max_attempts {
        info!(attempt, max_attempts, script = %script.display(), "Rendering");

        let reason = match renderer.render(script).await? {
            RenderOutcome::Rendered(path) => {
                info!(attempt, artifact = %path.display(), "Render succeeded");
                let record = RenderAttempt {
                    attempt,
                    outcome: AttemptOutcome::Rendered { path: path.clone() },
                    repair: None,
                };
                observer(&record);
                attempts.push(record);
                return Ok(RecoveredRender {
                    artifact: path,
                    attempts,
                });
            }
            RenderOutcome::Failed(reason) => reason,
        };

        warn!(attempt, max_attempts, reason = %last_line(&reason), "Render attempt failed");

        let rule = if attempt < max_attempts {
            let rule = patch_script(script, &reason)?;
            info!(attempt, rule = %rule, "Applied repair rule");
            Some(rule)
        } else {
            None
        };

        let record = RenderAttempt {
            attempt,
            outcome: AttemptOutcome::Failed { reason },
            repair: rule,
        };
        observer(&record);
        attempts.push(record);
    }

    let last_reason = attempts
        .last()
        .and_then(|record| match &record.outcome {
            AttemptOutcome::Failed { reason } => Some(reason.clone()),
            AttemptOutcome::Rendered { .. } => None,
        })
        .unwrap_or_default();

    Err(RenderError::Exhausted {
        attempts: max_attempts,
        last_reason,
    })
}

/// Rewrite the persisted script with the rule chosen for `reason`.
fn patch_script(script: &Path, reason: &str) -> Result<RepairRule, RenderError> {
    let source = std::fs::read_to_string(script).map_err(|source| RenderError::Io {
        path: script.to_path_buf(),
        source,
    })?;

    let (rule, patched) = repair(reason, &source);
    if patched != source {
        std::fs::write(script, patched).map_err(|source| RenderError::Io {
            path: script.to_path_buf(),
            source,
        })?;
    }
    Ok(rule)
}

/// Tracebacks end with the actual error line.
fn last_line(reason: &str) -> &str {
    reason
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(reason)
}
