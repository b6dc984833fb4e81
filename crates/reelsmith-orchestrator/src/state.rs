//! Run-scoped pipeline state.

use std::collections::HashMap;

use reelsmith_model::{CodeArtifact, ContentRecord, StageKind, StageResult, VisualPlan};
use reelsmith_validation::ValidationReport;

/// Everything one run has produced so far.
///
/// Owned by a single [`Orchestrator::run`](crate::Orchestrator::run) call and
/// dropped when it returns; it is never shared between runs.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub run_id: String,
    /// Zero-based refinement iteration.
    pub iteration: u32,
    latest: HashMap<StageKind, StageResult>,
    /// Fast-path skeleton text of the current iteration.
    pub skeleton: Option<String>,
    /// Refinement directives in the order they were issued.
    pub directives: Vec<String>,
    pub last_report: Option<ValidationReport>,
}

impl PipelineState {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            iteration: 0,
            latest: HashMap::new(),
            skeleton: None,
            directives: Vec::new(),
            last_report: None,
        }
    }

    /// Store `result`, superseding the previous one of the same kind.
    pub fn record(&mut self, result: StageResult) {
        self.latest.insert(result.kind(), result);
    }

    #[must_use]
    pub fn latest(&self, kind: StageKind) -> Option<&StageResult> {
        self.latest.get(&kind)
    }

    #[must_use]
    pub fn content(&self) -> Option<&ContentRecord> {
        self.latest(StageKind::Content).and_then(StageResult::as_content)
    }

    #[must_use]
    pub fn visual_plan(&self) -> Option<&VisualPlan> {
        self.latest(StageKind::VisualPlan)
            .and_then(StageResult::as_visual_plan)
    }

    #[must_use]
    pub fn code(&self) -> Option<&CodeArtifact> {
        self.latest(StageKind::Code).and_then(StageResult::as_code)
    }

    /// Directive for the next Content call, if any was issued.
    #[must_use]
    pub fn current_directive(&self) -> Option<&str> {
        self.directives.last().map(String::as_str)
    }

    /// Move to the next iteration. The skeleton belongs to the old one.
    pub fn advance(&mut self) {
        self.iteration += 1;
        self.skeleton = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_results_supersede_earlier_ones() {
        let mut state = PipelineState::new("run");
        state.record(StageResult::Code {
            record: CodeArtifact::new("first"),
            iteration: 0,
        });
        state.record(StageResult::Code {
            record: CodeArtifact::new("second"),
            iteration: 1,
        });

        assert_eq!(state.code().map(|c| c.source.as_str()), Some("second"));
        assert_eq!(
            state.latest(StageKind::Code).map(|r| r.provenance().iteration),
            Some(1)
        );
        assert!(state.content().is_none());
    }

    #[test]
    fn test_advance_drops_skeleton_and_keeps_directives() {
        let mut state = PipelineState::new("run");
        state.skeleton = Some("class A(Scene): ...".to_string());
        state.directives.push("expand".to_string());
        state.advance();

        assert_eq!(state.iteration, 1);
        assert!(state.skeleton.is_none());
        assert_eq!(state.current_directive(), Some("expand"));
    }
}
