use serde::{Deserialize, Serialize};

use crate::records::{CodeArtifact, ContentRecord, VisualPlan};

/// Logical phase of the pipeline.
///
/// `CodeSkeleton` is the cheap structure-only call of the fast path; it has
/// no [`StageResult`] variant because its text is merged into the visual plan.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageKind {
    Content,
    VisualPlan,
    CodeSkeleton,
    Code,
}

impl StageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Where a stage result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Zero-based refinement iteration.
    pub iteration: u32,
    pub stage: StageKind,
}

/// Output of one stage call, superseded rather than mutated by later iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageResult {
    Content {
        record: ContentRecord,
        iteration: u32,
    },
    VisualPlan {
        record: VisualPlan,
        iteration: u32,
    },
    Code {
        record: CodeArtifact,
        iteration: u32,
    },
}

impl StageResult {
    #[must_use]
    pub const fn kind(&self) -> StageKind {
        match self {
            Self::Content { .. } => StageKind::Content,
            Self::VisualPlan { .. } => StageKind::VisualPlan,
            Self::Code { .. } => StageKind::Code,
        }
    }

    #[must_use]
    pub const fn provenance(&self) -> Provenance {
        let iteration = match self {
            Self::Content { iteration, .. }
            | Self::VisualPlan { iteration, .. }
            | Self::Code { iteration, .. } => *iteration,
        };
        Provenance {
            iteration,
            stage: self.kind(),
        }
    }

    #[must_use]
    pub const fn as_content(&self) -> Option<&ContentRecord> {
        match self {
            Self::Content { record, .. } => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_visual_plan(&self) -> Option<&VisualPlan> {
        match self {
            Self::VisualPlan { record, .. } => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_code(&self) -> Option<&CodeArtifact> {
        match self {
            Self::Code { record, .. } => Some(record),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names_are_snake_case() {
        assert_eq!(StageKind::VisualPlan.as_str(), "visual_plan");
        assert_eq!(StageKind::CodeSkeleton.to_string(), "code_skeleton");
    }

    #[test]
    fn test_provenance_reports_kind_and_iteration() {
        let result = StageResult::Code {
            record: CodeArtifact::new("pass"),
            iteration: 2,
        };
        assert_eq!(
            result.provenance(),
            Provenance {
                iteration: 2,
                stage: StageKind::Code
            }
        );
        assert!(result.as_content().is_none());
        assert_eq!(result.as_code().map(|c| c.source.as_str()), Some("pass"));
    }

    #[test]
    fn test_stage_result_serializes_with_kind_tag() {
        let result = StageResult::Content {
            record: ContentRecord::default(),
            iteration: 0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "content");
    }
}
