use serde::Serialize;

use reelsmith_utils::error::QualityIssue;

/// Numeric summary of what a validation pass looked at.
///
/// Only the fields relevant to the validated kinds are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animations: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_lines: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_chars: Option<usize>,
}

impl ReportMetrics {
    /// Fill unset fields from `other`.
    fn absorb(&mut self, other: Self) {
        self.duration_secs = self.duration_secs.or(other.duration_secs);
        self.sections = self.sections.or(other.sections);
        self.scenes = self.scenes.or(other.scenes);
        self.animations = self.animations.or(other.animations);
        self.code_lines = self.code_lines.or(other.code_lines);
        self.code_chars = self.code_chars.or(other.code_chars);
    }
}

/// Outcome of one validation pass.
///
/// Reports are never merged across iterations; [`ValidationReport::combine`]
/// only joins the per-kind reports of a single pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(serialize_with = "issues_as_strings")]
    pub issues: Vec<QualityIssue>,
    pub metrics: ReportMetrics,
}

impl ValidationReport {
    pub(crate) fn from_issues(issues: Vec<QualityIssue>, metrics: ReportMetrics) -> Self {
        Self {
            valid: issues.is_empty(),
            issues,
            metrics,
        }
    }

    /// Join per-kind reports of the same pass, keeping issue order.
    #[must_use]
    pub fn combine(reports: impl IntoIterator<Item = Self>) -> Self {
        let mut issues = Vec::new();
        let mut metrics = ReportMetrics::default();
        for report in reports {
            issues.extend(report.issues);
            metrics.absorb(report.metrics);
        }
        Self::from_issues(issues, metrics)
    }

    /// Issues rendered as the human-readable strings used in prompts and logs.
    #[must_use]
    pub fn issue_messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

fn issues_as_strings<S: serde::Serializer>(
    issues: &[QualityIssue],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(issues.iter().map(ToString::to_string))
}
