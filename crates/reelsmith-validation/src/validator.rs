use tracing::warn;

use reelsmith_budget::DurationProfile;
use reelsmith_model::{CodeArtifact, ContentRecord, StageResult, VisualPlan};
use reelsmith_utils::error::QualityIssue;

use crate::report::{ReportMetrics, ValidationReport};

/// Minimum trimmed length of generated scene source.
pub const MIN_CODE_CHARS: usize = 100;

/// Operation vocabulary a scene must show. Each entry is satisfied by any of
/// its alternatives and reported under its label.
const REQUIRED_CONSTRUCTS: &[(&str, &[&str])] = &[
    ("def construct", &["def construct"]),
    ("self.play", &["self.play"]),
    ("self.wait", &["self.wait"]),
    ("Create/Write", &["Create", "Write", "DrawBorderThenFill", "FadeIn"]),
    ("Transform", &["Transform"]),
];

/// Checks stage output against the thresholds of one duration bucket.
///
/// Never fails: missing data shows up as issues in the report.
#[derive(Debug, Clone)]
pub struct QualityValidator {
    profile: DurationProfile,
}

impl QualityValidator {
    #[must_use]
    pub fn for_minutes(minutes: u32) -> Self {
        Self::new(DurationProfile::for_minutes(minutes))
    }

    #[must_use]
    pub const fn new(profile: DurationProfile) -> Self {
        Self { profile }
    }

    #[must_use]
    pub const fn profile(&self) -> &DurationProfile {
        &self.profile
    }

    /// Validate any stage result.
    #[must_use]
    pub fn validate(&self, result: &StageResult) -> ValidationReport {
        match result {
            StageResult::Content { record, .. } => self.validate_content(record),
            StageResult::VisualPlan { record, .. } => self.validate_visual_plan(record),
            StageResult::Code { record, .. } => self.validate_code(record),
        }
    }

    /// Duration, section count, section depth and examples.
    ///
    /// The duration checked is the sum of section durations when sections
    /// declare any, else the record's declared total.
    #[must_use]
    pub fn validate_content(&self, content: &ContentRecord) -> ValidationReport {
        let profile = &self.profile;
        let mut issues = Vec::new();

        let actual_secs = if content.sections.iter().any(|s| s.duration.is_some()) {
            content.section_duration_sum()
        } else {
            content.total_duration.unwrap_or(0.0)
        };
        if actual_secs < profile.min_total_secs {
            issues.push(QualityIssue::DurationBelowMinimum {
                actual_secs,
                required_secs: profile.min_total_secs,
            });
        }

        if content.sections.len() < profile.min_sections {
            issues.push(QualityIssue::TooFewSections {
                actual: content.sections.len(),
                required: profile.min_sections,
            });
        }

        for (index, section) in content.sections.iter().enumerate() {
            let chars = section.content_chars();
            if chars < profile.min_section_chars {
                issues.push(QualityIssue::SectionTooShort {
                    index,
                    chars,
                    required: profile.min_section_chars,
                });
            }
            if section.examples.is_empty() {
                issues.push(QualityIssue::SectionLacksExamples { index });
            }
        }

        let metrics = ReportMetrics {
            duration_secs: Some(actual_secs),
            sections: Some(content.sections.len()),
            ..ReportMetrics::default()
        };
        self.finish("content", issues, metrics)
    }

    /// Scene count and per-scene animation density.
    #[must_use]
    pub fn validate_visual_plan(&self, plan: &VisualPlan) -> ValidationReport {
        let profile = &self.profile;
        let mut issues = Vec::new();

        if plan.scenes.len() < profile.min_sections {
            issues.push(QualityIssue::TooFewScenes {
                actual: plan.scenes.len(),
                required: profile.min_sections,
            });
        }

        for (index, scene) in plan.scenes.iter().enumerate() {
            if scene.animations.len() < profile.min_animations_per_section {
                issues.push(QualityIssue::SceneTooFewAnimations {
                    index,
                    actual: scene.animations.len(),
                    required: profile.min_animations_per_section,
                });
            }
        }

        let metrics = ReportMetrics {
            scenes: Some(plan.scenes.len()),
            animations: Some(plan.total_animations()),
            ..ReportMetrics::default()
        };
        self.finish("visual_plan", issues, metrics)
    }

    /// Length and required operation vocabulary. Each missing construct is
    /// its own issue.
    #[must_use]
    pub fn validate_code(&self, code: &CodeArtifact) -> ValidationReport {
        let mut issues = Vec::new();
        let chars = code.trimmed_len();

        if chars < MIN_CODE_CHARS {
            issues.push(QualityIssue::CodeTooShort {
                actual: chars,
                required: MIN_CODE_CHARS,
            });
        }

        for (label, alternatives) in REQUIRED_CONSTRUCTS {
            if !alternatives.iter().any(|token| code.source.contains(token)) {
                issues.push(QualityIssue::MissingConstruct {
                    construct: (*label).to_string(),
                });
            }
        }

        let metrics = ReportMetrics {
            code_lines: Some(code.line_count()),
            code_chars: Some(chars),
            ..ReportMetrics::default()
        };
        self.finish("code", issues, metrics)
    }

    /// One report over content, plan and code of the same pass.
    #[must_use]
    pub fn validate_all(
        &self,
        content: &ContentRecord,
        plan: &VisualPlan,
        code: &CodeArtifact,
    ) -> ValidationReport {
        ValidationReport::combine([
            self.validate_content(content),
            self.validate_visual_plan(plan),
            self.validate_code(code),
        ])
    }

    fn finish(
        &self,
        kind: &str,
        issues: Vec<QualityIssue>,
        metrics: ReportMetrics,
    ) -> ValidationReport {
        for issue in &issues {
            warn!(kind, minutes = self.profile.minutes, %issue, "Quality issue");
        }
        ValidationReport::from_issues(issues, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content(sections: usize, duration: f64, chars: usize) -> ContentRecord {
        let sections: Vec<_> = (0..sections)
            .map(|i| {
                json!({
                    "name": format!("Part {i}"),
                    "content": "x".repeat(chars),
                    "examples": ["an example"],
                    "duration": duration,
                })
            })
            .collect();
        serde_json::from_value(json!({ "title": "Limits", "sections": sections })).unwrap()
    }

    fn plan(scenes: usize, animations: usize) -> VisualPlan {
        let scenes: Vec<_> = (0..scenes)
            .map(|i| json!({ "scene_number": i + 1, "animations": vec!["Write"; animations] }))
            .collect();
        serde_json::from_value(json!({ "scenes": scenes })).unwrap()
    }

    const GOOD_CODE: &str = "from manim import *\n\nclass Demo(Scene):\n    def construct(self):\n        title = Text(\"Limits\")\n        self.play(Write(title))\n        self.play(Transform(title, Text(\"Done\")))\n        self.wait(1)\n";

    #[test]
    fn test_one_minute_two_sections_pass() {
        let validator = QualityValidator::for_minutes(1);
        let report = validator.validate_content(&content(2, 25.0, 300));
        assert!(report.valid, "{:?}", report.issues);
        assert_eq!(report.metrics.sections, Some(2));
        assert_eq!(report.metrics.duration_secs, Some(50.0));
    }

    #[test]
    fn test_short_duration_mentions_actual_and_required() {
        let validator = QualityValidator::for_minutes(1);
        let report = validator.validate_content(&content(2, 10.0, 300));
        assert!(!report.valid);
        let messages = report.issue_messages();
        assert!(messages.iter().any(|m| m.contains("20s") && m.contains("50s")));
    }

    #[test]
    fn test_section_depth_and_examples() {
        let validator = QualityValidator::for_minutes(1);
        let mut record = content(2, 25.0, 299);
        record.sections[1].examples.clear();
        let report = validator.validate_content(&record);

        assert_eq!(
            report.issues,
            vec![
                QualityIssue::SectionTooShort { index: 0, chars: 299, required: 300 },
                QualityIssue::SectionTooShort { index: 1, chars: 299, required: 300 },
                QualityIssue::SectionLacksExamples { index: 1 },
            ]
        );
    }

    #[test]
    fn test_empty_content_is_reported_not_raised() {
        let validator = QualityValidator::for_minutes(3);
        let report = validator.validate_content(&ContentRecord::default());
        assert!(!report.valid);
        assert!(report.issues.contains(&QualityIssue::TooFewSections { actual: 0, required: 3 }));
    }

    #[test]
    fn test_declared_total_used_without_section_durations() {
        let validator = QualityValidator::for_minutes(1);
        let mut record = content(2, 0.0, 300);
        for section in &mut record.sections {
            section.duration = None;
        }
        record.total_duration = Some(60.0);
        assert!(validator.validate_content(&record).valid);
    }

    #[test]
    fn test_visual_plan_density() {
        let validator = QualityValidator::for_minutes(3);
        assert!(validator.validate_visual_plan(&plan(3, 3)).valid);

        let report = validator.validate_visual_plan(&plan(2, 2));
        assert_eq!(report.issues[0], QualityIssue::TooFewScenes { actual: 2, required: 3 });
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.metrics.animations, Some(4));
    }

    #[test]
    fn test_code_vocabulary_issues_are_distinct() {
        let validator = QualityValidator::for_minutes(1);
        assert!(validator.validate_code(&CodeArtifact::new(GOOD_CODE)).valid);

        let report = validator.validate_code(&CodeArtifact::new(GOOD_CODE.replace("self.wait(1)", "")));
        assert_eq!(
            report.issues,
            vec![QualityIssue::MissingConstruct { construct: "self.wait".to_string() }]
        );
    }

    #[test]
    fn test_empty_code() {
        let validator = QualityValidator::for_minutes(1);
        let report = validator.validate_code(&CodeArtifact::default());
        assert_eq!(report.issues[0], QualityIssue::CodeTooShort { actual: 0, required: MIN_CODE_CHARS });
        assert_eq!(report.issues.len(), 1 + REQUIRED_CONSTRUCTS.len());
    }

    #[test]
    fn test_combined_report_keeps_order_and_metrics() {
        let validator = QualityValidator::for_minutes(1);
        let report = validator.validate_all(
            &content(2, 25.0, 300),
            &plan(1, 1),
            &CodeArtifact::new(GOOD_CODE),
        );
        assert!(!report.valid);
        assert_eq!(report.issues, vec![QualityIssue::TooFewScenes { actual: 1, required: 2 }]);
        assert_eq!(report.metrics.sections, Some(2));
        assert_eq!(report.metrics.scenes, Some(1));
        assert!(report.metrics.code_lines.is_some());
    }

    #[test]
    fn test_dispatch_by_stage_result() {
        let validator = QualityValidator::for_minutes(1);
        let result = StageResult::Code {
            record: CodeArtifact::new(GOOD_CODE),
            iteration: 0,
        };
        assert!(validator.validate(&result).valid);
    }
}
