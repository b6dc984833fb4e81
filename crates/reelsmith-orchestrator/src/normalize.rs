//! Stage output parsing and content normalisation.

use serde_json::Value;
use tracing::debug;

use reelsmith_extraction::{ExtractionError, ParseError, extract_source, parse_structured};
use reelsmith_model::{CodeArtifact, ContentRecord, VisualPlan};

const REQUIRED_CONTENT_FIELDS: [&str; 2] = ["title", "sections"];

/// Default section length bounds, in seconds.
const MIN_DEFAULT_SECTION_SECS: f64 = 15.0;
const MAX_DEFAULT_SECTION_SECS: f64 = 45.0;

/// Parse a Content answer, keeping the durations exactly as declared.
///
/// # Errors
///
/// Returns [`ParseError`] when the text cannot be recovered or lacks `title`
/// or `sections`.
pub fn parse_content(raw: &str) -> Result<ContentRecord, ParseError> {
    let value = parse_structured(raw)?;
    if let Some(missing) = REQUIRED_CONTENT_FIELDS
        .iter()
        .find(|field| value.get(**field).is_none())
    {
        return Err(shape_error(format!("missing required field '{missing}'"), &value));
    }

    serde_json::from_value(value.clone())
        .map_err(|err| shape_error(format!("content does not match the expected shape: {err}"), &value))
}

/// # Errors
///
/// Returns [`ParseError`] when the text cannot be recovered into a plan.
pub fn parse_visual_plan(raw: &str) -> Result<VisualPlan, ParseError> {
    reelsmith_extraction::parse_record(raw)
}

/// # Errors
///
/// Returns [`ParseError`] when the answer holds no scene class.
pub fn parse_code(raw: &str) -> Result<CodeArtifact, ParseError> {
    extract_source(raw)
        .map(CodeArtifact::new)
        .map_err(|err| extraction_error(&err, raw))
}

/// Fill missing section durations, pull the sum back inside the tolerance
/// band around `target_secs`, and record it as `total_duration`.
///
/// Sections are never invented; a record without sections is left alone.
/// Only content that already passed the content gate is normalised.
pub fn normalize_content(content: &mut ContentRecord, target_secs: f64, minutes: u32) {
    let count = content.sections.len();
    if count == 0 {
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let default_secs = (target_secs / count as f64)
        .floor()
        .clamp(MIN_DEFAULT_SECTION_SECS, MAX_DEFAULT_SECTION_SECS);
    for section in &mut content.sections {
        section.duration.get_or_insert(default_secs);
    }

    let tolerance = if minutes <= 3 { 0.10 } else { 0.05 };
    let sum = content.section_duration_sum();
    let low = (target_secs * (1.0 - tolerance)).floor();
    let high = (target_secs * (1.0 + tolerance)).floor();

    if sum > 0.0 && (sum < low || sum > high) {
        let scale = target_secs / sum;
        debug!(sum, target_secs, scale, "Rescaling section durations");
        for section in &mut content.sections {
            section.duration = section.duration.map(|d| (d * scale).floor());
        }
    }

    content.total_duration = Some(content.section_duration_sum());
}

fn shape_error(message: String, value: &Value) -> ParseError {
    ParseError {
        message,
        line: 1,
        column: 1,
        offset: 0,
        snippet: value.to_string().chars().take(100).collect(),
    }
}

fn extraction_error(err: &ExtractionError, raw: &str) -> ParseError {
    ParseError {
        message: err.to_string(),
        line: 1,
        column: 1,
        offset: 0,
        snippet: raw.trim().chars().take(100).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_model::Section;

    fn section(duration: Option<f64>) -> Section {
        Section {
            name: "s".to_string(),
            duration,
            ..Section::default()
        }
    }

    #[test]
    fn test_missing_sections_is_parse_error() {
        let err = parse_content(r#"{"title": "Limits"}"#).unwrap_err();
        assert!(err.message.contains("'sections'"));
    }

    #[test]
    fn test_missing_title_is_parse_error() {
        let err = parse_content(r#"{"sections": []}"#).unwrap_err();
        assert!(err.message.contains("'title'"));
    }

    #[test]
    fn test_missing_durations_are_clamped_defaults() {
        let mut content = ContentRecord {
            sections: vec![section(None), section(None)],
            ..ContentRecord::default()
        };
        normalize_content(&mut content, 60.0, 1);
        assert_eq!(content.sections[0].duration, Some(30.0));
        assert_eq!(content.total_duration, Some(60.0));

        let mut long = ContentRecord {
            sections: vec![section(None); 2],
            ..ContentRecord::default()
        };
        // 300 / 2 clamps to 45, then the short sum is scaled to the target.
        normalize_content(&mut long, 300.0, 5);
        assert_eq!(long.sections[0].duration, Some(150.0));
        assert_eq!(long.total_duration, Some(300.0));
    }

    #[test]
    fn test_sum_inside_tolerance_is_kept() {
        let mut content = ContentRecord {
            sections: vec![section(Some(100.0)), section(Some(70.0))],
            ..ContentRecord::default()
        };
        normalize_content(&mut content, 180.0, 3);
        assert_eq!(content.sections[0].duration, Some(100.0));
        assert_eq!(content.total_duration, Some(170.0));
    }

    #[test]
    fn test_sum_outside_tolerance_is_rescaled() {
        let mut content = ContentRecord {
            sections: vec![section(Some(10.0)), section(Some(20.0))],
            ..ContentRecord::default()
        };
        normalize_content(&mut content, 60.0, 1);
        assert_eq!(content.sections[0].duration, Some(20.0));
        assert_eq!(content.sections[1].duration, Some(40.0));
        assert_eq!(content.total_duration, Some(60.0));
    }

    #[test]
    fn test_parsed_durations_are_kept_as_declared() {
        let raw = r#"{"title": "Limits", "sections": [{"name": "a", "duration": 20}, {"name": "b"}]}"#;
        let content = parse_content(raw).unwrap();
        assert_eq!(content.sections[0].duration, Some(20.0));
        assert_eq!(content.sections[1].duration, None);
        assert!(content.total_duration.is_none());
    }

    #[test]
    fn test_empty_sections_are_left_alone() {
        let mut content = ContentRecord::default();
        normalize_content(&mut content, 60.0, 1);
        assert!(content.total_duration.is_none());
    }

    #[test]
    fn test_code_without_scene_is_parse_error() {
        let err = parse_code("print('hello')").unwrap_err();
        assert!(err.message.contains("missing required element"));
        assert!(parse_code("```python\nclass A(Scene):\n    def construct(self):\n        pass\n```").is_ok());
    }
}
