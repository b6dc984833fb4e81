//! Stage prompt builders.
//!
//! Wording is free to change; what the pipeline relies on is that every
//! prompt carries the topic brief and the duration targets of the run.

use serde_json::json;

use reelsmith_budget::{DurationProfile, StageRequirements};
use reelsmith_model::{ContentRecord, VisualPlan};
use reelsmith_validation::ValidationReport;

/// Longest request framed as a compact brief rather than the full template.
const COMPACT_BRIEF_MAX_MINUTES: u32 = 5;

pub const SKELETON_SYSTEM: &str = "Generate minimal code structure only. Be extremely concise.";

pub const CONTENT_SCHEMA: &str = r#"{
  "title": "string",
  "total_duration": "number, seconds",
  "sections": [
    {
      "name": "string",
      "content": "string, several paragraphs",
      "visual_elements": "string",
      "formulas": ["string"],
      "examples": ["string"],
      "duration": "number, seconds"
    }
  ],
  "key_concepts": ["string"],
  "visual_opportunities": ["string"]
}"#;

pub const VISUAL_SCHEMA: &str = r#"{
  "title": "string",
  "scenes": [
    {
      "scene_number": "integer",
      "description": "string",
      "duration": "number, seconds",
      "manim_objects": [{"type": "string", "description": "string"}],
      "animations": [{"type": "string", "target": "string", "duration": "number"}]
    }
  ],
  "color_scheme": {"primary": "string", "secondary": "string", "accent": "string"}
}"#;

/// Frame the user's topic as the brief every stage works from.
#[must_use]
pub fn meta_prompt(topic: &str, profile: &DurationProfile) -> String {
    let minutes = profile.minutes;
    let seconds = profile.duration_secs();

    if minutes <= COMPACT_BRIEF_MAX_MINUTES {
        return format!(
            "Create a {minutes}-minute educational video about: {topic}\n\n\
             Key requirements:\n\
             - Duration: {minutes} minutes ({seconds} seconds)\n\
             - Style: {style}\n\
             - Include: core concepts, visual examples, smooth animations\n\
             - Quality: professional educational content",
            style = profile.style,
        );
    }

    format!(
        "## GOAL\n\
         Create a {minutes}-minute educational video.\n\n\
         ## CONTENT STRUCTURE\n\
         1. Hook ({hook} seconds): an engaging opening question\n\
         2. Main content ({sections} sections of {section} seconds): {detail}\n\
         3. Summary ({summary} seconds): key insights\n\n\
         ## VISUAL REQUIREMENTS\n\
         - {animations} animations\n\
         - {complexity} visual complexity\n\
         - Clear storytelling\n\n\
         Original request: {topic}",
        hook = profile.hook_secs,
        sections = profile.min_sections,
        section = profile.section_secs,
        detail = profile.detail_level,
        summary = profile.summary_secs,
        animations = profile.target_animations(),
        complexity = profile.complexity,
    )
}

#[must_use]
pub fn content_system(profile: &DurationProfile) -> String {
    format!(
        "You are an educator writing the outline of a {minutes}-minute explainer video.\n\
         Content must be {style}, with {detail}.\n\
         Pacing: {pacing}. Depth: {complexity}.",
        minutes = profile.minutes,
        style = profile.style,
        detail = profile.detail_level,
        pacing = profile.pacing,
        complexity = profile.complexity,
    )
}

/// Content stage prompt. `directive` is the refinement text built from the
/// previous iteration, absent on the first.
#[must_use]
pub fn content_prompt(
    brief: &str,
    context: Option<&str>,
    profile: &DurationProfile,
    requirements: &StageRequirements,
    directive: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{brief}\n\n\
         REQUIREMENTS:\n\
         1. Video duration: {seconds} seconds\n\
         2. At least {sections} sections, each {section} seconds\n\
         3. Hook: {hook} seconds, summary: {summary} seconds\n\
         4. Every section: at least {chars} characters of explanation and at least one concrete example\n\
         5. At least {concepts} key concepts and {visuals} visual opportunities\n\
         6. Section durations must add up to the video duration",
        seconds = requirements.duration_secs,
        sections = profile.min_sections,
        section = profile.section_secs,
        hook = profile.hook_secs,
        summary = profile.summary_secs,
        chars = profile.min_section_chars,
        concepts = requirements.concepts,
        visuals = requirements.visuals,
    );
    push_block(&mut prompt, context);
    push_block(&mut prompt, directive);
    prompt
}

#[must_use]
pub fn visual_system(profile: &DurationProfile) -> String {
    format!(
        "You are a visual designer planning animations for a {minutes}-minute educational video.\n\
         Every concept is shown, not told. Use {complexity} visual complexity.",
        minutes = profile.minutes,
        complexity = profile.complexity,
    )
}

#[must_use]
pub fn visual_prompt(
    brief: &str,
    content: &ContentRecord,
    profile: &DurationProfile,
    requirements: &StageRequirements,
) -> String {
    let outline: Vec<_> = content
        .sections
        .iter()
        .map(|section| {
            json!({
                "name": section.name,
                "duration": section.duration,
                "visual_elements": section.visual_elements,
            })
        })
        .collect();

    format!(
        "Design the visual plan for this request:\n{brief}\n\n\
         Title: {title}\n\
         Sections:\n{outline}\n\n\
         REQUIREMENTS:\n\
         - At least {scenes} scenes, one per section\n\
         - At least {per_scene} animations per scene, {total} in total\n\
         - Scene durations add up to {seconds} seconds",
        title = content.title,
        outline = serde_json::to_string_pretty(&outline).unwrap_or_default(),
        scenes = profile.min_sections.max(requirements.scenes as usize),
        per_scene = profile.min_animations_per_section,
        total = profile.min_total_animations.max(requirements.animations as usize),
        seconds = requirements.duration_secs,
    )
}

/// Prompt for the cheap structure-only call of the fast path.
#[must_use]
pub fn skeleton_prompt(brief: &str, content: &ContentRecord) -> String {
    format!(
        "Create a MINIMAL Manim scene structure for: {brief}\n\n\
         Based on these content sections: {sections:?}\n\n\
         Generate only the class definition, one method stub per section and a \
         construct() outline with comments. Keep it under 50 lines.",
        sections = content.section_names(),
    )
}

#[must_use]
pub fn code_system(profile: &DurationProfile) -> String {
    format!(
        "You are a Manim expert writing a {minutes}-minute educational animation.\n\
         Use the modern Manim API: Create instead of ShowCreation, Indicate instead of \
         CircleIndicate, Wiggle instead of WiggleOutThenIn.\n\
         Build concepts progressively and use self.wait() so the video runs its full length.\n\
         Reply with one Python file in a ```python fence.",
        minutes = profile.minutes,
    )
}

#[must_use]
pub fn code_prompt(
    brief: &str,
    context: Option<&str>,
    content: &ContentRecord,
    plan: &VisualPlan,
    profile: &DurationProfile,
    requirements: &StageRequirements,
) -> String {
    let scenes: Vec<_> = plan
        .scenes
        .iter()
        .map(|scene| {
            json!({
                "description": scene.description,
                "duration": scene.duration,
                "animations": scene.animations.iter().map(|a| a.kind()).collect::<Vec<_>>(),
            })
        })
        .collect();

    let mut prompt = format!(
        "Generate complete Manim code for this educational video request:\n{brief}\n\n\
         Title: {title}\n\
         Total duration: {seconds} seconds\n\
         Key concepts: {concepts}\n\
         Color scheme: {colors}\n\
         Scenes:\n{scenes}\n\n\
         REQUIREMENTS:\n\
         1. One Scene subclass with a construct() method\n\
         2. At least {animations} distinct animations using self.play()\n\
         3. Use Create or Write to introduce objects and Transform to morph them\n\
         4. self.wait() between steps so the video lasts {seconds} seconds\n\
         5. End with a visual summary of the key concepts",
        title = content.title,
        seconds = requirements.duration_secs,
        concepts = content.key_concepts.join(", "),
        colors = plan.color_scheme,
        scenes = serde_json::to_string_pretty(&scenes).unwrap_or_default(),
        animations = profile.target_animations().max(5),
    );
    if let Some(structure) = plan.initial_structure.as_deref() {
        prompt.push_str("\n\nStart from this structure:\n");
        prompt.push_str(structure);
    }
    push_block(&mut prompt, context);
    prompt
}

/// Directive appended to the next Content call after the gate rejected `previous`.
#[must_use]
pub fn refinement_directive(
    report: &ValidationReport,
    previous: &ContentRecord,
    profile: &DurationProfile,
) -> String {
    let mut directive = format!(
        "Previous content was too brief. Expand it with more detailed explanations and \
         additional examples, and deepen it with prerequisites and multiple perspectives.\n\
         Previous content sections: {sections}\n\
         Previous total duration: {duration} seconds\n\
         REQUIREMENT: generate at least {required} seconds of content.",
        sections = previous.sections.len(),
        duration = previous.declared_duration(),
        required = profile.duration_secs(),
    );
    if !report.issues.is_empty() {
        directive.push_str("\nFix these issues:");
        for issue in &report.issues {
            directive.push_str("\n- ");
            directive.push_str(&issue.to_string());
        }
    }
    directive
}

fn push_block(prompt: &mut String, block: Option<&str>) {
    if let Some(block) = block.map(str::trim).filter(|b| !b.is_empty()) {
        prompt.push_str("\n\n");
        prompt.push_str(block);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_utils::error::QualityIssue;

    #[test]
    fn test_short_brief_is_compact() {
        let profile = DurationProfile::for_minutes(2);
        let brief = meta_prompt("derivatives", &profile);
        assert!(brief.starts_with("Create a 2-minute educational video about: derivatives"));
        assert!(brief.contains("120 seconds"));
    }

    #[test]
    fn test_long_brief_uses_full_framing() {
        let profile = DurationProfile::for_minutes(12);
        let brief = meta_prompt("fourier series", &profile);
        assert!(brief.contains("## GOAL"));
        assert!(brief.contains("12-minute"));
        assert!(brief.ends_with("Original request: fourier series"));
    }

    #[test]
    fn test_content_prompt_appends_context_and_directive() {
        let profile = DurationProfile::for_minutes(1);
        let requirements = StageRequirements::for_minutes(1);
        let prompt = content_prompt(
            "brief",
            Some("Previous conversation:\nuser: hi"),
            &profile,
            &requirements,
            Some("Expand it"),
        );
        assert!(prompt.contains("60 seconds"));
        assert!(prompt.contains("user: hi"));
        assert!(prompt.ends_with("Expand it"));

        let bare = content_prompt("brief", Some("   "), &profile, &requirements, None);
        assert!(!bare.ends_with("\n\n"));
    }

    #[test]
    fn test_refinement_directive_lists_previous_issues() {
        let profile = DurationProfile::for_minutes(3);
        let previous = ContentRecord {
            total_duration: Some(40.0),
            ..ContentRecord::default()
        };
        let mut report = ValidationReport::default();
        report.issues.push(QualityIssue::DurationBelowMinimum {
            actual_secs: 40.0,
            required_secs: 165.0,
        });

        let directive = refinement_directive(&report, &previous, &profile);
        assert!(directive.contains("Previous total duration: 40 seconds"));
        assert!(directive.contains("at least 180 seconds"));
        assert!(directive.contains("Duration 40s is below minimum 165s"));
    }

    #[test]
    fn test_code_prompt_includes_skeleton() {
        let profile = DurationProfile::for_minutes(1);
        let requirements = StageRequirements::for_minutes(1);
        let plan = VisualPlan {
            initial_structure: Some("class Demo(Scene):".to_string()),
            ..VisualPlan::default()
        };
        let prompt = code_prompt("brief", None, &ContentRecord::default(), &plan, &profile, &requirements);
        assert!(prompt.contains("Start from this structure:\nclass Demo(Scene):"));
    }
}
