//! Canned stage answers for tests.

use serde_json::{Value, json};

use reelsmith_budget::DurationProfile;
use reelsmith_llm::ScriptedBackend;
use reelsmith_model::StageKind;

/// A scene module that satisfies every code check.
pub const SCENE_CODE: &str = r#"Here is the animation:

```python
from manim import *

class DerivativeScene(Scene):
    def construct(self):
        title = Text("Derivatives")
        self.play(Write(title))
        self.wait(1)
        curve = FunctionGraph(lambda x: x ** 2)
        self.play(Create(curve))
        self.play(Transform(title, Text("Slope of a tangent")))
        self.wait(2)
```"#;

pub const SKELETON: &str = "class DerivativeScene(Scene):\n    def construct(self):\n        # intro\n        # summary\n        pass";

/// Content JSON with `sections` sections of `secs` seconds, each `chars`
/// characters long and carrying one example.
#[must_use]
pub fn content_json(sections: usize, secs: f64, chars: usize) -> String {
    let sections: Vec<Value> = (0..sections)
        .map(|i| {
            json!({
                "name": format!("Part {}", i + 1),
                "content": "d".repeat(chars),
                "visual_elements": "graph of the curve",
                "formulas": ["f'(x) = lim (f(x+h) - f(x)) / h"],
                "examples": ["slope of x^2 at x = 3"],
                "duration": secs,
            })
        })
        .collect();
    json!({
        "title": "Derivatives",
        "sections": sections,
        "key_concepts": ["limit", "slope"],
        "visual_opportunities": ["tangent line sweep"],
    })
    .to_string()
}

/// Content that meets every threshold of `minutes`.
#[must_use]
pub fn passing_content(minutes: u32) -> String {
    let profile = DurationProfile::for_minutes(minutes);
    #[allow(clippy::cast_precision_loss)]
    let secs = (f64::from(profile.duration_secs()) / profile.min_sections as f64).ceil();
    content_json(profile.min_sections, secs, profile.min_section_chars + 20)
}

/// Content far below every threshold of `minutes`.
#[must_use]
pub fn thin_content() -> String {
    content_json(1, 10.0, 40)
}

#[must_use]
pub fn visual_plan_json(scenes: usize, animations: usize) -> String {
    let scenes: Vec<Value> = (0..scenes)
        .map(|i| {
            json!({
                "scene_number": i + 1,
                "description": format!("Scene {}", i + 1),
                "duration": 30,
                "manim_objects": [{"type": "Axes", "description": "coordinate plane"}],
                "animations": (0..animations)
                    .map(|_| json!({"type": "Create", "target": "Axes", "duration": 1.0}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "scenes": scenes,
        "color_scheme": {"primary": "BLUE", "secondary": "YELLOW"},
    })
    .to_string()
}

#[must_use]
pub fn passing_visual_plan(minutes: u32) -> String {
    let profile = DurationProfile::for_minutes(minutes);
    visual_plan_json(profile.min_sections, profile.min_animations_per_section)
}

/// A backend that answers every stage with passing output for `minutes`.
#[must_use]
pub fn passing_backend(minutes: u32) -> ScriptedBackend {
    ScriptedBackend::new()
        .with_repeat(StageKind::Content.as_str(), passing_content(minutes))
        .with_repeat(StageKind::VisualPlan.as_str(), passing_visual_plan(minutes))
        .with_repeat(StageKind::CodeSkeleton.as_str(), SKELETON)
        .with_repeat(StageKind::Code.as_str(), SCENE_CODE)
}
