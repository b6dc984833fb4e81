//! Typed records for each stage's structured output.
//!
//! Records decode leniently: every field has a default and unknown keys land in
//! `extra`, so a record survives schema drift and re-serializes without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::lenient;

/// Output of the Content stage: the narrative outline of the video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,

    /// Declared length in seconds.
    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_duration: Option<f64>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub sections: Vec<Section>,

    #[serde(default, deserialize_with = "lenient::strings")]
    pub key_concepts: Vec<String>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub visual_opportunities: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentRecord {
    /// Declared total, falling back to the sum of section durations.
    #[must_use]
    pub fn declared_duration(&self) -> f64 {
        self.total_duration.unwrap_or_else(|| self.section_duration_sum())
    }

    #[must_use]
    pub fn section_duration_sum(&self) -> f64 {
        self.sections.iter().filter_map(|s| s.duration).sum()
    }

    /// Section names in order, for prompts that only need the outline.
    #[must_use]
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }
}

/// One narrative section of a [`ContentRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub visual_elements: Value,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub formulas: Vec<Value>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub examples: Vec<Value>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Length of the body text in characters.
    #[must_use]
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// Output of the Visual-Plan stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualPlan {
    #[serde(default, deserialize_with = "lenient::seq")]
    pub scenes: Vec<Scene>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub color_scheme: Value,

    /// Skeleton produced concurrently on the fast path, merged before the Code stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_structure: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VisualPlan {
    #[must_use]
    pub fn total_animations(&self) -> usize {
        self.scenes.iter().map(|s| s.animations.len()).sum()
    }
}

/// One scene of a [`VisualPlan`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(
        default,
        deserialize_with = "lenient::opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub scene_number: Option<u32>,

    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,

    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub manim_objects: Vec<Value>,

    #[serde(default, deserialize_with = "lenient::seq")]
    pub animations: Vec<Animation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A planned animation: either a bare name or a detailed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Animation {
    Named(String),
    Detailed(AnimationSpec),
}

impl Animation {
    /// The animation kind, e.g. `Write` or `Transform`.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Detailed(spec) => &spec.kind,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSpec {
    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub kind: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub target: String,

    #[serde(
        default,
        deserialize_with = "lenient::opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Output of the Code stage: renderable animation source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeArtifact {
    pub source: String,
}

impl CodeArtifact {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Newline count, the `code_lines` metric.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.source.matches('\n').count()
    }

    /// Length in characters after trimming surrounding whitespace.
    #[must_use]
    pub fn trimmed_len(&self) -> usize {
        self.source.trim().chars().count()
    }
}
