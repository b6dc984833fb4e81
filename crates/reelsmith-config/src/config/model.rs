use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use reelsmith_utils::types::ConfigSource;

/// Configuration for reelsmith runs.
///
/// `Config` is resolved once per process with precedence
/// CLI arguments > environment > config file > built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that searches for
/// `.reelsmith/config.toml` upward from the current directory. Use
/// [`Config::builder()`] for embedding, where the user's environment must not
/// leak into the result.
///
/// # Configuration File Format
///
/// ```toml
/// [defaults]
/// model_class = "high-quality"
/// duration_minutes = 3
/// output_dir = "output"
///
/// [llm]
/// provider = "anthropic"
/// retry_attempts = 3
/// retry_base_delay_ms = 1000
/// call_budget = 40
///
/// [llm.anthropic]
/// api_key_env = "ANTHROPIC_API_KEY"
/// fast_model = "claude-sonnet-4-20250514"
///
/// [pipeline]
/// best_effort = true
/// fast_path_max_minutes = 5
///
/// [render]
/// binary = "manim"
/// quality = "low"
/// max_attempts = 3
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub defaults: Defaults,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub render: RenderConfig,
    /// Source attribution for each setting (for `reelsmith config`).
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// Default request values
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    /// `fast` or `high-quality`. Default: `high-quality`.
    pub model_class: Option<String>,
    /// Target video duration in whole minutes. Default: 3.
    pub duration_minutes: Option<u32>,
    /// Where generated scripts and media land. Default: `output`.
    pub output_dir: Option<PathBuf>,
    pub verbose: Option<bool>,
}

/// Generation provider configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    /// `anthropic` or `openai`. Default: `anthropic`.
    pub provider: Option<String>,
    /// Total attempts per call, including the first. Default: 3.
    pub retry_attempts: Option<u32>,
    /// Delay before retry n is `base * 2^n`. Default: 1000 ms.
    pub retry_base_delay_ms: Option<u64>,
    /// Optional cap on generation calls per run.
    pub call_budget: Option<u32>,
    /// Per-call deadline handed to the HTTP client. Default: 600 s.
    pub timeout_secs: Option<u64>,
    pub anthropic: Option<ProviderConfig>,
    pub openai: Option<ProviderConfig>,
}

/// Per-provider HTTP settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub fast_model: Option<String>,
    pub high_quality_model: Option<String>,
}

/// Pipeline behaviour switches
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Return the last produced code even when final validation fails. Default: true.
    pub best_effort: Option<bool>,
    /// Longest request (minutes) that may use the concurrent fast path. Default: 5.
    pub fast_path_max_minutes: Option<u32>,
}

/// Renderer settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Renderer executable. Default: `manim`.
    pub binary: Option<String>,
    /// `low`, `medium` or `high`. Default: `low`.
    pub quality: Option<String>,
    /// Open the result in a viewer after rendering. Default: false.
    pub preview: Option<bool>,
    /// Render attempts before giving up. Default: 3.
    pub max_attempts: Option<u32>,
    /// Default: `<output_dir>/media`.
    pub media_dir: Option<PathBuf>,
}

/// Fully resolved settings for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProvider {
    pub name: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub fast_model: String,
    pub high_quality_model: String,
}
