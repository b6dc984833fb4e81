//! Configuration management for reelsmith
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. Supports TOML configuration files with
//! `[defaults]`, `[llm]`, `[pipeline]` and `[render]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;
pub use reelsmith_utils::types::ConfigSource;

use reelsmith_utils::types::ModelClass;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DURATION_MINUTES: u32 = 3;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_FAST_PATH_MAX_MINUTES: u32 = 5;
pub const DEFAULT_RENDER_BINARY: &str = "manim";
pub const DEFAULT_RENDER_QUALITY: &str = "low";
pub const DEFAULT_RENDER_ATTEMPTS: u32 = 3;

/// Providers the backend factory can construct.
pub const SUPPORTED_PROVIDERS: &[&str] = &["anthropic", "openai"];

/// Render quality names accepted in `[render] quality`.
pub const RENDER_QUALITIES: &[&str] = &["low", "medium", "high"];

impl Config {
    /// Model class for requests that do not name one.
    #[must_use]
    pub fn model_class(&self) -> ModelClass {
        self.defaults
            .model_class
            .as_deref()
            .and_then(|s| ModelClass::from_str(s).ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.defaults
            .duration_minutes
            .unwrap_or(DEFAULT_DURATION_MINUTES)
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.defaults
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    #[must_use]
    pub fn provider(&self) -> &str {
        self.llm.provider.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    #[must_use]
    pub fn retry_attempts(&self) -> u32 {
        self.llm.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }

    #[must_use]
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(
            self.llm
                .retry_base_delay_ms
                .unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS),
        )
    }

    #[must_use]
    pub fn call_budget(&self) -> Option<u32> {
        self.llm.call_budget
    }

    #[must_use]
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout_secs.unwrap_or(DEFAULT_LLM_TIMEOUT_SECS))
    }

    /// Resolve provider settings, filling in per-provider defaults.
    ///
    /// Model defaults follow the provider: Anthropic maps `fast` to Sonnet and
    /// `high-quality` to Opus; OpenAI uses one chat model for both.
    #[must_use]
    pub fn provider_settings(&self, provider: &str) -> ResolvedProvider {
        let (section, key_env, fast, high) = match provider {
            "openai" => (
                self.llm.openai.as_ref(),
                "OPENAI_API_KEY",
                "gpt-4-turbo-preview",
                "gpt-4-turbo-preview",
            ),
            _ => (
                self.llm.anthropic.as_ref(),
                "ANTHROPIC_API_KEY",
                "claude-sonnet-4-20250514",
                "claude-opus-4-20250514",
            ),
        };

        ResolvedProvider {
            name: provider.to_string(),
            api_key_env: section
                .and_then(|s| s.api_key_env.clone())
                .unwrap_or_else(|| key_env.to_string()),
            base_url: section.and_then(|s| s.base_url.clone()),
            fast_model: section
                .and_then(|s| s.fast_model.clone())
                .unwrap_or_else(|| fast.to_string()),
            high_quality_model: section
                .and_then(|s| s.high_quality_model.clone())
                .unwrap_or_else(|| high.to_string()),
        }
    }

    #[must_use]
    pub fn best_effort(&self) -> bool {
        self.pipeline.best_effort.unwrap_or(true)
    }

    #[must_use]
    pub fn fast_path_max_minutes(&self) -> u32 {
        self.pipeline
            .fast_path_max_minutes
            .unwrap_or(DEFAULT_FAST_PATH_MAX_MINUTES)
    }

    #[must_use]
    pub fn render_binary(&self) -> &str {
        self.render.binary.as_deref().unwrap_or(DEFAULT_RENDER_BINARY)
    }

    #[must_use]
    pub fn render_quality(&self) -> &str {
        self.render
            .quality
            .as_deref()
            .unwrap_or(DEFAULT_RENDER_QUALITY)
    }

    #[must_use]
    pub fn render_preview(&self) -> bool {
        self.render.preview.unwrap_or(false)
    }

    #[must_use]
    pub fn max_render_attempts(&self) -> u32 {
        self.render.max_attempts.unwrap_or(DEFAULT_RENDER_ATTEMPTS)
    }

    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.render
            .media_dir
            .clone()
            .unwrap_or_else(|| self.output_dir().join("media"))
    }
}
