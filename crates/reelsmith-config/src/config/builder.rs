use std::path::PathBuf;
use std::time::Duration;

use reelsmith_utils::error::ReelsmithError;
use reelsmith_utils::types::ModelClass;

use super::{Config, ConfigSource};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// The builder never reads environment variables or config files, which
    /// makes it the right entry point for embedding and for tests.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reelsmith_config::Config;
    /// use reelsmith_utils::types::ModelClass;
    ///
    /// let config = Config::builder()
    ///     .model_class(ModelClass::Fast)
    ///     .duration_minutes(2)
    ///     .call_budget(12)
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.duration_minutes(), 2);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent builder for [`Config`].
///
/// All values set via the builder are attributed to
/// `ConfigSource::Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mark(&mut self, key: &str) {
        self.config
            .source_attribution
            .insert(key.to_string(), ConfigSource::Programmatic);
    }

    #[must_use]
    pub fn model_class(mut self, class: ModelClass) -> Self {
        self.config.defaults.model_class = Some(class.to_string());
        self.mark("model_class");
        self
    }

    /// Target duration in whole minutes (1 to 60).
    #[must_use]
    pub fn duration_minutes(mut self, minutes: u32) -> Self {
        self.config.defaults.duration_minutes = Some(minutes);
        self.mark("duration_minutes");
        self
    }

    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.defaults.output_dir = Some(path.into());
        self.mark("output_dir");
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.defaults.verbose = Some(verbose);
        self.mark("verbose");
        self
    }

    /// Provider name: `anthropic` or `openai`.
    #[must_use]
    pub fn llm_provider(mut self, provider: impl Into<String>) -> Self {
        self.config.llm.provider = Some(provider.into());
        self.mark("llm_provider");
        self
    }

    /// Total attempts per generation call, including the first.
    #[must_use]
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.llm.retry_attempts = Some(attempts);
        self.mark("retry_attempts");
        self
    }

    /// Base delay of the exponential backoff between attempts.
    #[must_use]
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.config.llm.retry_base_delay_ms = Some(millis);
        self.mark("retry_base_delay_ms");
        self
    }

    /// Cap on generation calls a single run may make.
    #[must_use]
    pub fn call_budget(mut self, calls: u32) -> Self {
        self.config.llm.call_budget = Some(calls);
        self.mark("call_budget");
        self
    }

    #[must_use]
    pub fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.config.llm.timeout_secs = Some(timeout.as_secs());
        self.mark("timeout_secs");
        self
    }

    #[must_use]
    pub fn best_effort(mut self, best_effort: bool) -> Self {
        self.config.pipeline.best_effort = Some(best_effort);
        self.mark("best_effort");
        self
    }

    #[must_use]
    pub fn fast_path_max_minutes(mut self, minutes: u32) -> Self {
        self.config.pipeline.fast_path_max_minutes = Some(minutes);
        self.mark("fast_path_max_minutes");
        self
    }

    #[must_use]
    pub fn render_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.render.binary = Some(binary.into());
        self.mark("render_binary");
        self
    }

    #[must_use]
    pub fn render_quality(mut self, quality: impl Into<String>) -> Self {
        self.config.render.quality = Some(quality.into());
        self.mark("render_quality");
        self
    }

    #[must_use]
    pub fn max_render_attempts(mut self, attempts: u32) -> Self {
        self.config.render.max_attempts = Some(attempts);
        self.mark("render_max_attempts");
        self
    }

    #[must_use]
    pub fn media_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.render.media_dir = Some(path.into());
        self.mark("render_media_dir");
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ReelsmithError::Config` when a value is out of range.
    pub fn build(self) -> Result<Config, ReelsmithError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
