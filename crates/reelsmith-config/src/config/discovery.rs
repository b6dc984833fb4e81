use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use reelsmith_utils::error::{ConfigError, ReelsmithError};

use super::{
    CliArgs, Config, ConfigSource, Defaults, LlmConfig, PipelineConfig, RenderConfig,
};

/// Environment variable overriding `[llm] provider`.
pub const ENV_LLM_PROVIDER: &str = "REELSMITH_LLM_PROVIDER";

/// Environment variable overriding `[llm] call_budget`.
pub const ENV_CALL_BUDGET: &str = "REELSMITH_CALL_BUDGET";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    defaults: Option<Defaults>,
    llm: Option<LlmConfig>,
    pipeline: Option<PipelineConfig>,
    render: Option<RenderConfig>,
}

/// Move `value` into `slot` when present and record where it came from.
fn take<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: &ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if value.is_some() {
        *slot = value;
        attribution.insert(key.to_string(), source.clone());
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > env > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no explicit
    /// path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid depending on the
    /// process working directory.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut attribution = HashMap::new();
        let mut defaults = Defaults::default();
        let mut llm = LlmConfig::default();
        let mut pipeline = PipelineConfig::default();
        let mut render = RenderConfig::default();

        for key in [
            "model_class",
            "duration_minutes",
            "output_dir",
            "llm_provider",
            "retry_attempts",
            "best_effort",
            "render_binary",
            "render_max_attempts",
        ] {
            attribution.insert(key.to_string(), ConfigSource::Default);
        }

        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ReelsmithError::Config(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    })
                    .into());
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            let source = ConfigSource::Config;
            let attr = &mut attribution;

            if let Some(d) = file.defaults {
                take(&mut defaults.model_class, d.model_class, "model_class", &source, attr);
                take(
                    &mut defaults.duration_minutes,
                    d.duration_minutes,
                    "duration_minutes",
                    &source,
                    attr,
                );
                take(&mut defaults.output_dir, d.output_dir, "output_dir", &source, attr);
                take(&mut defaults.verbose, d.verbose, "verbose", &source, attr);
            }

            if let Some(l) = file.llm {
                take(&mut llm.provider, l.provider, "llm_provider", &source, attr);
                take(
                    &mut llm.retry_attempts,
                    l.retry_attempts,
                    "retry_attempts",
                    &source,
                    attr,
                );
                take(
                    &mut llm.retry_base_delay_ms,
                    l.retry_base_delay_ms,
                    "retry_base_delay_ms",
                    &source,
                    attr,
                );
                take(&mut llm.call_budget, l.call_budget, "call_budget", &source, attr);
                take(&mut llm.timeout_secs, l.timeout_secs, "timeout_secs", &source, attr);
                take(&mut llm.anthropic, l.anthropic, "llm_anthropic", &source, attr);
                take(&mut llm.openai, l.openai, "llm_openai", &source, attr);
            }

            if let Some(p) = file.pipeline {
                take(&mut pipeline.best_effort, p.best_effort, "best_effort", &source, attr);
                take(
                    &mut pipeline.fast_path_max_minutes,
                    p.fast_path_max_minutes,
                    "fast_path_max_minutes",
                    &source,
                    attr,
                );
            }

            if let Some(r) = file.render {
                take(&mut render.binary, r.binary, "render_binary", &source, attr);
                take(&mut render.quality, r.quality, "render_quality", &source, attr);
                take(&mut render.preview, r.preview, "render_preview", &source, attr);
                take(
                    &mut render.max_attempts,
                    r.max_attempts,
                    "render_max_attempts",
                    &source,
                    attr,
                );
                take(&mut render.media_dir, r.media_dir, "render_media_dir", &source, attr);
            }
        }

        // Environment overrides the file
        if let Ok(provider) = env::var(ENV_LLM_PROVIDER)
            && !provider.is_empty()
        {
            llm.provider = Some(provider);
            attribution.insert("llm_provider".to_string(), ConfigSource::Env);
        }

        if let Ok(raw) = env::var(ENV_CALL_BUDGET)
            && !raw.is_empty()
        {
            let budget = raw.trim().parse::<u32>().map_err(|_| {
                ReelsmithError::Config(ConfigError::InvalidValue {
                    key: ENV_CALL_BUDGET.to_string(),
                    value: format!("'{raw}' is not a positive integer"),
                })
            })?;
            llm.call_budget = Some(budget);
            attribution.insert("call_budget".to_string(), ConfigSource::Env);
        }

        // CLI overrides everything
        let cli = ConfigSource::Cli;
        let attr = &mut attribution;
        take(
            &mut defaults.model_class,
            cli_args.model_class.clone(),
            "model_class",
            &cli,
            attr,
        );
        take(
            &mut defaults.duration_minutes,
            cli_args.duration_minutes,
            "duration_minutes",
            &cli,
            attr,
        );
        take(
            &mut defaults.output_dir,
            cli_args.output_dir.clone(),
            "output_dir",
            &cli,
            attr,
        );
        take(&mut defaults.verbose, cli_args.verbose, "verbose", &cli, attr);
        take(
            &mut llm.provider,
            cli_args.llm_provider.clone(),
            "llm_provider",
            &cli,
            attr,
        );
        take(&mut llm.call_budget, cli_args.call_budget, "call_budget", &cli, attr);
        take(
            &mut pipeline.best_effort,
            cli_args.best_effort,
            "best_effort",
            &cli,
            attr,
        );
        take(
            &mut render.max_attempts,
            cli_args.max_render_attempts,
            "render_max_attempts",
            &cli,
            attr,
        );

        let config = Self {
            defaults,
            llm,
            pipeline,
            render,
            source_attribution: attribution,
        };

        config.validate()?;

        Ok(config)
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.reelsmith/config.toml`, stopping
    /// at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir.to_path_buf();

        loop {
            let config_path = current_dir.join(".reelsmith").join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent.to_path_buf(),
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: TomlConfig = toml::from_str(&content).map_err(|e| {
                    ReelsmithError::Config(ConfigError::InvalidFile(format!(
                        "{}: {}",
                        path.display(),
                        e.message()
                    )))
                })?;
                Ok(config)
            }
            // A file that vanished between discovery and read is treated as empty
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }

    /// Discover configuration from environment and filesystem only.
    ///
    /// Equivalent to [`Config::discover`] with no CLI overrides.
    pub fn discover_from_env_and_fs() -> Result<Self> {
        Self::discover(&CliArgs::default())
    }
}
