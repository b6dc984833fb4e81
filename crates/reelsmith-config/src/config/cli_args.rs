use std::path::PathBuf;

/// Overrides collected from the command line.
///
/// Every field is optional; `None` leaves the lower-precedence value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file path (skips upward discovery)
    pub config_path: Option<PathBuf>,
    pub model_class: Option<String>,
    pub duration_minutes: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub llm_provider: Option<String>,
    pub call_budget: Option<u32>,
    /// `Some(false)` when `--strict` was passed
    pub best_effort: Option<bool>,
    pub max_render_attempts: Option<u32>,
}
