use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `ReelsmithError` is what the job runner and the CLI surface to callers.
/// Each variant wraps one layer of the error taxonomy:
///
/// | Variant | Meaning |
/// |---------|---------|
/// | `Config` | Configuration file or CLI argument errors |
/// | `Llm` | Generation collaborator failures that escaped the retry budget |
/// | `Pipeline` | Stage failures, quality shortfalls, missing artifacts |
/// | `Render` | Render recovery exhausted or the renderer could not run |
/// | `Io` | Filesystem failures while persisting artifacts |
///
/// Use [`to_exit_code()`](Self::to_exit_code) for the CLI mapping and
/// [`display_for_user()`](Self::display_for_user) for a human report.
///
/// Library code returns `ReelsmithError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum ReelsmithError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Generation,
    Parsing,
    Quality,
    Rendering,
    FileSystem,
    ResourceLimits,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Generation => write!(f, "Generation"),
            Self::Parsing => write!(f, "Parsing"),
            Self::Quality => write!(f, "Quality"),
            Self::Rendering => write!(f, "Rendering"),
            Self::FileSystem => write!(f, "File System"),
            Self::ResourceLimits => write!(f, "Resource Limits"),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(msg) => format!("The configuration file is invalid: {msg}"),
            Self::MissingRequired(key) => format!("Required configuration '{key}' is missing"),
            Self::InvalidValue { key, value } => {
                format!("Configuration value for '{key}' is invalid: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Could not discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Configuration is resolved with precedence: CLI flags > environment > \
             .reelsmith/config.toml > built-in defaults."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .reelsmith/config.toml".to_string(),
                "Run 'reelsmith config' to see the effective configuration".to_string(),
            ],
            Self::MissingRequired(key) => {
                vec![format!("Set '{key}' in the config file or pass it on the command line")]
            }
            Self::InvalidValue { key, .. } => vec![
                format!("Correct the value of '{key}'"),
                "Run 'reelsmith config' to see where each value came from".to_string(),
            ],
            Self::NotFound { .. } => vec![
                "Check the path passed to --config".to_string(),
                "Omit --config to use upward discovery".to_string(),
            ],
            Self::DiscoveryFailed { .. } => {
                vec!["Pass an explicit --config path".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

// ============================================================================
// Generation backend
// ============================================================================

/// Errors that can occur during generation backend operations
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Transport-level failure (HTTP connectivity, malformed response envelope)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403, missing API key)
    #[error("Provider authentication error: {0}")]
    ProviderAuth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    ProviderQuota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    ProviderOutage(String),

    /// Invocation timed out
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Per-run call budget exhausted
    #[error("Budget exceeded: attempted {attempted} calls, limit is {limit}")]
    BudgetExceeded { limit: u32, attempted: u32 },

    /// Configuration error
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unsupported feature or provider
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The provider answered but the text is unusable for the caller
    #[error("Malformed output: {0}")]
    MalformedOutput(String),
}

impl LlmError {
    /// Whether a fresh attempt of the same call can reasonably succeed.
    ///
    /// Auth, budget and configuration failures are permanent for the run.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::ProviderQuota(_)
                | Self::ProviderOutage(_)
                | Self::Timeout { .. }
                | Self::MalformedOutput(_)
        )
    }
}

impl UserFriendlyError for LlmError {
    fn user_message(&self) -> String {
        match self {
            Self::Transport(msg) => format!("Generation transport error: {msg}"),
            Self::ProviderAuth(msg) => format!("Provider authentication failed: {msg}"),
            Self::ProviderQuota(msg) => format!("Provider quota exceeded: {msg}"),
            Self::ProviderOutage(msg) => format!("Provider service outage: {msg}"),
            Self::Timeout { duration } => {
                format!("Generation call timed out after {:?}", duration)
            }
            Self::BudgetExceeded { limit, attempted } => format!(
                "Call budget exceeded: attempted {} calls, limit is {}",
                attempted, limit
            ),
            Self::Misconfiguration(msg) => format!("Generation backend misconfigured: {msg}"),
            Self::Unsupported(msg) => format!("Not supported: {msg}"),
            Self::MalformedOutput(msg) => format!("Provider returned unusable output: {msg}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Transport(_) | Self::ProviderOutage(_) | Self::Timeout { .. } => Some(
                "Transient provider failures are retried with exponential backoff before \
                 they surface."
                    .to_string(),
            ),
            Self::ProviderAuth(_) => Some(
                "Authentication errors indicate missing or invalid API keys.".to_string(),
            ),
            Self::ProviderQuota(_) => {
                Some("Quota errors occur when rate or usage limits are reached.".to_string())
            }
            Self::BudgetExceeded { .. } => Some(
                "The per-run call budget caps how many generation calls one request may make."
                    .to_string(),
            ),
            Self::Misconfiguration(_) | Self::Unsupported(_) => {
                Some("Check the [llm] section of the configuration.".to_string())
            }
            Self::MalformedOutput(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Transport(_) | Self::ProviderOutage(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Run with --verbose to see each retry".to_string(),
            ],
            Self::ProviderAuth(_) => vec![
                "Check that the API key environment variable is set".to_string(),
                "Verify the key is valid and not expired".to_string(),
            ],
            Self::ProviderQuota(_) => vec![
                "Wait a few minutes and try again".to_string(),
                "Use --model-class fast to reduce usage".to_string(),
            ],
            Self::Timeout { .. } => vec!["Increase llm.timeout_secs".to_string()],
            Self::BudgetExceeded { .. } => vec![
                "Raise llm.call_budget or REELSMITH_CALL_BUDGET".to_string(),
                "Request a shorter duration to reduce refinement iterations".to_string(),
            ],
            Self::Misconfiguration(_) | Self::Unsupported(_) => vec![
                "Run 'reelsmith config' to inspect the effective configuration".to_string(),
            ],
            Self::MalformedOutput(_) => vec!["Retry the request".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ProviderAuth(_) | Self::Misconfiguration(_) | Self::Unsupported(_) => {
                ErrorCategory::Configuration
            }
            Self::ProviderQuota(_) | Self::BudgetExceeded { .. } => ErrorCategory::ResourceLimits,
            Self::MalformedOutput(_) => ErrorCategory::Parsing,
            _ => ErrorCategory::Generation,
        }
    }
}

// ============================================================================
// Structured-output parsing
// ============================================================================

/// Raised when every recovery strategy of the structured-output parser failed.
///
/// Carries the position of the original decode failure and a bounded snippet of
/// the text around it, never the whole payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecoverable parse error at line {line} column {column}: {message} (near `{snippet}`)")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Byte offset into the text the first strict parse ran on.
    pub offset: usize,
    pub snippet: String,
}

// ============================================================================
// Quality validation
// ============================================================================

/// A single quality finding.
///
/// Every variant carries the actual and the required value so the failing
/// condition can be reconstructed from the message alone.
#[derive(Debug, Clone, PartialEq)]
pub enum QualityIssue {
    DurationBelowMinimum { actual_secs: f64, required_secs: f64 },
    TooFewSections { actual: usize, required: usize },
    SectionTooShort { index: usize, chars: usize, required: usize },
    SectionLacksExamples { index: usize },
    TooFewScenes { actual: usize, required: usize },
    SceneTooFewAnimations { index: usize, actual: usize, required: usize },
    CodeTooShort { actual: usize, required: usize },
    MissingConstruct { construct: String },
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DurationBelowMinimum {
                actual_secs,
                required_secs,
            } => write!(
                f,
                "Duration {}s is below minimum {}s",
                actual_secs, required_secs
            ),
            Self::TooFewSections { actual, required } => {
                write!(f, "Only {} sections, need at least {}", actual, required)
            }
            Self::SectionTooShort {
                index,
                chars,
                required,
            } => write!(
                f,
                "Section {} content is {} characters (minimum: {} characters)",
                index + 1,
                chars,
                required
            ),
            Self::SectionLacksExamples { index } => {
                write!(f, "Section {} lacks examples", index + 1)
            }
            Self::TooFewScenes { actual, required } => {
                write!(f, "Only {} scenes, need at least {}", actual, required)
            }
            Self::SceneTooFewAnimations {
                index,
                actual,
                required,
            } => write!(
                f,
                "Scene {} has only {} animations, need at least {}",
                index + 1,
                actual,
                required
            ),
            Self::CodeTooShort { actual, required } => write!(
                f,
                "Generated code is too short: {} characters (minimum: {} characters)",
                actual, required
            ),
            Self::MissingConstruct { construct } => {
                write!(f, "Missing required construct: {}", construct)
            }
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Failures of the generation pipeline as seen by its caller.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage call failed after its retry budget was spent.
    #[error("{stage} stage failed: {source}")]
    Generation {
        stage: String,
        #[source]
        source: LlmError,
    },

    /// A stage produced text that could not be recovered into a record.
    #[error("{stage} stage returned unparseable output: {source}")]
    Parse {
        stage: String,
        #[source]
        source: ParseError,
    },

    /// Strict mode only: the final combined report was not valid.
    #[error("Quality shortfall: {} issue(s)", .issues.len())]
    QualityShortfall { issues: Vec<QualityIssue> },

    /// Every iteration failed the content gate so no code was ever produced.
    #[error("No artifact produced after {iterations} iteration(s)")]
    NoArtifact {
        iterations: u32,
        last_issues: Vec<QualityIssue>,
    },
}

impl UserFriendlyError for PipelineError {
    fn user_message(&self) -> String {
        match self {
            Self::Generation { stage, source } => {
                format!("The {stage} stage failed: {}", source.user_message())
            }
            Self::Parse { stage, source } => {
                format!("The {stage} stage returned output that could not be parsed: {source}")
            }
            Self::QualityShortfall { issues } => format!(
                "The generated video plan did not meet quality requirements ({} issue(s))",
                issues.len()
            ),
            Self::NoArtifact { iterations, .. } => format!(
                "No animation source was produced after {iterations} refinement iteration(s)"
            ),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Generation { source, .. } => source.context(),
            Self::Parse { .. } => Some(
                "The parser strips fences, repairs trailing commas, control characters, \
                 unterminated strings and bare keys before giving up."
                    .to_string(),
            ),
            Self::QualityShortfall { issues } | Self::NoArtifact {
                last_issues: issues,
                ..
            } => {
                if issues.is_empty() {
                    None
                } else {
                    Some(
                        issues
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join("; "),
                    )
                }
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Generation { source, .. } => source.suggestions(),
            Self::Parse { .. } => vec![
                "Retry the request".to_string(),
                "Use --model-class high-quality for more reliable structured output".to_string(),
            ],
            Self::QualityShortfall { .. } => vec![
                "Drop --strict to accept a best-effort result".to_string(),
                "Request a longer duration for richer content".to_string(),
            ],
            Self::NoArtifact { .. } => vec![
                "Retry with a more specific topic".to_string(),
                "Use --model-class high-quality".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Generation { source, .. } => source.category(),
            Self::Parse { .. } => ErrorCategory::Parsing,
            Self::QualityShortfall { .. } | Self::NoArtifact { .. } => ErrorCategory::Quality,
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Failures of the render recovery loop.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to render after {attempts} attempts. Last error: {last_reason}")]
    Exhausted { attempts: u32, last_reason: String },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to launch renderer '{program}': {reason}")]
    Spawn { program: String, reason: String },
}

impl UserFriendlyError for RenderError {
    fn user_message(&self) -> String {
        match self {
            Self::Exhausted {
                attempts,
                last_reason,
            } => format!(
                "Rendering failed after {attempts} attempt(s). Last error: {}",
                last_line(last_reason)
            ),
            Self::Io { path, source } => {
                format!("Could not access {}: {source}", path.display())
            }
            Self::Spawn { program, reason } => {
                format!("Could not launch renderer '{program}': {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Exhausted { .. } => Some(
                "Known failure patterns are patched automatically between attempts; this one \
                 was not fixed within the attempt budget."
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Exhausted { .. } => vec![
                "Inspect the generated script and fix it by hand".to_string(),
                "Re-run 'reelsmith render <script>' after editing".to_string(),
            ],
            Self::Io { .. } => vec!["Check permissions on the output directory".to_string()],
            Self::Spawn { .. } => vec![
                "Install manim and make sure it is on PATH".to_string(),
                "Set render.binary in the configuration".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } => ErrorCategory::FileSystem,
            _ => ErrorCategory::Rendering,
        }
    }
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(text)
}

// ============================================================================
// Top-level reporting
// ============================================================================

impl UserFriendlyError for ReelsmithError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Llm(err) => err.user_message(),
            Self::Pipeline(err) => err.user_message(),
            Self::Render(err) => err.user_message(),
            Self::Io(err) => format!("File system error: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Llm(err) => err.context(),
            Self::Pipeline(err) => err.context(),
            Self::Render(err) => err.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Llm(err) => err.suggestions(),
            Self::Pipeline(err) => err.suggestions(),
            Self::Render(err) => err.suggestions(),
            Self::Io(_) => vec!["Check that the output directory is writable".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(err) => err.category(),
            Self::Llm(err) => err.category(),
            Self::Pipeline(err) => err.category(),
            Self::Render(err) => err.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl ReelsmithError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reelsmith_utils::error::{ReelsmithError, RenderError};
    ///
    /// let err = ReelsmithError::Render(RenderError::Exhausted {
    ///     attempts: 3,
    ///     last_reason: "NameError: name 'Foo' is not defined".to_string(),
    /// });
    /// let message = err.display_for_user();
    /// assert!(message.contains("3 attempt(s)"));
    /// assert!(message.contains("Suggestions:"));
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {}\n", ctx));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {}\n", suggestion));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    ///
    /// | Exit Code | Name | Description |
    /// |-----------|------|-------------|
    /// | 1 | INTERNAL | Filesystem and other failures |
    /// | 2 | CLI_ARGS | Invalid configuration or arguments |
    /// | 3 | GENERATION_FAILURE | Pipeline produced no acceptable artifact |
    /// | 4 | RENDER_FAILURE | Render recovery exhausted |
    /// | 10 | TIMEOUT | A provider call timed out |
    /// | 70 | PROVIDER_FAILURE | Provider rejected or failed the call |
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Llm(err) => llm_exit_code(err),
            Self::Pipeline(PipelineError::Generation { source, .. }) => llm_exit_code(source),
            Self::Pipeline(_) => ExitCode::GENERATION_FAILURE,
            Self::Render(RenderError::Io { .. }) => ExitCode::INTERNAL,
            Self::Render(_) => ExitCode::RENDER_FAILURE,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

fn llm_exit_code(err: &LlmError) -> crate::exit_codes::ExitCode {
    use crate::exit_codes::ExitCode;

    match err {
        LlmError::Timeout { .. } => ExitCode::TIMEOUT,
        LlmError::Misconfiguration(_) | LlmError::Unsupported(_) => ExitCode::CLI_ARGS,
        LlmError::MalformedOutput(_) => ExitCode::GENERATION_FAILURE,
        _ => ExitCode::PROVIDER_FAILURE,
    }
}
