//! Generation collaborator boundary
//!
//! All providers implement [`GenerationBackend`], so the pipeline works with
//! any of them without knowing transport details. [`RetryPolicy`] adds
//! exponential backoff around single calls and [`BudgetedBackend`] caps the
//! number of calls one run may make.

mod anthropic_backend;
mod budgeted_backend;
mod http_client;
mod openai_backend;
mod retry;
#[cfg(any(test, feature = "test-utils"))]
mod scripted;
mod types;

use std::sync::Arc;

use reelsmith_config::{Config, ResolvedProvider};
use reelsmith_utils::types::ModelClass;

pub use anthropic_backend::AnthropicBackend;
pub use budgeted_backend::BudgetedBackend;
pub use http_client::redact_error_message;
pub use openai_backend::OpenAiBackend;
pub use reelsmith_utils::error::LlmError;
pub use retry::{RetryPolicy, StructuredCallError};
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::{RecordedCall, ScriptedBackend};
pub use types::{
    DEFAULT_SYSTEM_PROMPT, GenerationBackend, LlmInvocation, LlmResult, Message, Role,
};

/// Construct the backend named by `llm.provider`.
///
/// The call budget is not applied here; it is per run, see [`BudgetedBackend::wrap`].
///
/// # Errors
///
/// Returns `LlmError::Unsupported` for an unknown provider and
/// `LlmError::Misconfiguration` when its API key is missing.
pub fn from_config(config: &Config) -> Result<Arc<dyn GenerationBackend>, LlmError> {
    match config.provider() {
        "anthropic" => Ok(Arc::new(AnthropicBackend::new_from_config(config)?)),
        "openai" => Ok(Arc::new(OpenAiBackend::new_from_config(config)?)),
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown generation provider '{unknown}'. Supported providers: anthropic, openai."
        ))),
    }
}

fn model_for(settings: &ResolvedProvider, class: ModelClass) -> &str {
    match class {
        ModelClass::Fast => &settings.fast_model,
        ModelClass::HighQuality => &settings.high_quality_model,
    }
}

fn api_key(settings: &ResolvedProvider) -> Result<String, LlmError> {
    std::env::var(&settings.api_key_env).map_err(|_| {
        LlmError::Misconfiguration(format!(
            "{} API key not found in environment variable '{}'. Set it or configure a \
             different api_key_env in [llm.{}].",
            settings.name, settings.api_key_env, settings.name
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_unknown_provider_is_unsupported() {
        let mut config = Config::default();
        config.llm.provider = Some("gemini".to_string());
        assert!(matches!(from_config(&config), Err(LlmError::Unsupported(_))));
    }

    #[test]
    #[serial]
    fn test_openai_from_config() {
        let var = "REELSMITH_TEST_OPENAI_KEY";
        unsafe {
            std::env::set_var(var, "test-key");
        }
        let mut config = Config::default();
        config.llm.provider = Some("openai".to_string());
        config.llm.openai = Some(reelsmith_config::ProviderConfig {
            api_key_env: Some(var.to_string()),
            ..Default::default()
        });

        let backend = from_config(&config).unwrap();
        unsafe {
            std::env::remove_var(var);
        }
        assert_eq!(backend.provider(), "openai");
    }
}
