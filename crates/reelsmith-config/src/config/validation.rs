use std::str::FromStr;

use reelsmith_utils::error::{ConfigError, ReelsmithError};
use reelsmith_utils::types::ModelClass;

use super::{Config, RENDER_QUALITIES, SUPPORTED_PROVIDERS};

fn invalid(key: &str, value: impl Into<String>) -> ReelsmithError {
    ReelsmithError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    })
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ReelsmithError> {
        if let Some(class) = self.defaults.model_class.as_deref()
            && ModelClass::from_str(class).is_err()
        {
            return Err(invalid(
                "model_class",
                format!("'{class}' is not one of: fast, high-quality"),
            ));
        }

        if let Some(minutes) = self.defaults.duration_minutes {
            if minutes == 0 {
                return Err(invalid("duration_minutes", "must be greater than 0"));
            }
            if minutes > 60 {
                return Err(invalid("duration_minutes", "exceeds maximum of 60 minutes"));
            }
        }

        if let Some(provider) = self.llm.provider.as_deref()
            && !SUPPORTED_PROVIDERS.contains(&provider)
        {
            return Err(invalid(
                "llm_provider",
                format!(
                    "'{provider}' is not supported. Supported providers: {}",
                    SUPPORTED_PROVIDERS.join(", ")
                ),
            ));
        }

        if let Some(attempts) = self.llm.retry_attempts {
            if attempts == 0 {
                return Err(invalid("retry_attempts", "must be greater than 0"));
            }
            if attempts > 10 {
                return Err(invalid("retry_attempts", "exceeds maximum of 10"));
            }
        }

        if self.llm.call_budget == Some(0) {
            return Err(invalid("call_budget", "must be greater than 0"));
        }

        if let Some(timeout) = self.llm.timeout_secs
            && timeout < 5
        {
            return Err(invalid("timeout_secs", "must be at least 5 seconds"));
        }

        if let Some(quality) = self.render.quality.as_deref()
            && !RENDER_QUALITIES.contains(&quality)
        {
            return Err(invalid(
                "render_quality",
                format!("'{quality}' is not one of: {}", RENDER_QUALITIES.join(", ")),
            ));
        }

        if let Some(attempts) = self.render.max_attempts {
            if attempts == 0 {
                return Err(invalid("render_max_attempts", "must be greater than 0"));
            }
            if attempts > 10 {
                return Err(invalid("render_max_attempts", "exceeds maximum of 10"));
            }
        }

        if let Some(binary) = self.render.binary.as_deref()
            && binary.trim().is_empty()
        {
            return Err(invalid("render_binary", "must not be empty"));
        }

        Ok(())
    }
}
