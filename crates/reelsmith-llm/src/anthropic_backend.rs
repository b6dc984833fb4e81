//! Anthropic Messages API backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use reelsmith_config::{Config, ResolvedProvider};
use reelsmith_utils::error::LlmError;

use crate::http_client::HttpClient;
use crate::types::{GenerationBackend, LlmInvocation, LlmResult, Message, Role};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
    settings: ResolvedProvider,
    timeout: Duration,
}

impl AnthropicBackend {
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the HTTP client cannot be constructed
    pub fn new(
        api_key: String,
        settings: ResolvedProvider,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            settings,
            timeout,
        })
    }

    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if the API key variable is unset
    pub fn new_from_config(config: &Config) -> Result<Self, LlmError> {
        let settings = config.provider_settings("anthropic");
        let api_key = crate::api_key(&settings)?;
        Self::new(api_key, settings, config.llm_timeout())
    }

    /// Split out system messages, which this API takes as a separate field.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system: Option<String> = None;
        let mut converted = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => match system.as_mut() {
                    Some(existing) => {
                        existing.push_str("\n\n");
                        existing.push_str(&msg.content);
                    }
                    None => system = Some(msg.content.clone()),
                },
                Role::User | Role::Assistant => converted.push(AnthropicMessage {
                    role: if msg.role == Role::User { "user" } else { "assistant" },
                    content: msg.content.clone(),
                }),
            }
        }

        (system, converted)
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    fn provider(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        let model = crate::model_for(&self.settings, inv.model_class);
        debug!(
            provider = "anthropic",
            model,
            stage = %inv.stage,
            max_tokens = inv.max_tokens,
            temperature = inv.temperature,
            "Invoking generation backend"
        );

        let (system, messages) = Self::convert_messages(&inv.messages());
        let body = AnthropicRequest {
            model,
            messages,
            max_tokens: inv.max_tokens,
            temperature: inv.temperature,
            system,
        };

        let request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let response = self
            .client
            .execute(request, self.timeout, "anthropic")
            .await?;

        let body: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("Failed to parse Anthropic response: {e}"))
        })?;

        let text: String = body
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(LlmError::MalformedOutput(
                "Anthropic response missing text content".to_string(),
            ));
        }

        let mut result = LlmResult::new(text, "anthropic", model);
        if let Some(usage) = body.usage {
            result = result.with_tokens(usage.input_tokens, usage.output_tokens);
        }
        debug!(
            provider = "anthropic",
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "Generation call completed"
        );
        Ok(result)
    }
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsmith_config::ProviderConfig;
    use reelsmith_utils::types::ModelClass;
    use serial_test::serial;

    #[test]
    fn test_convert_messages_separates_system() {
        let messages = vec![
            Message::system("First"),
            Message::system("Second"),
            Message::user("Hello"),
            Message::new(Role::Assistant, "Hi"),
        ];
        let (system, converted) = AnthropicBackend::convert_messages(&messages);

        assert_eq!(system.as_deref(), Some("First\n\nSecond"));
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].role, "user");
        assert_eq!(converted[1].role, "assistant");
    }

    #[test]
    fn test_request_body_shape() {
        let body = AnthropicRequest {
            model: "claude-test",
            messages: vec![AnthropicMessage {
                role: "user",
                content: "hi".to_string(),
            }],
            max_tokens: 1500,
            temperature: 0.3,
            system: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "claude-test");
        assert_eq!(json["max_tokens"], 1500);
        assert!(json.get("system").is_none());
    }

    #[test]
    #[serial]
    fn test_missing_api_key_is_misconfiguration() {
        let var = "REELSMITH_TEST_ANTHROPIC_KEY_MISSING";
        unsafe {
            std::env::remove_var(var);
        }
        let mut config = Config::default();
        config.llm.anthropic = Some(ProviderConfig {
            api_key_env: Some(var.to_string()),
            ..ProviderConfig::default()
        });

        match AnthropicBackend::new_from_config(&config) {
            Err(LlmError::Misconfiguration(msg)) => assert!(msg.contains(var)),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected a missing key to fail"),
        }
    }

    #[test]
    #[serial]
    fn test_model_follows_class() {
        let var = "REELSMITH_TEST_ANTHROPIC_KEY_PRESENT";
        unsafe {
            std::env::set_var(var, "test-key");
        }
        let mut config = Config::default();
        config.llm.anthropic = Some(ProviderConfig {
            api_key_env: Some(var.to_string()),
            fast_model: Some("fast-model".to_string()),
            ..ProviderConfig::default()
        });
        let backend = AnthropicBackend::new_from_config(&config).unwrap();
        unsafe {
            std::env::remove_var(var);
        }

        assert_eq!(crate::model_for(&backend.settings, ModelClass::Fast), "fast-model");
        assert_eq!(
            crate::model_for(&backend.settings, ModelClass::HighQuality),
            "claude-opus-4-20250514"
        );
    }
}
