//! OpenAI-compatible chat completions backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use reelsmith_config::{Config, ResolvedProvider};
use reelsmith_utils::error::LlmError;

use crate::http_client::HttpClient;
use crate::types::{GenerationBackend, LlmInvocation, LlmResult, Role};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
    settings: ResolvedProvider,
    timeout: Duration,
}

impl OpenAiBackend {
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
        let settings = config.provider_settings("openai");
        let api_key = crate::api_key(&settings)?;
        Self::new(api_key, settings, config.llm_timeout())
    }

    fn request_body<'a>(inv: &LlmInvocation, model: &'a str, json_mode: bool) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: inv
                .messages()
                .into_iter()
                .map(|m| ChatMessage {
                    role: match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    content: m.content,
                })
                .collect(),
            max_tokens: inv.max_tokens,
            temperature: inv.temperature,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        }
    }

    async fn complete(&self, inv: &LlmInvocation, json_mode: bool) -> Result<LlmResult, LlmError> {
        let model = crate::model_for(&self.settings, inv.model_class);
        debug!(
            provider = "openai",
            model,
            stage = %inv.stage,
            max_tokens = inv.max_tokens,
            temperature = inv.temperature,
            json_mode,
            "Invoking generation backend"
        );

        let request = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(inv, model, json_mode));

        let response = self.client.execute(request, self.timeout, "openai").await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to parse OpenAI response: {e}")))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                LlmError::MalformedOutput("OpenAI response missing message content".to_string())
            })?;

        let mut result = LlmResult::new(text, "openai", model);
        if let Some(usage) = body.usage {
            result = result.with_tokens(usage.prompt_tokens, usage.completion_tokens);
        }
        Ok(result)
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn generate(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.complete(inv, false).await
    }

    /// Uses the provider's JSON mode on top of the reframed prompt.
    async fn generate_structured(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.complete(&inv.as_structured(), true).await
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}
