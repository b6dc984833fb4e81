//! Core types of the generation collaborator boundary

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use reelsmith_utils::error::LlmError;
use reelsmith_utils::types::ModelClass;

/// System prompt used when a call does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

const JSON_SYSTEM_SUFFIX: &str = "You must output valid JSON and nothing else. Do not use \
     markdown code blocks. Do not add any explanatory text before or after the JSON. \
     Ensure all strings are properly quoted and escaped.";

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Input to one generation call.
///
/// `stage` is a label for logs and test doubles; backends never send it.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmInvocation {
    pub stage: String,
    pub model_class: ModelClass,
    pub system: Option<String>,
    pub prompt: String,
    /// Shape the answer must follow, as example JSON. Only used by structured calls.
    pub schema_hint: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmInvocation {
    #[must_use]
    pub fn new(stage: impl Into<String>, model_class: ModelClass, prompt: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            model_class,
            system: None,
            prompt: prompt.into(),
            schema_hint: None,
            temperature: 0.7,
            max_tokens: 4096,
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_schema_hint(mut self, schema: impl Into<String>) -> Self {
        self.schema_hint = Some(schema.into());
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// System prompt as sent, falling back to [`DEFAULT_SYSTEM_PROMPT`].
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        self.system.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    /// The same call reframed to demand bare JSON following the schema hint.
    #[must_use]
    pub fn as_structured(&self) -> Self {
        let mut prompt = format!(
            "Generate a JSON response for the following request. Output only the JSON object, \
             nothing else.\n\n{}",
            self.prompt
        );
        if let Some(schema) = &self.schema_hint {
            prompt.push_str("\n\nThe JSON must follow this exact schema:\n");
            prompt.push_str(schema);
        }
        prompt.push_str("\n\nStart your response with { and end with }. No other text.");

        Self {
            system: Some(format!("{}\n\n{JSON_SYSTEM_SUFFIX}", self.system_prompt())),
            prompt,
            ..self.clone()
        }
    }

    /// Conversation sent to chat-style providers.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system_prompt()),
            Message::user(self.prompt.clone()),
        ]
    }
}

/// Result of one generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResult {
    pub text: String,
    pub provider: String,
    pub model_used: String,
    pub tokens_input: Option<u64>,
    pub tokens_output: Option<u64>,
}

impl LlmResult {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        provider: impl Into<String>,
        model_used: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            provider: provider.into(),
            model_used: model_used.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }

    #[must_use]
    pub const fn with_tokens(mut self, input: u64, output: u64) -> Self {
        self.tokens_input = Some(input);
        self.tokens_output = Some(output);
        self
    }
}

/// A generation collaborator.
///
/// Both operations return raw text; callers run the structured-output parser
/// over the result of [`generate_structured`](Self::generate_structured).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Provider name used in logs.
    fn provider(&self) -> &str;

    /// One free-form call.
    ///
    /// # Errors
    ///
    /// Returns `LlmError` for transport, provider, timeout and budget failures.
    async fn generate(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError>;

    /// One call whose answer should be a JSON record.
    ///
    /// # Errors
    ///
    /// Same as [`generate`](Self::generate).
    async fn generate_structured(&self, inv: &LlmInvocation) -> Result<LlmResult, LlmError> {
        self.generate(&inv.as_structured()).await
    }
}
