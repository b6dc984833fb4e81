use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reelsmith_utils::types::ModelClass;

/// Words of the topic kept in artifact file names.
const SLUG_WORDS: usize = 5;

/// Rejected request input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("target duration must be greater than zero")]
    ZeroDuration,
}

/// One user request, fixed for the lifetime of a run.
///
/// Fields are private so a request cannot change once the orchestrator holds it.
///
/// # Example
///
/// ```rust
/// use reelsmith_model::GenerationRequest;
/// use reelsmith_utils::types::ModelClass;
///
/// let request = GenerationRequest::new("Show how derivatives work", ModelClass::Fast, 90)
///     .expect("valid request");
/// assert_eq!(request.duration_minutes(), 2);
/// assert_eq!(request.slug(), "generated_show_how_derivatives_work");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    topic: String,
    context: Option<String>,
    model_class: ModelClass,
    duration_secs: u32,
}

impl GenerationRequest {
    /// Build a request from a topic and a target duration in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] for a blank topic or a zero duration.
    pub fn new(
        topic: impl Into<String>,
        model_class: ModelClass,
        duration_secs: u32,
    ) -> Result<Self, RequestError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(RequestError::EmptyTopic);
        }
        if duration_secs == 0 {
            return Err(RequestError::ZeroDuration);
        }
        Ok(Self {
            topic,
            context: None,
            model_class,
            duration_secs,
        })
    }

    /// Build a request from whole minutes.
    ///
    /// # Errors
    ///
    /// Same as [`GenerationRequest::new`].
    pub fn from_minutes(
        topic: impl Into<String>,
        model_class: ModelClass,
        minutes: u32,
    ) -> Result<Self, RequestError> {
        Self::new(topic, model_class, minutes.saturating_mul(60))
    }

    /// Attach free-form conversation context. Blank context is dropped.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = if context.trim().is_empty() {
            None
        } else {
            Some(context)
        };
        self
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    #[must_use]
    pub const fn model_class(&self) -> ModelClass {
        self.model_class
    }

    #[must_use]
    pub const fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Target duration rounded up to whole minutes, never below 1.
    #[must_use]
    pub const fn duration_minutes(&self) -> u32 {
        let minutes = self.duration_secs.div_ceil(60);
        if minutes == 0 { 1 } else { minutes }
    }

    /// File-name stem derived from the first words of the topic.
    #[must_use]
    pub fn slug(&self) -> String {
        let words: Vec<String> = self
            .topic
            .split_whitespace()
            .map(|w| {
                w.chars()
                    .filter(char::is_ascii_alphanumeric)
                    .collect::<String>()
                    .to_ascii_lowercase()
            })
            .filter(|w| !w.is_empty())
            .take(SLUG_WORDS)
            .collect();

        if words.is_empty() {
            "generated_video".to_string()
        } else {
            format!("generated_{}", words.join("_"))
        }
    }
}

/// One prior turn of the conversation a request continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

/// Short identifier for one run, unique enough to name logs and sessions.
#[must_use]
pub fn new_run_id(topic: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(topic.as_bytes());
    hasher.update(
        Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_le_bytes()
            .as_slice(),
    );
    hasher.finalize().to_hex()[..12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_topic_and_zero_duration() {
        assert_eq!(
            GenerationRequest::new("   ", ModelClass::Fast, 60),
            Err(RequestError::EmptyTopic)
        );
        assert_eq!(
            GenerationRequest::new("limits", ModelClass::Fast, 0),
            Err(RequestError::ZeroDuration)
        );
    }

    #[test]
    fn test_duration_minutes_rounds_up() {
        let at = |secs| {
            GenerationRequest::new("t", ModelClass::HighQuality, secs)
                .unwrap()
                .duration_minutes()
        };
        assert_eq!(at(1), 1);
        assert_eq!(at(60), 1);
        assert_eq!(at(61), 2);
        assert_eq!(at(720), 12);
    }

    #[test]
    fn test_slug_keeps_first_five_clean_words() {
        let request = GenerationRequest::from_minutes(
            "Explain the Taylor series, with examples!",
            ModelClass::Fast,
            3,
        )
        .unwrap();
        assert_eq!(request.slug(), "generated_explain_the_taylor_series_with");

        let symbols = GenerationRequest::new("∑ ∫", ModelClass::Fast, 60).unwrap();
        assert_eq!(symbols.slug(), "generated_video");
    }

    #[test]
    fn test_blank_context_is_dropped() {
        let request = GenerationRequest::new("t", ModelClass::Fast, 60)
            .unwrap()
            .with_context("  \n");
        assert_eq!(request.context(), None);
    }

    #[test]
    fn test_run_ids_are_short_hex() {
        let id = new_run_id("topic");
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
