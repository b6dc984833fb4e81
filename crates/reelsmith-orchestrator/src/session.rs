//! Session bookkeeping for job runs.
//!
//! Storage is an injected collaborator; nothing here is process-wide.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

use reelsmith_model::ConversationMessage;

/// Lifecycle of one job.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Rendering,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Externally visible state of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub status: JobStatus,
    pub current_stage: Option<String>,
    pub progress: f64,
    pub message: Option<String>,
    pub artifact_path: Option<PathBuf>,
    pub error: Option<String>,
    #[serde(default)]
    pub details: Value,
    pub updated_at: DateTime<Utc>,
}

impl SessionStatus {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            status: JobStatus::Pending,
            current_stage: None,
            progress: 0.0,
            message: None,
            artifact_path: None,
            error: None,
            details: Value::Null,
            updated_at: Utc::now(),
        }
    }
}

/// A session's status plus its conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub status: SessionStatus,
    pub messages: Vec<ConversationMessage>,
}

impl Session {
    #[must_use]
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::new(session_id),
            messages: Vec::new(),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<Session>;

    /// Replace the stored status, creating the session if needed.
    async fn put(&self, status: SessionStatus);

    /// Append one message to the history, creating the session if needed.
    async fn append_message(&self, session_id: &str, message: ConversationMessage);
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.read().await.get(session_id).cloned()
    }

    async fn put(&self, mut status: SessionStatus) {
        status.updated_at = Utc::now();
        let id = status.session_id.clone();
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id))
            .status = status;
    }

    async fn append_message(&self, session_id: &str, message: ConversationMessage) {
        self.sessions
            .write()
            .await
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id))
            .messages
            .push(message);
    }
}
