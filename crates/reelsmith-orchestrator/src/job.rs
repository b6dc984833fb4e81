//! End-to-end job: pipeline, persisted script, render with recovery.

use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use reelsmith_config::Config;
use reelsmith_llm::GenerationBackend;
use reelsmith_model::{ConversationMessage, GenerationRequest};
use reelsmith_render::{
    AttemptOutcome, DEFAULT_MAX_ATTEMPTS, ManimRenderer, RenderAttempt, Renderer,
    render_with_recovery_observed,
};
use reelsmith_utils::error::ReelsmithError;

use crate::pipeline::{Orchestrator, PipelineOutput};
use crate::progress::ProgressReporter;
use crate::session::{JobStatus, SessionStatus, SessionStore};

/// Progress reported when the first render attempt starts.
pub const RENDER_PROGRESS: f64 = 0.8;

/// Progress reported while a repaired script is re-rendered.
pub const REPAIR_PROGRESS: f64 = 0.85;

/// Progress of the terminal event of a completed job.
pub const COMPLETE_PROGRESS: f64 = 1.0;

/// Result of a finished job.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub session_id: String,
    pub script_path: PathBuf,
    /// `None` when rendering was skipped.
    pub video_path: Option<PathBuf>,
    pub render_attempts: Vec<RenderAttempt>,
    pub pipeline: PipelineOutput,
}

impl JobOutcome {
    /// The file the caller asked for: the video, or the script when not rendering.
    #[must_use]
    pub fn artifact(&self) -> &Path {
        self.video_path.as_deref().unwrap_or(&self.script_path)
    }
}

/// `Previous conversation:` block built from a session's history.
#[must_use]
pub fn context_prompt(history: &[ConversationMessage]) -> Option<String> {
    if history.is_empty() {
        return None;
    }
    let mut prompt = String::from("Previous conversation:\n");
    for message in history {
        prompt.push_str(&message.role);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }
    Some(prompt)
}

pub struct VideoJob {
    orchestrator: Orchestrator,
    store: Arc<dyn SessionStore>,
    output_dir: PathBuf,
    renderer: Option<Arc<dyn Renderer>>,
    max_render_attempts: u32,
}

impl VideoJob {
    /// A job that stops after writing the script.
    #[must_use]
    pub fn new(
        orchestrator: Orchestrator,
        store: Arc<dyn SessionStore>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            orchestrator,
            store,
            output_dir: output_dir.into(),
            renderer: None,
            max_render_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Job wired from `config`: pipeline settings, output directory and the
    /// `manim` renderer.
    #[must_use]
    pub fn from_config(
        backend: Arc<dyn GenerationBackend>,
        store: Arc<dyn SessionStore>,
        config: &Config,
    ) -> Self {
        Self::new(
            Orchestrator::from_config(backend, config),
            store,
            config.output_dir(),
        )
        .with_renderer(
            Arc::new(ManimRenderer::from_config(config)),
            config.max_render_attempts(),
        )
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>, max_attempts: u32) -> Self {
        self.renderer = Some(renderer);
        self.max_render_attempts = max_attempts;
        self
    }

    #[must_use]
    pub fn without_render(mut self) -> Self {
        self.renderer = None;
        self
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run `request` for `session_id`, recording every transition in the store.
    ///
    /// The session's earlier messages become the request's context. The last
    /// progress event is always the terminal `completed` or `failed` one.
    ///
    /// # Errors
    ///
    /// Returns the pipeline, render or filesystem failure that ended the job.
    pub async fn run(
        &self,
        session_id: &str,
        request: GenerationRequest,
        progress: &ProgressReporter,
    ) -> Result<JobOutcome, ReelsmithError> {
        let history = self
            .store
            .get(session_id)
            .await
            .map(|session| session.messages)
            .unwrap_or_default();
        let request = match context_prompt(&history) {
            Some(context) => request.with_context(context),
            None => request,
        };

        self.store
            .append_message(
                session_id,
                ConversationMessage {
                    role: "user".to_string(),
                    content: request.topic().to_string(),
                },
            )
            .await;
        self.record(session_id, JobStatus::Processing, "content", 0.0, |_| {})
            .await;

        match self.execute(session_id, &request, progress).await {
            Ok(outcome) => {
                let artifact = outcome.artifact().to_path_buf();
                info!(session_id, artifact = %artifact.display(), "Job completed");
                self.record(
                    session_id,
                    JobStatus::Completed,
                    "completed",
                    COMPLETE_PROGRESS,
                    |status| {
                        status.artifact_path = Some(artifact.clone());
                        status.details = json!({
                            "iterations": outcome.pipeline.iterations,
                            "render_attempts": outcome.render_attempts.len(),
                            "quality_valid": outcome.pipeline.report.valid,
                        });
                    },
                )
                .await;
                self.store
                    .append_message(
                        session_id,
                        ConversationMessage {
                            role: "assistant".to_string(),
                            content: format!("Created {}", artifact.display()),
                        },
                    )
                    .await;
                progress.finish("completed", "Video ready", COMPLETE_PROGRESS);
                Ok(outcome)
            }
            Err(err) => {
                error!(session_id, error = %err, "Job failed");
                let message = err.to_string();
                self.record(session_id, JobStatus::Failed, "failed", 0.0, |status| {
                    status.error = Some(message.clone());
                })
                .await;
                progress.finish("failed", &message, 0.0);
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        session_id: &str,
        request: &GenerationRequest,
        progress: &ProgressReporter,
    ) -> Result<JobOutcome, ReelsmithError> {
        let pipeline = self.orchestrator.run(request, progress).await?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let slug = request.slug();
        let script_path = self.output_dir.join(format!("{slug}.py"));
        tokio::fs::write(&script_path, &pipeline.code.source).await?;
        info!(session_id, script = %script_path.display(), "Saved scene script");

        let Some(renderer) = &self.renderer else {
            return Ok(JobOutcome {
                session_id: session_id.to_string(),
                script_path,
                video_path: None,
                render_attempts: Vec::new(),
                pipeline,
            });
        };

        self.record(session_id, JobStatus::Rendering, "render", RENDER_PROGRESS, |_| {})
            .await;
        progress.report("render", "Rendering video", RENDER_PROGRESS);

        let mut observer = |attempt: &RenderAttempt| {
            if let (AttemptOutcome::Failed { .. }, Some(rule)) = (&attempt.outcome, attempt.repair) {
                progress.report(
                    "repair",
                    &format!("Render attempt {} failed, applied {rule}", attempt.attempt),
                    REPAIR_PROGRESS,
                );
            }
        };
        let recovered = render_with_recovery_observed(
            renderer.as_ref(),
            &script_path,
            self.max_render_attempts,
            &mut observer,
        )
        .await?;

        let video_path = self.output_dir.join(format!("{slug}.mp4"));
        if recovered.artifact != video_path {
            tokio::fs::copy(&recovered.artifact, &video_path).await?;
        }

        Ok(JobOutcome {
            session_id: session_id.to_string(),
            script_path,
            video_path: Some(video_path),
            render_attempts: recovered.attempts,
            pipeline,
        })
    }

    async fn record(
        &self,
        session_id: &str,
        status: JobStatus,
        stage: &str,
        progress: f64,
        update: impl FnOnce(&mut SessionStatus),
    ) {
        let mut current = self
            .store
            .get(session_id)
            .await
            .map_or_else(|| SessionStatus::new(session_id), |session| session.status);
        current.status = status;
        current.current_stage = Some(stage.to_string());
        // A failure keeps the progress reached so far.
        if status != JobStatus::Failed {
            current.progress = progress;
        }
        current.message = Some(format!("{stage}: {status}"));
        update(&mut current);
        self.store.put(current).await;
    }
}
