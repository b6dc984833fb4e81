//! End-to-end job runs against scripted collaborators.
//!
//! Every test drives `VideoJob` through the public `reelsmith` API with a
//! `ScriptedBackend` and, where rendering is involved, a `ScriptedRenderer`.

use std::sync::Arc;
use std::time::Duration;

use reelsmith::llm::{BudgetedBackend, LlmError, RetryPolicy, ScriptedBackend};
use reelsmith::orchestrator::fixtures::{self, passing_backend};
use reelsmith::orchestrator::{ChannelProgress, JobStatus, ProgressEvent};
use reelsmith::render::ScriptedRenderer;
use reelsmith::utils::error::PipelineError;
use reelsmith::{
    ExitCode, GenerationBackend, GenerationRequest, InMemorySessionStore, ModelClass,
    Orchestrator, ProgressReporter, ReelsmithError, SessionStore, VideoJob,
};
use tempfile::TempDir;
use tokio::sync::mpsc;

fn orchestrator(backend: Arc<dyn GenerationBackend>) -> Orchestrator {
    Orchestrator::new(backend).with_retry(RetryPolicy::new(2, Duration::ZERO))
}

fn request(minutes: u32) -> GenerationRequest {
    GenerationRequest::from_minutes("How derivatives measure change", ModelClass::Fast, minutes)
        .unwrap()
}

fn reporter() -> (ProgressReporter, mpsc::UnboundedReceiver<ProgressEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressReporter::new(Arc::new(ChannelProgress::new(tx))), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[tokio::test]
async fn test_short_video_renders_after_one_repair() {
    let dir = TempDir::new().unwrap();
    let rendered = dir.path().join("media").join("DerivativeScene.mp4");
    std::fs::create_dir_all(rendered.parent().unwrap()).unwrap();
    std::fs::write(&rendered, b"mp4").unwrap();

    let backend = Arc::new(passing_backend(1));
    let renderer = Arc::new(
        ScriptedRenderer::new()
            .with_failure("NameError: name 'ShowCreation' is not defined")
            .with_success(&rendered),
    );
    let store = Arc::new(InMemorySessionStore::new());
    let job = VideoJob::new(orchestrator(backend.clone()), store.clone(), dir.path())
        .with_renderer(renderer.clone(), 3);

    let (progress, mut rx) = reporter();
    let outcome = job.run("s-1", request(1), &progress).await.unwrap();

    let video = dir.path().join("generated_how_derivatives_measure_change.mp4");
    assert_eq!(outcome.artifact(), video.as_path());
    assert!(video.exists());
    assert!(outcome.script_path.exists());
    assert_eq!(outcome.render_attempts.len(), 2);
    assert!(outcome.pipeline.fast_path);
    assert_eq!(renderer.sources().len(), 2);

    let events = drain(&mut rx);
    let last = events.last().unwrap();
    assert!(last.terminal);
    assert_eq!(last.stage, "completed");
    assert_eq!(last.progress, 1.0);
    assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));

    let session = store.get("s-1").await.unwrap();
    assert_eq!(session.status.status, JobStatus::Completed);
    assert_eq!(session.status.artifact_path.as_deref(), Some(video.as_path()));
    assert_eq!(session.messages.len(), 2);
}

#[tokio::test]
async fn test_long_video_refines_thin_content() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(passing_backend(12));
    backend.push_text("content", fixtures::thin_content());

    let job = VideoJob::new(
        orchestrator(backend.clone()),
        Arc::new(InMemorySessionStore::new()),
        dir.path(),
    );
    let outcome = job
        .run("s-2", request(12), &ProgressReporter::null())
        .await
        .unwrap();

    assert_eq!(outcome.pipeline.iterations, 2);
    assert!(!outcome.pipeline.fast_path);
    assert!(outcome.video_path.is_none());

    let content_calls = backend.calls_for("content");
    assert_eq!(content_calls.len(), 2);
    assert!(content_calls[1].prompt.contains("Previous content was too brief"));

    let script = std::fs::read_to_string(&outcome.script_path).unwrap();
    assert!(script.contains("class DerivativeScene(Scene)"));
}

#[tokio::test]
async fn test_weak_plan_is_best_effort_unless_strict() {
    let weak_plan = fixtures::visual_plan_json(1, 0);

    let dir = TempDir::new().unwrap();
    let backend = Arc::new(passing_backend(1).with_repeat("visual_plan", weak_plan.clone()));
    let job = VideoJob::new(
        orchestrator(backend),
        Arc::new(InMemorySessionStore::new()),
        dir.path(),
    );
    let outcome = job
        .run("s-3", request(1), &ProgressReporter::null())
        .await
        .unwrap();
    assert!(!outcome.pipeline.report.valid);
    assert!(outcome.script_path.exists());

    let backend = Arc::new(passing_backend(1).with_repeat("visual_plan", weak_plan));
    let store = Arc::new(InMemorySessionStore::new());
    let job = VideoJob::new(
        orchestrator(backend).with_best_effort(false),
        store.clone(),
        dir.path(),
    );
    let err = job
        .run("s-4", request(1), &ProgressReporter::null())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ReelsmithError::Pipeline(PipelineError::QualityShortfall { .. })
    ));
    assert_eq!(err.to_exit_code(), ExitCode::GENERATION_FAILURE);
    let session = store.get("s-4").await.unwrap();
    assert_eq!(session.status.status, JobStatus::Failed);
    assert!(session.status.error.is_some());
}

#[tokio::test]
async fn test_call_budget_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let scripted: Arc<dyn GenerationBackend> = Arc::new(passing_backend(1));
    let backend = BudgetedBackend::wrap(scripted, Some(1));

    let job = VideoJob::new(
        orchestrator(backend),
        Arc::new(InMemorySessionStore::new()),
        dir.path(),
    );
    let (progress, mut rx) = reporter();
    let err = job.run("s-5", request(1), &progress).await.unwrap_err();

    assert!(matches!(
        &err,
        ReelsmithError::Pipeline(PipelineError::Generation {
            source: LlmError::BudgetExceeded { limit: 1, .. },
            ..
        })
    ));
    assert_eq!(err.to_exit_code(), ExitCode::PROVIDER_FAILURE);

    let last = drain(&mut rx).pop().unwrap();
    assert!(last.terminal);
    assert_eq!(last.stage, "failed");
}

#[tokio::test]
async fn test_follow_up_request_carries_history() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(passing_backend(1));
    let store = Arc::new(InMemorySessionStore::new());
    let job = VideoJob::new(orchestrator(backend.clone()), store.clone(), dir.path());

    job.run("s-6", request(1), &ProgressReporter::null())
        .await
        .unwrap();
    let follow_up =
        GenerationRequest::from_minutes("Now show the chain rule", ModelClass::Fast, 1).unwrap();
    job.run("s-6", follow_up, &ProgressReporter::null())
        .await
        .unwrap();

    let content_calls = backend.calls_for("content");
    let last_prompt = &content_calls.last().unwrap().prompt;
    assert!(last_prompt.contains("Previous conversation:"));
    assert!(last_prompt.contains("user: How derivatives measure change"));
    assert_eq!(store.get("s-6").await.unwrap().messages.len(), 4);
}

#[tokio::test]
async fn test_backend_outage_surfaces_after_retries() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_error("content", LlmError::ProviderOutage("503".to_string()))
            .with_error("content", LlmError::ProviderOutage("503".to_string())),
    );

    let job = VideoJob::new(
        orchestrator(backend.clone()),
        Arc::new(InMemorySessionStore::new()),
        dir.path(),
    );
    let err = job
        .run("s-7", request(2), &ProgressReporter::null())
        .await
        .unwrap_err();

    assert_eq!(backend.calls_for("content").len(), 2);
    assert_eq!(err.to_exit_code(), ExitCode::PROVIDER_FAILURE);
    assert!(err.display_for_user().contains("Suggestions:"));
}
