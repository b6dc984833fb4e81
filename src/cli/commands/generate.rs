//! Generate command implementation
//!
//! Handles `reelsmith generate`: the full job from topic to rendered video.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use super::common::{ensure_render_binary, request_error};
use crate::llm::BudgetedBackend;
use crate::model::new_run_id;
use crate::utils::logging::StageTimer;
use crate::{
    Config, GenerationRequest, InMemorySessionStore, ProgressReporter, ReelsmithError,
    StderrProgress, VideoJob,
};

/// Execute the generate command
///
/// Prints the final artifact path (video, or script with `--no-render`) on stdout.
pub async fn execute_generate_command(
    topic: &str,
    context_file: Option<&Path>,
    no_render: bool,
    json: bool,
    config: &Config,
) -> Result<()> {
    let session_id = new_run_id(topic);
    let mut timer = StageTimer::new(session_id.clone());
    timer.start("setup");

    let mut request =
        GenerationRequest::from_minutes(topic, config.model_class(), config.duration_minutes())
            .map_err(|e| request_error(&e))?;

    if let Some(path) = context_file {
        let context = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file: {}", path.display()))?;
        request = request.with_context(context);
    }

    if !no_render {
        let binary = ensure_render_binary(config)?;
        info!(binary = %binary.display(), "Using renderer");
    }

    let backend = crate::llm::from_config(config).map_err(ReelsmithError::from)?;
    let backend = BudgetedBackend::wrap(backend, config.call_budget());

    let mut job = VideoJob::from_config(backend, Arc::new(InMemorySessionStore::new()), config);
    if no_render {
        job = job.without_render();
    }
    timer.finish("setup");

    info!(
        session_id = %session_id,
        minutes = request.duration_minutes(),
        model_class = %request.model_class(),
        output_dir = %job.output_dir().display(),
        "Generating video"
    );

    timer.start("job");
    let progress = ProgressReporter::new(Arc::new(StderrProgress));
    let outcome = job.run(&session_id, request, &progress).await?;
    timer.finish("job");

    let report = &outcome.pipeline.report;
    if !report.valid {
        warn!(
            issues = report.issues.len(),
            "Returning best-effort result below quality thresholds"
        );
        eprintln!("⚠ The result is below the quality thresholds:");
        for issue in report.issue_messages() {
            eprintln!("  - {issue}");
        }
    }

    if config.verbose() {
        for timing in timer.timings() {
            eprintln!("  {}: {:.2}s", timing.operation, timing.duration.as_secs_f64());
        }
        eprintln!("  total: {:.2}s", timer.total_elapsed().as_secs_f64());
    }

    if json {
        let rendered =
            serde_json::to_string_pretty(&outcome).context("Failed to serialize job outcome")?;
        println!("{rendered}");
    } else {
        println!("{}", outcome.artifact().display());
    }

    Ok(())
}
