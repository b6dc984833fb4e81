//! Logging and observability for reelsmith runs.
//!
//! Structured logging goes through `tracing`. This module installs the
//! subscriber and provides the span/event helpers the pipeline uses so every
//! stage carries the same `run_id`, `stage` and `iteration` fields.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::{Level, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise verbose mode logs reelsmith at debug and
/// everything else at info; quiet mode logs reelsmith at info and the rest at warn.
///
/// # Arguments
/// * `verbose` - include targets and span close events
/// * `json` - emit one JSON object per event instead of compact text
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool, json: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("reelsmith=debug,info")
            } else {
                EnvFilter::try_new("reelsmith=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span covering one stage call of a run.
pub fn stage_span(run_id: &str, stage: &str, iteration: u32) -> tracing::Span {
    span!(
        Level::INFO,
        "stage",
        run_id = %run_id,
        stage = %stage,
        iteration = iteration,
    )
}

pub fn log_stage_start(run_id: &str, stage: &str, iteration: u32) {
    info!(
        run_id = %run_id,
        stage = %stage,
        iteration = iteration,
        "Starting stage"
    );
}

pub fn log_stage_complete(run_id: &str, stage: &str, duration_ms: u128) {
    info!(
        run_id = %run_id,
        stage = %stage,
        duration_ms = %duration_ms,
        "Stage completed"
    );
}

pub fn log_stage_error(run_id: &str, stage: &str, error: &str, duration_ms: u128) {
    error!(
        run_id = %run_id,
        stage = %stage,
        duration_ms = %duration_ms,
        error = %error,
        "Stage failed"
    );
}

/// Timing of one finished operation.
#[derive(Debug, Clone)]
pub struct TimingInfo {
    pub operation: String,
    pub duration: Duration,
    pub finished_at: DateTime<Utc>,
}

/// Collects per-stage timings for a single run.
///
/// Not shared between runs; the CLI owns one per command invocation.
#[derive(Debug)]
pub struct StageTimer {
    run_id: String,
    started: Instant,
    open: Vec<(String, Instant)>,
    finished: Vec<TimingInfo>,
}

impl StageTimer {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started: Instant::now(),
            open: Vec::new(),
            finished: Vec::new(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Start timing an operation
    pub fn start(&mut self, operation: &str) {
        self.open.push((operation.to_string(), Instant::now()));
    }

    /// Stop the most recent timer with this name and record its duration.
    ///
    /// Returns `None` when no timer with that name is open.
    pub fn finish(&mut self, operation: &str) -> Option<Duration> {
        let position = self.open.iter().rposition(|(name, _)| name == operation)?;
        let (name, started) = self.open.remove(position);
        let duration = started.elapsed();
        log_stage_complete(&self.run_id, &name, duration.as_millis());
        self.finished.push(TimingInfo {
            operation: name,
            duration,
            finished_at: Utc::now(),
        });
        Some(duration)
    }

    #[must_use]
    pub fn timings(&self) -> &[TimingInfo] {
        &self.finished
    }

    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_timer_records_finished_operations() {
        let mut timer = StageTimer::new("run-1");
        timer.start("content");
        timer.start("visual");
        assert!(timer.finish("content").is_some());
        assert!(timer.finish("visual").is_some());

        let names: Vec<_> = timer.timings().iter().map(|t| t.operation.as_str()).collect();
        assert_eq!(names, vec!["content", "visual"]);
        assert_eq!(timer.run_id(), "run-1");
    }

    #[test]
    fn test_stage_timer_finish_unknown_returns_none() {
        let mut timer = StageTimer::new("run-2");
        assert!(timer.finish("never-started").is_none());
        assert!(timer.timings().is_empty());
    }

    #[test]
    fn test_stage_span_is_constructible_without_subscriber() {
        let span = stage_span("run-3", "code", 1);
        let _guard = span.enter();
        log_stage_start("run-3", "code", 1);
        log_stage_error("run-3", "code", "boom", 3);
    }
}
