//! One-way progress notifications.
//!
//! Sinks are fire-and-forget: `notify` cannot fail and must not block, so a
//! slow or closed consumer never affects a run. [`ProgressReporter`] sits in
//! front of a sink and enforces ordering.

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

/// One notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub stage: String,
    pub message: String,
    /// Fraction in `0.0..=1.0`.
    pub progress: f64,
    /// Set on the last event of a run, success or failure.
    pub terminal: bool,
}

pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn notify(&self, _event: &ProgressEvent) {}
}

/// Emits each event as a `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn notify(&self, event: &ProgressEvent) {
        info!(
            stage = %event.stage,
            progress = event.progress,
            terminal = event.terminal,
            "{}",
            event.message
        );
    }
}

/// CLI sink: a status line on stderr plus the tracing record.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn notify(&self, event: &ProgressEvent) {
        eprintln!("{}", format_line(event));
        TracingProgress.notify(event);
    }
}

/// Forwards events to an async consumer. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    #[must_use]
    pub const fn new(tx: UnboundedSender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgress {
    fn notify(&self, event: &ProgressEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// `[ 40%] visual_plan: Designing visual plan`
#[must_use]
pub fn format_line(event: &ProgressEvent) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (event.progress * 100.0).round() as u32;
    format!("[{percent:>3}%] {}: {}", event.stage, event.message)
}

#[derive(Debug, Default)]
struct Ordering {
    high_water: f64,
    finished: bool,
}

/// Orders notifications for one run.
///
/// Fractions never go backwards: a lower value than one already reported is
/// raised to the high-water mark, which is what happens when a refinement
/// iteration re-enters the Content stage. Nothing is forwarded after the
/// terminal event.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    ordering: Arc<Mutex<Ordering>>,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter").finish_non_exhaustive()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::null()
    }
}

impl ProgressReporter {
    #[must_use]
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            sink,
            ordering: Arc::new(Mutex::new(Ordering::default())),
        }
    }

    #[must_use]
    pub fn null() -> Self {
        Self::new(Arc::new(NullProgress))
    }

    pub fn report(&self, stage: &str, message: &str, progress: f64) {
        self.emit(stage, message, progress, false);
    }

    /// Send the terminal event. Later calls are dropped.
    pub fn finish(&self, stage: &str, message: &str, progress: f64) {
        self.emit(stage, message, progress, true);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ordering
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .finished
    }

    fn emit(&self, stage: &str, message: &str, progress: f64, terminal: bool) {
        let event = {
            let mut ordering = self.ordering.lock().unwrap_or_else(PoisonError::into_inner);
            if ordering.finished {
                return;
            }
            let progress = progress.clamp(0.0, 1.0).max(ordering.high_water);
            ordering.high_water = progress;
            ordering.finished = terminal;
            ProgressEvent {
                stage: stage.to_string(),
                message: message.to_string(),
                progress,
                terminal,
            }
        };
        self.sink.notify(&event);
    }
}
