//! Pipeline orchestration for reelsmith
//!
//! [`Orchestrator`] runs Content → Visual-Plan → Code with bounded refinement
//! and a concurrent fast path for short videos. [`VideoJob`] wraps it with a
//! persisted script, render recovery and session bookkeeping.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reelsmith_config::Config;
//! use reelsmith_model::GenerationRequest;
//! use reelsmith_orchestrator::{Orchestrator, ProgressReporter, TracingProgress};
//! use reelsmith_utils::types::ModelClass;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let backend = reelsmith_llm::from_config(&config)?;
//! let orchestrator = Orchestrator::from_config(backend, &config);
//!
//! let request = GenerationRequest::from_minutes("Explain eigenvectors", ModelClass::Fast, 2)?;
//! let progress = ProgressReporter::new(Arc::new(TracingProgress));
//! let output = orchestrator.run(&request, &progress).await?;
//! println!("{}", output.code.source);
//! # Ok(())
//! # }
//! ```

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;
mod job;
mod normalize;
mod pipeline;
mod progress;
pub mod prompts;
mod session;
mod state;

pub use job::{
    COMPLETE_PROGRESS, JobOutcome, REPAIR_PROGRESS, RENDER_PROGRESS, VideoJob, context_prompt,
};
pub use normalize::{normalize_content, parse_code, parse_content, parse_visual_plan};
pub use pipeline::{
    CODE_PROGRESS, CONTENT_PROGRESS, DEFAULT_FAST_PATH_MAX_MINUTES, GENERATION_PROGRESS,
    Orchestrator, PipelineOutput, STAGE_ORDER, stage_budget, stage_temperature,
};
pub use progress::{
    ChannelProgress, NullProgress, ProgressEvent, ProgressReporter, ProgressSink, StderrProgress,
    TracingProgress, format_line,
};
pub use reelsmith_utils::error::PipelineError;
pub use session::{InMemorySessionStore, JobStatus, Session, SessionStatus, SessionStore};
pub use state::PipelineState;
