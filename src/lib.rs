//! reelsmith - topic-to-animation pipeline
//!
//! reelsmith turns a topic and a target length into a Manim scene module and,
//! when the renderer is available, a rendered video. Each run goes through three
//! budgeted generation stages (content, visual plan, code), is gated by
//! duration-aware quality checks, and repairs the script between failed renders.
//!
//! reelsmith can be used in two ways:
//! - **CLI**: run `reelsmith generate "<topic>" --duration 3`
//! - **Library**: embed [`VideoJob`] or [`Orchestrator`] with your own
//!   [`GenerationBackend`], [`Renderer`] and [`SessionStore`]
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Print the budgets a 4-minute run would use (no external calls)
//! reelsmith plan --duration 4
//!
//! # Generate the script only
//! reelsmith generate "How Fourier series approximate a square wave" --no-render
//!
//! # Show the effective configuration with sources
//! reelsmith config
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reelsmith::{
//!     Config, GenerationRequest, InMemorySessionStore, ModelClass, ProgressReporter,
//!     TracingProgress, VideoJob,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let backend = reelsmith::llm::from_config(&config)?;
//! let job = VideoJob::from_config(backend, Arc::new(InMemorySessionStore::new()), &config);
//!
//! let request = GenerationRequest::from_minutes("Explain eigenvectors", ModelClass::Fast, 2)?;
//! let progress = ProgressReporter::new(Arc::new(TracingProgress));
//! let outcome = job.run("session-1", request, &progress).await?;
//! println!("{}", outcome.artifact().display());
//! # Ok(())
//! # }
//! ```
//!
//! # Stable Public API
//!
//! - [`Config`] and [`ConfigBuilder`] - Configuration management
//! - [`GenerationRequest`] - One user request
//! - [`Orchestrator`] and [`VideoJob`] - Pipeline and end-to-end job
//! - [`ReelsmithError`] - Library error type
//! - [`ExitCode`] - CLI exit codes
//!
//! The member crates are re-exported as modules for everything else.

pub mod cli;

pub use reelsmith_budget as budget;
pub use reelsmith_config as config;
pub use reelsmith_extraction as extraction;
pub use reelsmith_llm as llm;
pub use reelsmith_model as model;
pub use reelsmith_orchestrator as orchestrator;
pub use reelsmith_render as render;
pub use reelsmith_utils as utils;
pub use reelsmith_validation as validation;

pub use reelsmith_config::{CliArgs, Config, ConfigBuilder};
pub use reelsmith_llm::GenerationBackend;
pub use reelsmith_model::{ConversationMessage, GenerationRequest};
pub use reelsmith_orchestrator::{
    InMemorySessionStore, JobOutcome, Orchestrator, PipelineOutput, ProgressReporter,
    SessionStore, StderrProgress, TracingProgress, VideoJob,
};
pub use reelsmith_render::Renderer;
pub use reelsmith_utils::types::ModelClass;
pub use reelsmith_utils::{ExitCode, ReelsmithError};
