//! Command-line interface for reelsmith
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations
//! - `tests`: Test module (cfg(test) only)

pub mod args;
mod commands;
mod run;


pub use args::{Cli, Commands};
pub use commands::{PlanReport, StagePlan, build_plan, parse_input};
pub use run::{run, run_cli};
