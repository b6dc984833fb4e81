//! CLI command implementations (facade).
//!
//! `run.rs` dispatches to the `execute_*` handlers re-exported here.

mod common;
mod config;
mod generate;
mod parse;
mod plan;
mod render;

pub use config::execute_config_command;
pub use generate::execute_generate_command;
pub use parse::{execute_parse_command, parse_input};
pub use plan::{PlanReport, StagePlan, build_plan, execute_plan_command};
pub use render::execute_render_command;
