//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Discovers Config with the CLI overrides
//! - Installs the tracing subscriber
//! - Creates the tokio runtime and dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;
use crate::utils::logging::init_tracing;
use crate::{Config, ExitCode, ReelsmithError};

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns `Err(ExitCode)` on failure.
/// main.rs only maps the code to `std::process::exit`.
pub fn run() -> Result<(), ExitCode> {
    run_cli(Cli::parse())
}

/// [`run`] for an already parsed command line.
pub fn run_cli(cli: Cli) -> Result<(), ExitCode> {
    let config = match Config::discover(&cli.config_overrides()) {
        Ok(config) => config,
        Err(err) => return Err(report_error(&err, "config")),
    };

    if let Err(e) = init_tracing(cli.verbose || config.verbose(), cli.log_json) {
        eprintln!("⚠ Logging disabled: {e}");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let operation = cli.operation();
    let result = rt.block_on(async {
        match &cli.command {
            Commands::Generate {
                topic,
                context_file,
                no_render,
                json,
                ..
            } => {
                commands::execute_generate_command(
                    topic,
                    context_file.as_deref(),
                    *no_render,
                    *json,
                    &config,
                )
                .await
            }
            Commands::Render { script, .. } => {
                commands::execute_render_command(script, &config).await
            }
            Commands::Plan { json, .. } => commands::execute_plan_command(*json, &config),
            Commands::Parse { file } => commands::execute_parse_command(file.as_deref()),
            Commands::Config => commands::execute_config_command(&config),
        }
    });

    result.map_err(|error| report_error(&error, operation))
}

/// Print `error` for the user and pick the exit code.
fn report_error(error: &anyhow::Error, operation: &str) -> ExitCode {
    if let Some(err) = error.downcast_ref::<ReelsmithError>() {
        eprint!("{}", err.display_for_user());
        return err.to_exit_code();
    }

    eprintln!("✗ {operation} failed: {error:#}");
    if let Some(suggestions) = enhance_error_context(error) {
        eprintln!("\n  Suggestions:");
        for (i, suggestion) in suggestions.iter().enumerate() {
            eprintln!("    {}. {}", i + 1, suggestion);
        }
    }
    eprintln!("\n  Run with --verbose for more detailed output");
    ExitCode::INTERNAL
}

/// Suggestions for common failures that do not carry a typed error.
fn enhance_error_context(error: &anyhow::Error) -> Option<Vec<&'static str>> {
    let text = format!("{error:#}");

    if text.contains("Permission denied") {
        Some(vec![
            "Check file and directory permissions",
            "Use --output-dir to write somewhere else",
        ])
    } else if text.contains("No such file or directory") {
        Some(vec![
            "Verify the specified paths exist",
            "Check that you're running from the correct directory",
        ])
    } else if text.contains("Failed to read stdin") {
        Some(vec!["Pass the input as a file argument instead"])
    } else {
        None
    }
}
