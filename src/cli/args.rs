//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface using clap: the global
//! `Cli` struct and the `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::CliArgs;

/// reelsmith - topic to animated explainer video
#[derive(Parser, Debug)]
#[command(name = "reelsmith")]
#[command(about = "Generate Manim explainer videos from a topic using LLM providers")]
#[command(long_about = r#"
reelsmith turns a topic and a target length into a Manim scene module through
three budgeted generation stages (content, visual plan, code), checks the result
against duration-aware quality thresholds, and renders it with automatic repair
of common script failures.

EXAMPLES:
  # Generate and render a 3-minute video
  reelsmith generate "How the Fourier transform decomposes a signal" --duration 3

  # Generate the script only, continuing an earlier conversation
  reelsmith generate "Now show the inverse transform" --context-file chat.txt --no-render

  # Fail instead of returning a script that missed the quality thresholds
  reelsmith generate "Bayes' theorem" --strict

  # Re-render an existing script with up to 5 repair attempts
  reelsmith render output/generated_bayes_theorem.py --max-attempts 5

  # Print the budgets a 12-minute run would use
  reelsmith plan --duration 12

  # Recover JSON from a messy model answer
  reelsmith parse answer.txt

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > environment > config file > defaults
  Config file is discovered by searching upward from CWD for .reelsmith/config.toml
  Use --config to specify an explicit config file path
  Use `reelsmith config` to print the effective values and where they came from

STAGES:
  Content → Visual Plan (+ Code Skeleton for short videos) → Code → Render
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Generation provider (anthropic or openai)
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Model class used for every stage (fast or high-quality)
    #[arg(long, global = true)]
    pub model_class: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a video script for a topic and render it
    Generate {
        /// What the video should explain
        topic: String,

        /// Target length in minutes
        #[arg(long)]
        duration: Option<u32>,

        /// File with earlier conversation, used as context for every stage
        #[arg(long)]
        context_file: Option<PathBuf>,

        /// Directory for the script and the rendered video
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Stop after writing the script
        #[arg(long)]
        no_render: bool,

        /// Fail when the final script misses the quality thresholds
        #[arg(long)]
        strict: bool,

        /// Print the job outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render an existing script, repairing it between failed attempts
    Render {
        /// Path to the scene module
        script: PathBuf,

        /// Render attempts before giving up
        #[arg(long)]
        max_attempts: Option<u32>,
    },

    /// Print duration profile, requirements and stage budgets without calling a provider
    Plan {
        /// Target length in minutes
        #[arg(long)]
        duration: Option<u32>,

        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recover a JSON value from model output in FILE (or stdin)
    Parse {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Print the effective configuration with the source of each value
    Config,
}

impl Cli {
    /// Overrides for configuration discovery, taken from global and subcommand flags.
    #[must_use]
    pub fn config_overrides(&self) -> CliArgs {
        let mut args = CliArgs {
            config_path: self.config.clone(),
            model_class: self.model_class.clone(),
            verbose: self.verbose.then_some(true),
            llm_provider: self.provider.clone(),
            ..CliArgs::default()
        };

        match &self.command {
            Commands::Generate {
                duration,
                output_dir,
                strict,
                ..
            } => {
                args.duration_minutes = *duration;
                args.output_dir = output_dir.clone();
                args.best_effort = strict.then_some(false);
            }
            Commands::Render { max_attempts, .. } => {
                args.max_render_attempts = *max_attempts;
            }
            Commands::Plan { duration, .. } => {
                args.duration_minutes = *duration;
            }
            Commands::Parse { .. } | Commands::Config => {}
        }

        args
    }

    /// Short name of the subcommand, used in error reports.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self.command {
            Commands::Generate { .. } => "generate",
            Commands::Render { .. } => "render",
            Commands::Plan { .. } => "plan",
            Commands::Parse { .. } => "parse",
            Commands::Config => "config",
        }
    }
}
