//! Parse command implementation
//!
//! Handles `reelsmith parse`: the resilient structured-output parser over a
//! file or stdin.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::ReelsmithError;
use crate::extraction::{Recovery, parse_with_recovery};
use crate::utils::error::PipelineError;

/// Recover a JSON value from `raw`, as a parse failure of the `input` stage.
pub fn parse_input(raw: &str) -> Result<(Value, Recovery), ReelsmithError> {
    parse_with_recovery(raw).map_err(|source| {
        ReelsmithError::Pipeline(PipelineError::Parse {
            stage: "input".to_string(),
            source,
        })
    })
}

/// Execute the parse command
///
/// Prints the recovered value as pretty JSON on stdout.
pub fn execute_parse_command(file: Option<&Path>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let (value, recovery) = parse_input(&raw)?;
    debug!(recovery = %recovery, "Parsed input");

    let rendered = serde_json::to_string_pretty(&value).context("Failed to serialize value")?;
    println!("{rendered}");
    Ok(())
}
