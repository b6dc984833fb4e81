//! Render command implementation
//!
//! Handles `reelsmith render`: the repair loop over an existing script.

use anyhow::Result;
use std::path::Path;

use super::common::ensure_render_binary;
use crate::render::{AttemptOutcome, ManimRenderer, render_with_recovery};
use crate::utils::error::RenderError;
use crate::{Config, ReelsmithError};

/// Execute the render command
///
/// The script is patched in place between failed attempts. Prints the video path.
pub async fn execute_render_command(script: &Path, config: &Config) -> Result<()> {
    std::fs::metadata(script).map_err(|source| {
        ReelsmithError::Render(RenderError::Io {
            path: script.to_path_buf(),
            source,
        })
    })?;
    ensure_render_binary(config)?;

    let renderer = ManimRenderer::from_config(config);
    let recovered = render_with_recovery(&renderer, script, config.max_render_attempts())
        .await
        .map_err(ReelsmithError::from)?;

    for attempt in &recovered.attempts {
        if let AttemptOutcome::Failed { .. } = attempt.outcome {
            match attempt.repair {
                Some(rule) => eprintln!("  attempt {} failed, applied {rule}", attempt.attempt),
                None => eprintln!("  attempt {} failed", attempt.attempt),
            }
        }
    }

    println!("{}", recovered.artifact.display());
    Ok(())
}
