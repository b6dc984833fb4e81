//! Render collaborator boundary and the `manim` process renderer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use reelsmith_config::Config;
use reelsmith_utils::error::RenderError;

use crate::command::CommandSpec;

/// Result of one render invocation that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered(PathBuf),
    /// The renderer ran but produced no artifact; the reason is its diagnostic output.
    Failed(String),
}

/// Anything that turns a scene script into a video file.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render `script` once.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` only when the renderer cannot be run at all. A render
    /// that runs and fails is `Ok(RenderOutcome::Failed)`, which the recovery loop
    /// can repair.
    async fn render(&self, script: &Path) -> Result<RenderOutcome, RenderError>;
}

/// `manim` quality presets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum RenderQuality {
    #[default]
    Low,
    Medium,
    High,
}

impl RenderQuality {
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::Medium => "-qm",
            Self::High => "-qh",
        }
    }
}

/// Runs the `manim` CLI as a child process.
#[derive(Debug, Clone)]
pub struct ManimRenderer {
    binary: String,
    quality: RenderQuality,
    preview: bool,
    media_dir: PathBuf,
}

impl ManimRenderer {
    #[must_use]
    pub fn new(binary: impl Into<String>, media_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            quality: RenderQuality::default(),
            preview: false,
            media_dir: media_dir.into(),
        }
    }

    #[must_use]
    pub const fn with_quality(mut self, quality: RenderQuality) -> Self {
        self.quality = quality;
        self
    }

    #[must_use]
    pub const fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    /// Renderer settings from `[render]`. Quality names are validated with the
    /// config, so an unknown one falls back to low.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let quality = config.render_quality().parse().unwrap_or_default();
        Self::new(config.render_binary(), config.media_dir())
            .with_quality(quality)
            .with_preview(config.render_preview())
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// `<binary> [-p] -q{l|m|h} --media_dir <dir> <script>`
    #[must_use]
    pub fn command(&self, script: &Path) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.binary);
        if self.preview {
            cmd = cmd.arg("-p");
        }
        cmd.arg(self.quality.flag())
            .arg("--media_dir")
            .arg(self.media_dir.as_os_str())
            .arg(script.as_os_str())
    }
}

#[async_trait]
impl Renderer for ManimRenderer {
    async fn render(&self, script: &Path) -> Result<RenderOutcome, RenderError> {
        let cmd = self.command(script);
        debug!(command = %cmd.display(), "Invoking renderer");

        let output = cmd
            .to_command()
            .output()
            .await
            .map_err(|e| RenderError::Spawn {
                program: self.binary.clone(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            debug!(status = %output.status, "Renderer exited unsuccessfully");
            return Ok(RenderOutcome::Failed(failure_reason(
                &stdout,
                &stderr,
                &format!("Renderer exited with {}", output.status),
            )));
        }

        match newest_video(&self.media_dir.join("videos")) {
            Some(path) => {
                debug!(path = %path.display(), "Renderer produced video");
                Ok(RenderOutcome::Rendered(path))
            }
            None => Ok(RenderOutcome::Failed(failure_reason(
                &stdout,
                &stderr,
                "No video file generated",
            ))),
        }
    }
}

/// Stderr, else stdout, else `fallback`.
fn failure_reason(stdout: &str, stderr: &str, fallback: &str) -> String {
    [stderr, stdout]
        .into_iter()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Most recently modified `.mp4` anywhere under `dir`.
fn newest_video(dir: &Path) -> Option<PathBuf> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if metadata.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "mp4") {
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                if newest.as_ref().is_none_or(|(best, _)| modified >= *best) {
                    newest = Some((modified, path));
                }
            }
        }
    }

    newest.map(|(_, path)| path)
}
