//! Helpers shared by several commands.

use std::path::PathBuf;

use crate::Config;
use crate::model::RequestError;
use crate::utils::error::{ConfigError, ReelsmithError, RenderError};

/// Resolve the configured render binary on `PATH`.
///
/// Checked before any generation call so a missing renderer does not cost a
/// full pipeline run.
pub fn ensure_render_binary(config: &Config) -> Result<PathBuf, ReelsmithError> {
    let binary = config.render_binary();
    which::which(binary).map_err(|e| {
        ReelsmithError::Render(RenderError::Spawn {
            program: binary.to_string(),
            reason: format!("not found on PATH ({e})"),
        })
    })
}

/// Map a rejected request to the configuration key the user has to fix.
pub fn request_error(err: &RequestError) -> ReelsmithError {
    let key = match err {
        RequestError::EmptyTopic => "topic",
        RequestError::ZeroDuration => "duration_minutes",
    };
    ReelsmithError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: err.to_string(),
    })
}
