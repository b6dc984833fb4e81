//! Render recovery for reelsmith
//!
//! [`render_with_recovery`] drives a [`Renderer`] and, between failed attempts,
//! patches the persisted script with the first matching [`RepairRule`].
//! [`ManimRenderer`] runs the `manim` CLI through an argv-only [`CommandSpec`].

mod command;
mod recovery;
mod renderer;
mod rules;
#[cfg(any(test, feature = "test-utils"))]
mod scripted;

pub use command::CommandSpec;
pub use recovery::{
    AttemptOutcome, DEFAULT_MAX_ATTEMPTS, RecoveredRender, RenderAttempt, render_with_recovery,
    render_with_recovery_observed,
};
pub use reelsmith_utils::error::RenderError;
pub use renderer::{ManimRenderer, RenderOutcome, RenderQuality, Renderer};
pub use rules::{DEPRECATED_NAMES, REPAIR_ORDER, RepairRule, classify, deficit, repair};
#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedRenderer;
