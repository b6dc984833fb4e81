//! Data model of a reelsmith run: the immutable request, the stage vocabulary,
//! and the typed records each stage produces.

pub mod lenient;
pub mod records;
pub mod request;
pub mod stage;

pub use records::{
    Animation, AnimationSpec, CodeArtifact, ContentRecord, Scene, Section, VisualPlan,
};
pub use request::{ConversationMessage, GenerationRequest, RequestError, new_run_id};
pub use stage::{Provenance, StageKind, StageResult};
