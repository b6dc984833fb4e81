//! Configuration for reelsmith.
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > `.reelsmith/config.toml` > built-in defaults.

mod config;

pub use config::*;
pub use reelsmith_utils::error;
pub use reelsmith_utils::types;
