//! Foundation utilities shared by every reelsmith crate.

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

pub use error::{ReelsmithError, UserFriendlyError};
pub use exit_codes::ExitCode;
