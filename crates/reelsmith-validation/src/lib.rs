//! Quality validation of stage output.
//!
//! Thresholds come from the [`DurationProfile`](reelsmith_budget::DurationProfile)
//! of the requested length. Validation is pure and infallible: every shortfall
//! is an item in the returned [`ValidationReport`].

mod report;
mod validator;

pub use report::{ReportMetrics, ValidationReport};
pub use validator::{MIN_CODE_CHARS, QualityValidator};
