//! Exit code constants for the reelsmith CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `GENERATION_FAILURE` | Pipeline produced no acceptable artifact |
//! | 4 | `RENDER_FAILURE` | Render recovery exhausted its attempts |
//! | 10 | `TIMEOUT` | A provider call timed out |
//! | 70 | `PROVIDER_FAILURE` | The generation provider rejected or failed the call |

/// Exit codes matching the documented exit code table.
///
/// Use the named constants, or [`as_i32()`](Self::as_i32) to get the numeric
/// value for `std::process::exit()`.
///
/// # Example
///
/// ```rust
/// use reelsmith_utils::ExitCode;
///
/// assert_eq!(ExitCode::RENDER_FAILURE.as_i32(), 4);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Generation failure - no artifact, unparseable output, or strict quality failure
    pub const GENERATION_FAILURE: ExitCode = ExitCode(3);

    /// Render failure - the recovery loop ran out of attempts
    pub const RENDER_FAILURE: ExitCode = ExitCode(4);

    /// Timeout - a provider call exceeded its deadline
    pub const TIMEOUT: ExitCode = ExitCode(10);

    /// Provider failure - auth, quota, outage or transport failure
    pub const PROVIDER_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::GENERATION_FAILURE.as_i32(), 3);
        assert_eq!(ExitCode::RENDER_FAILURE.as_i32(), 4);
        assert_eq!(ExitCode::TIMEOUT.as_i32(), 10);
        assert_eq!(ExitCode::PROVIDER_FAILURE.as_i32(), 70);
    }

    #[test]
    fn test_exit_code_conversion() {
        let raw: i32 = ExitCode::TIMEOUT.into();
        assert_eq!(raw, 10);
        assert_eq!(ExitCode::from_i32(70), ExitCode::PROVIDER_FAILURE);
    }
}
