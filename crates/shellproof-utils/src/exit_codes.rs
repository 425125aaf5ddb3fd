//! Exit code constants for the shellproof CLI.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Remote command reported exit status 0 |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `COMMAND_FAILED` | Marker missing or non-zero |
//! | 4 | `SESSION_UNAVAILABLE` | Remote session rejected the command |
//! | 5 | `EVIDENCE_FAILED` | A log could not be archived |

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the public API.
///
/// # Example
///
/// ```rust
/// use shellproof_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(3), ExitCode::COMMAND_FAILED);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - remote command reported exit status 0
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// The remote command ran but did not report `<marker>=0`
    pub const COMMAND_FAILED: ExitCode = ExitCode(3);

    /// The remote session could not execute the command
    pub const SESSION_UNAVAILABLE: ExitCode = ExitCode(4);

    /// Evidence could not be copied or stored
    pub const EVIDENCE_FAILED: ExitCode = ExitCode(5);

    /// Get the numeric exit code value
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw integer value
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
        assert_eq!(ExitCode::COMMAND_FAILED.as_i32(), 3);
        assert_eq!(ExitCode::SESSION_UNAVAILABLE.as_i32(), 4);
        assert_eq!(ExitCode::EVIDENCE_FAILED.as_i32(), 5);
        assert_eq!(i32::from(ExitCode::EVIDENCE_FAILED), 5);
    }
}
