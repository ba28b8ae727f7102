use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): chunks written or check passed
/// - `Failure` (1): the run completed but reported error-severity issues
/// - `Error` (2): the run could not complete (config error, unwritable output, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    /// `Failure` when any error-severity issue was reported.
    pub fn from_error_count(errors: usize) -> Self {
        if errors > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
