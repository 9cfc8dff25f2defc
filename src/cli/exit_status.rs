use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed; per-file problems are reported, not fatal
/// - `Failure` (1): Command refused to act (e.g. `init` with an existing config)
/// - `Error` (2): Invalid configuration or a run that aborted
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
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
