// src/types.rs

use std::str::FromStr;

use serde::Deserialize;

/// What happens to a synchronization command's output.
///
/// - `Verbose`: mirror stdout/stderr live while capturing (default).
/// - `Quiet`: capture only, never print.
/// - `QuietUntilFailure`: capture only; the caller prints the captured
///   output of a command that failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputPolicy {
    #[default]
    Verbose,
    Quiet,
    QuietUntilFailure,
}

impl OutputPolicy {
    /// Whether child output is mirrored live.
    pub fn tees(self) -> bool {
        matches!(self, OutputPolicy::Verbose)
    }
}

impl FromStr for OutputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "verbose" => Ok(OutputPolicy::Verbose),
            "quiet" => Ok(OutputPolicy::Quiet),
            "quiet-until-failure" => Ok(OutputPolicy::QuietUntilFailure),
            other => Err(format!(
                "invalid output mode: {other} (expected \"verbose\", \"quiet\" or \"quiet-until-failure\")"
            )),
        }
    }
}
