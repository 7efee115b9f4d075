// src/exec/status.rs

//! Exit status and run result types.

use std::fmt;
use std::time::Duration;

use super::diagnostics::quote_command_line;

/// How a child process terminated.
///
/// A normal exit and a signal termination are separate cases, so an exit
/// code of 9 is never mistaken for `SIGKILL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitStatus {
    /// Normal exit with the code reported by the OS.
    Exited(i32),
    /// Terminated by an uncaught signal.
    Signaled(i32),
}

impl ExitStatus {
    /// Exit code for a normal exit, `None` for signal termination.
    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(code) => Some(*code),
            ExitStatus::Signaled(_) => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            ExitStatus::Exited(_) => None,
            ExitStatus::Signaled(signal) => Some(*signal),
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitStatus::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signaled(signal);
            }
        }

        ExitStatus::Exited(-1)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Exited(code) => write!(f, "exit {code}"),
            ExitStatus::Signaled(signal) => write!(f, "signal {signal}"),
        }
    }
}

/// Outcome of one completed invocation. Created once, after the child has
/// terminated, and returned by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub status: ExitStatus,
    pub pid: u32,
    pub launched_path: String,
    pub argv: Vec<String>,
    pub duration: Duration,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl RunResult {
    pub fn exit_code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Launch path and argv, shell-quoted. Not redacted; use
    /// [`RunContext::command_line`](super::RunContext::command_line) for
    /// anything that may end up in logs.
    pub fn pretty_command_line(&self) -> String {
        quote_command_line(&self.launched_path, &self.argv, &[])
    }

    pub fn short_summary(&self) -> String {
        let code = self
            .exit_code()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("exit={code}  time={:.3}s", self.duration.as_secs_f64())
    }
}
