// src/exec/error.rs

//! Errors raised by the process and pseudo-terminal runners.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

use super::context::ExecContext;
use super::diagnostics::{PREVIEW_BYTES, RunContext, clamp, preview, redact};
use super::status::RunResult;

/// Failure of a single process invocation.
#[derive(Error)]
pub enum ShellError {
    /// The program could not be spawned (missing binary, permissions, ...).
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on a spawned child failed at the OS level.
    #[error("failed to wait for process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    /// The configured timeout fired; the child was terminated.
    #[error("process {pid} timed out after {:.3}s", .after.as_secs_f64())]
    TimedOut { after: Duration, pid: u32 },

    /// The caller cancelled the invocation; the child was terminated.
    #[error("process {pid} was cancelled")]
    Cancelled { pid: u32 },

    /// The child exited normally with a code outside the accepted set.
    ///
    /// Previews and context are redacted; `result` holds the raw, complete
    /// output for callers that need it.
    #[error("process exited with code {code}: {}", output_hint(.stderr_preview, .stdout_preview))]
    NonZeroExit {
        code: i32,
        stdout_preview: String,
        stderr_preview: String,
        result: Box<RunResult>,
        context: Box<RunContext>,
    },
}

fn output_hint<'a>(stderr: &'a str, stdout: &'a str) -> &'a str {
    let body = if stderr.trim().is_empty() { stdout } else { stderr };
    body.trim_end()
}

impl ShellError {
    /// Build a [`ShellError::NonZeroExit`] for a result whose exit code was
    /// rejected by `ctx`.
    pub fn non_zero_exit(
        result: RunResult,
        ctx: &ExecContext,
        env: &BTreeMap<String, String>,
    ) -> Self {
        let code = result.exit_code().unwrap_or(-1);
        let context = RunContext::capture(
            ctx,
            &result.launched_path,
            &result.argv,
            env,
            result.duration,
            result.pid,
        );
        let stdout_preview = redact(&preview(&result.stdout_text(), PREVIEW_BYTES), &ctx.redactions);
        let stderr_preview = redact(&preview(&result.stderr_text(), PREVIEW_BYTES), &ctx.redactions);

        ShellError::NonZeroExit {
            code,
            stdout_preview,
            stderr_preview,
            result: Box::new(result),
            context: Box::new(context),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ShellError::TimedOut { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ShellError::Cancelled { .. })
    }

    /// Exit code of a rejected normal exit.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ShellError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Raw result attached to a rejected exit.
    pub fn result(&self) -> Option<&RunResult> {
        match self {
            ShellError::NonZeroExit { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn context(&self) -> Option<&RunContext> {
        match self {
            ShellError::NonZeroExit { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Full multi-line report. Output sections are clamped to
    /// `max_preview_bytes` and redacted with the invocation's literals.
    pub fn pretty(&self, max_preview_bytes: usize) -> String {
        match self {
            ShellError::NonZeroExit {
                code,
                stdout_preview,
                stderr_preview,
                context,
                ..
            } => {
                let mut out = context.render(*code);
                out.push_str("\n— Stdout —\n");
                out.push_str(&clamp(stdout_preview, max_preview_bytes));
                out.push('\n');
                out.push_str("\n— Stderr —\n");
                out.push_str(&clamp(stderr_preview, max_preview_bytes));
                out.push('\n');
                out
            }
            other => other.to_string(),
        }
    }
}

// Hand-written so the raw result (unredacted argv and output) never ends up
// in `{:?}` output.
impl fmt::Debug for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Launch { program, source } => f
                .debug_struct("Launch")
                .field("program", program)
                .field("source", source)
                .finish(),
            ShellError::Wait { pid, source } => f
                .debug_struct("Wait")
                .field("pid", pid)
                .field("source", source)
                .finish(),
            ShellError::TimedOut { after, pid } => f
                .debug_struct("TimedOut")
                .field("after", after)
                .field("pid", pid)
                .finish(),
            ShellError::Cancelled { pid } => f.debug_struct("Cancelled").field("pid", pid).finish(),
            ShellError::NonZeroExit {
                code,
                stdout_preview,
                stderr_preview,
                context,
                ..
            } => f
                .debug_struct("NonZeroExit")
                .field("code", code)
                .field("command_line", &context.command_line)
                .field("stdout_preview", stdout_preview)
                .field("stderr_preview", stderr_preview)
                .finish_non_exhaustive(),
        }
    }
}

/// Failure of the pseudo-terminal runner, carrying the OS error number.
#[derive(Debug, Error)]
pub enum PtyError {
    #[error("failed to open pseudo-terminal (errno {errno})")]
    OpenPty { errno: i32 },

    #[error("failed to spawn '{program}' on pseudo-terminal (errno {errno})")]
    Spawn { program: String, errno: i32 },
}
