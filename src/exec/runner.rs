// src/exec/runner.rs

//! Process runner.
//!
//! One call launches one child, drains stdout and stderr on their own tasks
//! and races the child's exit against the timeout and the caller's
//! cancellation token. The call returns only once the child is gone.

use std::collections::BTreeMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::context::ExecContext;
use super::diagnostics::{quote_command_line, redact};
use super::drain::{Tee, drain};
use super::error::ShellError;
use super::status::{ExitStatus, RunResult};
use super::terminate::{CANCEL_GRACE, TIMEOUT_GRACE, terminate};

enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>, Vec<u8>, Vec<u8>),
    TimedOut(Duration),
    Cancelled,
}

/// Run the program described by `ctx` to completion.
///
/// - A normal exit with an accepted code returns the [`RunResult`].
/// - A normal exit with any other code fails with
///   [`ShellError::NonZeroExit`]; the full result is attached.
/// - Signal termination returns the result with [`ExitStatus::Signaled`].
/// - Timeout and cancellation terminate the child's process group (SIGTERM,
///   grace period, SIGKILL) and fail without a partial result.
pub async fn run(ctx: &ExecContext, cancel: &CancellationToken) -> Result<RunResult, ShellError> {
    let (launch_path, argv) = ctx.launcher.resolve(&ctx.program, &ctx.args);
    let env = ctx.resolved_env();
    let display_line = quote_command_line(&launch_path, &argv, &ctx.redactions);

    let mut command = build_command(ctx, &launch_path, &argv, &env);

    let started = Instant::now();
    let mut child = command.spawn().map_err(|source| ShellError::Launch {
        program: redact(&launch_path, &ctx.redactions),
        source,
    })?;
    let pid = child.id().unwrap_or(0);

    info!(pid, command = %display_line, "launched process");

    let stdin_task = match (child.stdin.take(), ctx.stdin.clone()) {
        (Some(mut pipe), Some(bytes)) => Some(tokio::spawn(async move {
            if let Err(e) = pipe.write_all(&bytes).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    debug!(error = %e, "failed to write child stdin");
                }
            }
            // Dropping the pipe closes the child's stdin.
        })),
        _ => None,
    };

    let stdout_task = child.stdout.take().map(|out| {
        let tee = ctx.tee_stdout.then_some(Tee::Stdout);
        tokio::spawn(drain(out, tee, ctx.on_stdout_chunk.clone()))
    });
    let stderr_task = child.stderr.take().map(|err| {
        let tee = ctx.tee_stderr.then_some(Tee::Stderr);
        tokio::spawn(drain(err, tee, ctx.on_stderr_chunk.clone()))
    });

    let aborts: Vec<_> = [
        stdout_task.as_ref().map(JoinHandle::abort_handle),
        stderr_task.as_ref().map(JoinHandle::abort_handle),
        stdin_task.as_ref().map(JoinHandle::abort_handle),
    ]
    .into_iter()
    .flatten()
    .collect();

    let timeout = ctx.effective_timeout();
    let deadline = async {
        match timeout {
            Some(after) => {
                tokio::time::sleep(after).await;
                after
            }
            None => std::future::pending().await,
        }
    };

    let outcome = tokio::select! {
        (status, stdout, stderr) = async {
            let status = child.wait().await;
            let stdout = join_output(stdout_task).await;
            let stderr = join_output(stderr_task).await;
            (status, stdout, stderr)
        } => Outcome::Exited(status, stdout, stderr),
        after = deadline => Outcome::TimedOut(after),
        _ = cancel.cancelled() => Outcome::Cancelled,
    };

    let (status, stdout, stderr) = match outcome {
        Outcome::Exited(status, stdout, stderr) => (status, stdout, stderr),
        Outcome::TimedOut(after) => {
            warn!(pid, timeout_ms = after.as_millis() as u64, "process timed out; terminating");
            terminate(&mut child, pid, TIMEOUT_GRACE).await;
            aborts.iter().for_each(|h| h.abort());
            return Err(ShellError::TimedOut { after, pid });
        }
        Outcome::Cancelled => {
            info!(pid, "process cancelled; terminating");
            terminate(&mut child, pid, CANCEL_GRACE).await;
            aborts.iter().for_each(|h| h.abort());
            return Err(ShellError::Cancelled { pid });
        }
    };

    let status = status.map_err(|source| ShellError::Wait { pid, source })?;
    let result = RunResult {
        status: ExitStatus::from(status),
        pid,
        launched_path: launch_path,
        argv,
        duration: started.elapsed(),
        stdout,
        stderr,
    };

    debug!(
        pid,
        status = %result.status,
        stdout_bytes = result.stdout.len(),
        stderr_bytes = result.stderr.len(),
        elapsed_ms = result.duration.as_millis() as u64,
        "process exited"
    );

    match result.status {
        ExitStatus::Exited(code) if !ctx.accepts(code) => {
            Err(ShellError::non_zero_exit(result, ctx, &env))
        }
        _ => Ok(result),
    }
}

fn build_command(
    ctx: &ExecContext,
    launch_path: &str,
    argv: &[String],
    env: &BTreeMap<String, String>,
) -> Command {
    let mut command = Command::new(launch_path);
    command
        .args(argv)
        .env_clear()
        .envs(env)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if ctx.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .kill_on_drop(true);

    if let Some(cwd) = &ctx.cwd {
        command.current_dir(cwd);
    }

    // Own process group, so signals reach grandchildren too.
    #[cfg(unix)]
    command.process_group(0);

    command
}

async fn join_output(task: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    match task {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    }
}
