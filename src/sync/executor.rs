// src/sync/executor.rs

//! Batch executor: runs a route's plan one command at a time.
//!
//! Commands go through a [`CommandRunner`] instead of calling the process
//! runner directly. Production uses [`ProcessCommandRunner`]; tests swap in a
//! fake that records calls and scripts exit codes.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::SyncError;
use crate::exec::diagnostics::redact;
use crate::exec::{self, ExecContext, ExitStatus, Launcher, RunResult, ShellError};
use crate::types::OutputPolicy;

use super::hook::run_hook;
use super::planner::plan;
use super::route::{Command, Route};
use super::summary::{Summary, parse_summary};

/// Lifecycle notifications for each planned command. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionEvent {
    CommandStarted {
        command: Command,
        index: usize,
        total: usize,
    },
    CommandFinished {
        command: Command,
        index: usize,
        total: usize,
        result: RunResult,
    },
}

/// Trait abstracting how a single command is executed.
pub trait CommandRunner: Send + Sync {
    fn run<'a>(
        &'a self,
        ctx: ExecContext,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult, ShellError>> + Send + 'a>>;
}

/// Runs commands as real child processes via [`exec::run`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessCommandRunner;

impl CommandRunner for ProcessCommandRunner {
    fn run<'a>(
        &'a self,
        ctx: ExecContext,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult, ShellError>> + Send + 'a>> {
        Box::pin(async move { exec::run(&ctx, cancel).await })
    }
}

/// Knobs for [`execute`] and [`sync_route`].
#[derive(Clone)]
pub struct ExecutionOptions {
    /// Pass `--dry-run` to every rsync invocation.
    pub dry_run: bool,
    /// Extra rsync flags, inserted right after the program name.
    pub additional_flags: Vec<String>,
    pub launcher: Launcher,
    pub cwd: Option<PathBuf>,
    pub output: OutputPolicy,
    /// Per-command timeout.
    pub timeout: Option<Duration>,
    pub redactions: Vec<String>,
    pub cancel: CancellationToken,
    pub events: Option<mpsc::UnboundedSender<ExecutionEvent>>,
    pub runner: Arc<dyn CommandRunner>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            additional_flags: Vec::new(),
            launcher: Launcher::Env,
            cwd: None,
            output: OutputPolicy::default(),
            timeout: None,
            redactions: Vec::new(),
            cancel: CancellationToken::new(),
            events: None,
            runner: Arc::new(ProcessCommandRunner),
        }
    }
}

impl fmt::Debug for ExecutionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionOptions")
            .field("dry_run", &self.dry_run)
            .field("additional_flags", &self.additional_flags)
            .field("launcher", &self.launcher)
            .field("cwd", &self.cwd)
            .field("output", &self.output)
            .field("timeout", &self.timeout)
            .field("redactions", &self.redactions.len())
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}

impl ExecutionOptions {
    /// Apply `dry_run` and `additional_flags` to a planned command. The plan
    /// itself is left untouched.
    pub fn rewrite(&self, command: &Command) -> Command {
        let mut argv = command.argv().to_vec();
        let at = argv.len().min(1);
        if self.dry_run {
            argv.insert(at, "--dry-run".to_string());
        }
        argv.splice(at..at, self.additional_flags.iter().cloned());
        Command::new(argv)
    }

    /// Execution context for one command under these options.
    pub fn context_for(&self, command: &Command) -> ExecContext {
        let tee = self.output.tees();
        let mut ctx = ExecContext::new(command.program())
            .args(command.args().iter().cloned())
            .launcher(self.launcher)
            .tee(tee, tee);
        ctx.cwd = self.cwd.clone();
        ctx.timeout = self.timeout;
        ctx.redactions = self.redactions.clone();
        ctx
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening any more.
            let _ = tx.send(event);
        }
    }
}

/// Run one command through the configured runner.
///
/// A rejected exit code is folded back into its result so callers apply
/// their own halting rule; every other runner failure propagates.
pub(crate) async fn run_command(
    command: &Command,
    options: &ExecutionOptions,
) -> Result<RunResult, ShellError> {
    let ctx = options.context_for(command);
    match options.runner.run(ctx, &options.cancel).await {
        Ok(result) => Ok(result),
        Err(ShellError::NonZeroExit { result, .. }) => Ok(*result),
        Err(e) => Err(e),
    }
}

/// Plan `route` and run every command in order.
///
/// Stops at the first command that exits normally with a non-zero code and
/// fails with [`SyncError::CommandFailed`], which carries that command's
/// result; earlier results are only observable through [`ExecutionEvent`]s
/// in that case. A command killed by
/// a signal does not stop the run.
pub async fn execute(
    route: &Route,
    options: &ExecutionOptions,
    delete_override: Option<bool>,
) -> Result<Vec<RunResult>, SyncError> {
    let plan = plan(route, delete_override);
    let total = plan.len();
    info!(
        route = %route.name,
        total,
        dry_run = options.dry_run,
        "executing plan"
    );

    let mut results = Vec::with_capacity(total);
    for (i, planned) in plan.iter().enumerate() {
        let index = i + 1;
        options.emit(ExecutionEvent::CommandStarted {
            command: planned.clone(),
            index,
            total,
        });

        let command = options.rewrite(planned);
        debug!(
            index,
            total,
            command = %redact(&command.pretty_line(), &options.redactions),
            "running command"
        );

        let result = run_command(&command, options).await?;

        options.emit(ExecutionEvent::CommandFinished {
            command: planned.clone(),
            index,
            total,
            result: result.clone(),
        });

        if let ExitStatus::Exited(code) = result.status {
            if code != 0 {
                return Err(SyncError::CommandFailed {
                    command_line: redact(&planned.pretty_line(), &options.redactions),
                    exit_code: code,
                    index,
                    total,
                    result: Box::new(result),
                });
            }
        }

        info!(index, total, summary = %result.short_summary(), "command finished");
        results.push(result);
    }

    Ok(results)
}

/// Results of a full route run.
#[derive(Debug, Clone)]
pub struct RouteReport {
    pub route: String,
    pub results: Vec<RunResult>,
    /// One parsed summary per entry of `results`.
    pub summaries: Vec<Summary>,
}

impl RouteReport {
    /// Sum of the bytes sent by every command that reported it.
    pub fn total_sent_bytes(&self) -> u64 {
        self.summaries.iter().filter_map(|s| s.sent_bytes).sum()
    }
}

/// Run the route's `before` hooks, its plan, then its `after` hooks.
///
/// Any failure stops the run; `after` hooks do not run when a command fails.
pub async fn sync_route(
    route: &Route,
    options: &ExecutionOptions,
    delete_override: Option<bool>,
) -> Result<RouteReport, SyncError> {
    for hook in &route.before {
        run_hook(hook, options).await?;
    }

    let results = execute(route, options, delete_override).await?;

    for hook in &route.after {
        run_hook(hook, options).await?;
    }

    let summaries = results
        .iter()
        .map(|r| parse_summary(&r.stdout_text()))
        .collect();

    Ok(RouteReport {
        route: route.name.clone(),
        results,
        summaries,
    })
}
