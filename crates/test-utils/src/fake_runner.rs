use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syncroute::exec::{ExecContext, ExitStatus, RunResult, ShellError};
use syncroute::sync::CommandRunner;
use tokio_util::sync::CancellationToken;

/// A fake command runner that:
/// - records the argv (program + args) of every call
/// - answers each call with a scripted exit status (default: exit 0)
/// - rejects codes outside the context's accepted set the way the real
///   runner does, with `ShellError::NonZeroExit`.
#[derive(Clone, Default)]
pub struct FakeRunner {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    statuses: Arc<Mutex<BTreeMap<usize, ExitStatus>>>,
    stdout: Arc<Mutex<Vec<u8>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `call`-th invocation (1-based) end with `status`.
    pub fn with_status(self, call: usize, status: ExitStatus) -> Self {
        self.statuses.lock().unwrap().insert(call, status);
        self
    }

    /// Stdout returned by every call.
    pub fn with_stdout(self, text: &str) -> Self {
        *self.stdout.lock().unwrap() = text.as_bytes().to_vec();
        self
    }

    /// Recorded argv per call, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run<'a>(
        &'a self,
        ctx: ExecContext,
        _cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult, ShellError>> + Send + 'a>> {
        Box::pin(async move {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let mut argv = vec![ctx.program.clone()];
                argv.extend(ctx.args.iter().cloned());
                calls.push(argv);
                calls.len()
            };
            let status = self
                .statuses
                .lock()
                .unwrap()
                .get(&call)
                .copied()
                .unwrap_or(ExitStatus::Exited(0));

            let result = RunResult {
                status,
                pid: 4242,
                launched_path: ctx.program.clone(),
                argv: ctx.args.clone(),
                duration: Duration::from_millis(1),
                stdout: self.stdout.lock().unwrap().clone(),
                stderr: Vec::new(),
            };

            match status {
                ExitStatus::Exited(code) if !ctx.accepts(code) => {
                    Err(ShellError::non_zero_exit(result, &ctx, &ctx.env))
                }
                _ => Ok(result),
            }
        })
    }
}
