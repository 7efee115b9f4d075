// src/exec/context.rs

//! Execution context: everything needed to launch one external program.
//!
//! A context is plain data. The runner never mutates it; it derives the
//! launch path, the argv and the child environment from it once per
//! invocation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked with every chunk read from a child's output stream.
pub type ChunkCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Login shell used by [`Launcher::Shell`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ShellKind {
    #[default]
    Sh,
    Bash,
    Zsh,
}

impl ShellKind {
    pub fn path(self) -> &'static str {
        match self {
            ShellKind::Sh => "/bin/sh",
            ShellKind::Bash => "/bin/bash",
            ShellKind::Zsh => "/bin/zsh",
        }
    }
}

/// How the program of an [`ExecContext`] is launched.
///
/// - `Direct`: the program is executed as-is (looked up on `PATH` unless it
///   is a path).
/// - `Env`: the program is handed to `/usr/bin/env`.
/// - `Shell`: program and arguments are quoted into a single line which is
///   passed to `<shell> -lc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Launcher {
    #[default]
    Direct,
    Env,
    Shell(ShellKind),
}

pub const ENV_PATH: &str = "/usr/bin/env";

impl Launcher {
    /// Resolve the launch path and the argv (without argv[0]) for `program`.
    pub fn resolve(&self, program: &str, args: &[String]) -> (String, Vec<String>) {
        match self {
            Launcher::Direct => (program.to_string(), args.to_vec()),
            Launcher::Env => {
                let mut argv = Vec::with_capacity(args.len() + 1);
                argv.push(program.to_string());
                argv.extend(args.iter().cloned());
                (ENV_PATH.to_string(), argv)
            }
            Launcher::Shell(kind) => {
                let words = std::iter::once(program).chain(args.iter().map(String::as_str));
                let line = shell_words::join(words);
                (kind.path().to_string(), vec!["-lc".to_string(), line])
            }
        }
    }
}

/// Immutable description of one process invocation.
///
/// Built with the consuming builder methods:
///
/// ```
/// use std::time::Duration;
/// use syncroute::exec::ExecContext;
///
/// let ctx = ExecContext::new("rsync")
///     .args(["-avz", "--progress"])
///     .timeout(Duration::from_secs(600))
///     .redact("s3cr3t");
/// assert_eq!(ctx.args, vec!["-avz", "--progress"]);
/// ```
#[derive(Clone)]
pub struct ExecContext {
    pub launcher: Launcher,
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Start the child environment from the caller's environment (`true`)
    /// or from an empty map (`false`).
    pub inherit_env: bool,
    /// Variables overlaid on top of the base environment.
    pub env: BTreeMap<String, String>,
    /// Bytes written to the child's stdin; the pipe is closed afterwards.
    /// `None` connects stdin to `/dev/null`.
    pub stdin: Option<Vec<u8>>,
    /// A zero duration is treated as "no timeout".
    pub timeout: Option<Duration>,
    pub accepted_exit_codes: BTreeSet<i32>,
    pub tee_stdout: bool,
    pub tee_stderr: bool,
    /// Literal strings hidden from every diagnostic rendering.
    pub redactions: Vec<String>,
    pub on_stdout_chunk: Option<ChunkCallback>,
    pub on_stderr_chunk: Option<ChunkCallback>,
}

impl ExecContext {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            launcher: Launcher::default(),
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            inherit_env: true,
            env: BTreeMap::new(),
            stdin: None,
            timeout: None,
            accepted_exit_codes: BTreeSet::from([0]),
            tee_stdout: false,
            tee_stderr: false,
            redactions: Vec::new(),
            on_stdout_chunk: None,
            on_stderr_chunk: None,
        }
    }

    pub fn launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(bytes.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the accepted exit codes (default `{0}`).
    pub fn accept_exit_codes(mut self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.accepted_exit_codes = codes.into_iter().collect();
        self
    }

    pub fn tee(mut self, stdout: bool, stderr: bool) -> Self {
        self.tee_stdout = stdout;
        self.tee_stderr = stderr;
        self
    }

    pub fn redact(mut self, secret: impl Into<String>) -> Self {
        self.redactions.push(secret.into());
        self
    }

    pub fn on_stdout_chunk(mut self, callback: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.on_stdout_chunk = Some(Arc::new(callback));
        self
    }

    pub fn on_stderr_chunk(mut self, callback: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.on_stderr_chunk = Some(Arc::new(callback));
        self
    }

    /// Effective timeout; zero durations disable it.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }

    /// Build the child's environment: base map (inherited or empty) plus the
    /// overlay. Computed fresh for every call; no process-wide state changes.
    pub fn resolved_env(&self) -> BTreeMap<String, String> {
        let mut env: BTreeMap<String, String> = if self.inherit_env {
            std::env::vars().collect()
        } else {
            BTreeMap::new()
        };
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }

    pub fn accepts(&self, code: i32) -> bool {
        self.accepted_exit_codes.contains(&code)
    }
}

impl fmt::Debug for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecContext")
            .field("launcher", &self.launcher)
            .field("program", &self.program)
            .field("args", &self.args.len())
            .field("cwd", &self.cwd)
            .field("inherit_env", &self.inherit_env)
            .field("env", &self.env.keys().collect::<Vec<_>>())
            .field("stdin", &self.stdin.as_ref().map(Vec::len))
            .field("timeout", &self.timeout)
            .field("accepted_exit_codes", &self.accepted_exit_codes)
            .field("tee_stdout", &self.tee_stdout)
            .field("tee_stderr", &self.tee_stderr)
            .field("redactions", &self.redactions.len())
            .finish_non_exhaustive()
    }
}
