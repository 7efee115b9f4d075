// src/sync/hook.rs

//! Hooks: shell lines run locally or over `ssh` around a route.

use tracing::info;

use crate::errors::SyncError;
use crate::exec::diagnostics::redact;
use crate::exec::{ExitStatus, RunResult};

use super::executor::{ExecutionOptions, run_command};
use super::route::Command;

/// Where a hook line runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HookTarget {
    Local { cwd: Option<String> },
    Remote { host: String, cwd: Option<String> },
}

/// One opaque shell line plus its target. The line is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hook {
    pub target: HookTarget,
    pub line: String,
    pub requires_sudo: bool,
}

impl Hook {
    pub fn local(line: impl Into<String>) -> Self {
        Self {
            target: HookTarget::Local { cwd: None },
            line: line.into(),
            requires_sudo: false,
        }
    }

    pub fn remote(host: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            target: HookTarget::Remote {
                host: host.into(),
                cwd: None,
            },
            line: line.into(),
            requires_sudo: false,
        }
    }

    pub fn cwd(mut self, dir: impl Into<String>) -> Self {
        let dir = Some(dir.into());
        match &mut self.target {
            HookTarget::Local { cwd } | HookTarget::Remote { cwd, .. } => *cwd = dir,
        }
        self
    }

    pub fn requires_sudo(mut self, sudo: bool) -> Self {
        self.requires_sudo = sudo;
        self
    }
}

/// Translate `hook` into the command that runs it.
///
/// - local: `sh -lc "[cd <cwd> && ][sudo ]<line>"`
/// - remote: `ssh <host> sh -lc '<same line>'`
///
/// `ssh` joins its trailing arguments with spaces before the remote shell
/// parses them, so the remote line is quoted once more to arrive intact.
pub fn hook_command(hook: &Hook) -> Command {
    let (host, cwd) = match &hook.target {
        HookTarget::Local { cwd } => (None, cwd.as_deref()),
        HookTarget::Remote { host, cwd } => (Some(host.as_str()), cwd.as_deref()),
    };

    let mut line = if hook.requires_sudo {
        format!("sudo {}", hook.line)
    } else {
        hook.line.clone()
    };
    if let Some(dir) = cwd.filter(|d| !d.is_empty()) {
        line = format!("cd {dir} && {line}");
    }

    let argv = match host {
        None => vec!["sh".to_string(), "-lc".to_string(), line],
        Some(host) => vec![
            "ssh".to_string(),
            host.to_string(),
            "sh".to_string(),
            "-lc".to_string(),
            shell_words::quote(&line).into_owned(),
        ],
    };
    Command::new(argv)
}

/// Run `hook` through the configured runner, like a planned command.
///
/// A normal exit with a non-zero code fails with [`SyncError::HookFailed`].
pub async fn run_hook(hook: &Hook, options: &ExecutionOptions) -> Result<RunResult, SyncError> {
    let command = hook_command(hook);
    let command_line = redact(&command.pretty_line(), &options.redactions);
    info!(hook = %command_line, "running hook");

    let result = run_command(&command, options).await?;
    match result.status {
        ExitStatus::Exited(code) if code != 0 => Err(SyncError::HookFailed {
            command_line,
            exit_code: code,
            result: Box::new(result),
        }),
        _ => Ok(result),
    }
}
