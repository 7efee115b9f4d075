// src/exec/pty.rs

//! Pseudo-terminal runner for programs that only behave when attached to a
//! TTY (progress bars, password prompts, colour detection).
//!
//! The child's stdin, stdout and stderr all point at the pty slave, so its
//! output arrives as a single stream: [`PtyResult::stderr`] is always empty.
//! The call is blocking; use `tokio::task::spawn_blocking` from async code.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::os::fd::OwnedFd;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::Path;
use std::process::{Command, Stdio};

use nix::pty::{OpenptyResult, openpty};
use tracing::{debug, info};

use super::drain::CHUNK_SIZE;
use super::error::PtyError;

/// Outcome of a pty invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtyResult {
    /// Exit code, or `128 + signal` when the child was killed by a signal.
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `path args…` on a fresh pseudo-terminal and collect everything it
/// writes.
///
/// `env = None` inherits the caller's environment, `Some(map)` replaces it.
pub fn run_pty(
    path: &str,
    args: &[String],
    env: Option<&BTreeMap<String, String>>,
    cwd: Option<&Path>,
    mut on_chunk: Option<&mut dyn FnMut(&[u8])>,
) -> Result<PtyResult, PtyError> {
    let OpenptyResult { master, slave } =
        openpty(None, None).map_err(|e| PtyError::OpenPty { errno: e as i32 })?;

    let spawn_err = |e: std::io::Error| PtyError::Spawn {
        program: path.to_string(),
        errno: e.raw_os_error().unwrap_or(0),
    };

    let mut command = Command::new(path);
    command
        .args(args)
        .stdin(stdio_for(&slave).map_err(spawn_err)?)
        .stdout(stdio_for(&slave).map_err(spawn_err)?)
        .stderr(stdio_for(&slave).map_err(spawn_err)?);

    if let Some(env) = env {
        command.env_clear().envs(env);
    }
    if let Some(cwd) = cwd {
        command.current_dir(cwd);
    }

    // SAFETY: the closure runs in the forked child before exec, where only
    // async-signal-safe calls are allowed. It makes a single setsid(2)
    // syscall, which is async-signal-safe. It allocates nothing, takes no
    // locks and captures nothing from the parent. On failure it only wraps
    // the errno in an `io::Error` (a plain integer), so the spawn error
    // keeps the child's errno.
    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid().map_err(std::io::Error::from)?;
            Ok(())
        });
    }

    let mut child = command.spawn().map_err(spawn_err)?;
    info!(pid = child.id(), program = %path, "launched process on pty");

    // The master only reports EOF once every slave descriptor in this
    // process is closed.
    drop(command);
    drop(slave);

    let mut reader = File::from(master);
    let mut stdout = Vec::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                stdout.extend_from_slice(&buf[..n]);
                if let Some(cb) = on_chunk.as_mut() {
                    cb(&buf[..n]);
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            // Linux reports EIO on the master once the slave side is gone.
            Err(e) if e.raw_os_error() == Some(nix::libc::EIO) => break,
            Err(e) => {
                debug!(error = %e, "error reading pty master; treating as EOF");
                break;
            }
        }
    }

    let status = child.wait().map_err(spawn_err)?;
    let exit_code = match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => -1,
    };
    debug!(exit_code, bytes = stdout.len(), "pty process exited");

    Ok(PtyResult {
        exit_code,
        stdout,
        stderr: Vec::new(),
    })
}

fn stdio_for(slave: &OwnedFd) -> std::io::Result<Stdio> {
    Ok(Stdio::from(slave.try_clone()?))
}
