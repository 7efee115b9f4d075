// src/exec/terminate.rs

//! Graceful termination of a child and its process group.

use std::time::Duration;

use tokio::process::Child;
use tracing::{debug, warn};

/// Grace period between SIGTERM and SIGKILL after a timeout.
pub const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Grace period between SIGTERM and SIGKILL after a cancellation.
pub const CANCEL_GRACE: Duration = Duration::from_millis(200);

/// Send `signal` to the process group led by `pid`. A group that is already
/// gone is not an error.
#[cfg(unix)]
pub fn signal_group(pid: u32, signal: nix::sys::signal::Signal) {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    match killpg(Pid::from_raw(raw), signal) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pid, ?signal, error = %e, "failed to signal process group"),
    }
}

/// SIGTERM the group, wait up to `grace` for the child, then SIGKILL.
///
/// Returns once the child has been reaped (or killing it failed).
#[cfg(unix)]
pub async fn terminate(child: &mut Child, pid: u32, grace: Duration) {
    use nix::sys::signal::Signal;

    debug!(pid, "sending SIGTERM to process group");
    signal_group(pid, Signal::SIGTERM);

    if tokio::time::timeout(grace, child.wait()).await.is_ok() {
        return;
    }

    debug!(pid, "grace period elapsed; sending SIGKILL");
    signal_group(pid, Signal::SIGKILL);
    if let Err(e) = child.kill().await {
        warn!(pid, error = %e, "failed to kill child process");
    }
}

#[cfg(not(unix))]
pub async fn terminate(child: &mut Child, pid: u32, grace: Duration) {
    if let Err(e) = child.start_kill() {
        warn!(pid, error = %e, "failed to kill child process");
    }
    let _ = tokio::time::timeout(grace, child.wait()).await;
}
