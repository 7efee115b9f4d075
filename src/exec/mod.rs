// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`context`] describes one invocation ([`ExecContext`]).
//! - [`runner`] launches it, drains output and enforces timeout and
//!   cancellation ([`run`]).
//! - [`status`] holds the [`RunResult`] and [`ExitStatus`] types.
//! - [`diagnostics`] renders redacted failure reports.
//! - [`pty`] runs a program attached to a pseudo-terminal.
//! - [`drain`] and [`terminate`] are the runner's building blocks.

pub mod context;
pub mod diagnostics;
pub mod drain;
pub mod error;
#[cfg(unix)]
pub mod pty;
pub mod runner;
pub mod status;
pub mod terminate;

pub use context::{ChunkCallback, ExecContext, Launcher, ShellKind};
pub use diagnostics::RunContext;
pub use error::{PtyError, ShellError};
#[cfg(unix)]
pub use pty::{PtyResult, run_pty};
pub use runner::run;
pub use status::{ExitStatus, RunResult};
