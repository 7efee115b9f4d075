// src/errors.rs

//! Crate-wide error types.

use thiserror::Error;

use crate::exec::{RunResult, ShellError};
use crate::exec::diagnostics::PREVIEW_BYTES;

/// Failure while executing a route.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A planned synchronization command exited with a non-zero code.
    #[error("rsync failed (exit {exit_code}) at command {index}/{total}: {command_line}")]
    CommandFailed {
        command_line: String,
        exit_code: i32,
        index: usize,
        total: usize,
        result: Box<RunResult>,
    },

    /// A before/after hook exited with a non-zero code.
    #[error("hook failed (exit {exit_code}): {command_line}")]
    HookFailed {
        command_line: String,
        exit_code: i32,
        result: Box<RunResult>,
    },

    #[error("planning error: {0}")]
    Planning(String),

    /// Launch failure, timeout or cancellation of an underlying process.
    #[error(transparent)]
    Shell(#[from] ShellError),
}

impl SyncError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            SyncError::CommandFailed { exit_code, .. } | SyncError::HookFailed { exit_code, .. } => {
                Some(*exit_code)
            }
            SyncError::Shell(e) => e.exit_code(),
            SyncError::Planning(_) => None,
        }
    }

    /// Captured output of the process that stopped the run, if it finished.
    pub fn result(&self) -> Option<&RunResult> {
        match self {
            SyncError::CommandFailed { result, .. } | SyncError::HookFailed { result, .. } => {
                Some(&**result)
            }
            SyncError::Shell(e) => e.result(),
            SyncError::Planning(_) => None,
        }
    }

    /// Multi-line report for the terminal.
    pub fn pretty(&self) -> String {
        match self {
            SyncError::CommandFailed {
                command_line,
                exit_code,
                index,
                total,
                ..
            } => format!(
                "✖ rsync failed (command {index}/{total})\n    {command_line}\n    exit: {exit_code}"
            ),
            SyncError::HookFailed {
                command_line,
                exit_code,
                ..
            } => format!("✖ hook failed\n    {command_line}\n    exit: {exit_code}"),
            SyncError::Shell(e) => e.pretty(PREVIEW_BYTES),
            SyncError::Planning(msg) => format!("✖ planning error\n    {msg}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncrouteError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SyncrouteError {
    /// Report printed by the binary before exiting.
    pub fn report(&self) -> String {
        match self {
            SyncrouteError::Sync(e) => e.pretty(),
            other => format!("✖ {other}"),
        }
    }

    /// Output of the failed process, when the failure came from one.
    pub fn failed_result(&self) -> Option<&RunResult> {
        match self {
            SyncrouteError::Sync(e) => e.result(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncrouteError>;
