// src/sync/mod.rs

//! Route synchronization on top of the process runner.
//!
//! - [`route`] holds the declarative model and the planned [`Command`]s.
//! - [`planner`] turns a [`Route`] into a [`Plan`] of `rsync` invocations.
//! - [`executor`] runs a plan strictly in order and reports progress.
//! - [`hook`] runs shell lines before/after a route, locally or via `ssh`.
//! - [`summary`] scrapes transfer statistics from rsync output.
//! - [`hosts`] lists host aliases from `~/.ssh/config`.

pub mod executor;
pub mod hook;
pub mod hosts;
pub mod planner;
pub mod route;
pub mod summary;

pub use executor::{
    CommandRunner, ExecutionEvent, ExecutionOptions, ProcessCommandRunner, RouteReport, execute,
    sync_route,
};
pub use hook::{Hook, HookTarget, hook_command, run_hook};
pub use planner::plan;
pub use route::{Batch, Command, Destination, Plan, Route};
pub use summary::{Summary, parse_summary};
