// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sync;
pub mod types;

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::errors::{Result, SyncrouteError};
use crate::exec::RunResult;
use crate::sync::hosts::{default_ssh_config_path, list_hosts};
use crate::sync::{ExecutionEvent, ExecutionOptions, Route, RouteReport, hook_command, plan, sync_route};
use crate::types::OutputPolicy;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - route file loading and route selection
/// - plan printing (`--plan`)
/// - the executor, with an event reporter task
/// - Ctrl-C handling (cancels the in-flight command)
pub async fn run(args: CliArgs) -> Result<()> {
    if args.list_hosts {
        let path = args
            .ssh_config
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(default_ssh_config_path);
        for host in list_hosts(&path) {
            println!("{host}");
        }
        return Ok(());
    }

    let config_path = args
        .config
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);
    let cfg = load_and_validate(&config_path)?;
    let routes = select_routes(&cfg, &args.routes)?;
    let delete_override = args.delete_override();
    let output = args.output.unwrap_or(cfg.output);

    let mut additional_flags = cfg.additional_flags.clone();
    additional_flags.extend(args.flags.iter().cloned());

    let base = ExecutionOptions {
        dry_run: args.dry_run,
        additional_flags,
        output,
        timeout: cfg.timeout,
        ..ExecutionOptions::default()
    };

    if args.plan {
        print_plan(&routes, &base, delete_override);
        return Ok(());
    }

    // Ctrl-C → cancel the in-flight command.
    {
        let token = base.cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; cancelling");
            token.cancel();
        });
    }

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_events(events_rx));
    let options = ExecutionOptions {
        events: Some(events_tx),
        ..base
    };

    let mut outcome = Ok(());
    for route in routes {
        info!(route = %route.name, "syncing route");
        match sync_route(route, &options, delete_override).await {
            Ok(report) => log_report(&report),
            Err(e) => {
                outcome = Err(SyncrouteError::from(e));
                break;
            }
        }
    }

    // Closing the last sender ends the reporter.
    drop(options);
    if let Err(e) = reporter.await {
        warn!(error = %e, "event reporter stopped abnormally");
    }

    if let Err(e) = &outcome {
        if output == OutputPolicy::QuietUntilFailure {
            if let Some(result) = e.failed_result() {
                print_captured(result);
            }
        }
    }

    outcome
}

/// Routes named on the command line (in that order), or all routes.
fn select_routes<'a>(cfg: &'a ConfigFile, names: &[String]) -> Result<Vec<&'a Route>> {
    if names.is_empty() {
        return Ok(cfg.routes().collect());
    }
    names
        .iter()
        .map(|name| {
            cfg.route(name)
                .ok_or_else(|| SyncrouteError::RouteNotFound(name.clone()))
        })
        .collect()
}

/// Log progress events until every sender is gone.
async fn report_events(mut rx: mpsc::UnboundedReceiver<ExecutionEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            ExecutionEvent::CommandStarted {
                command,
                index,
                total,
            } => {
                info!(index, total, command = %command.pretty_line(), "command started");
            }
            ExecutionEvent::CommandFinished {
                index,
                total,
                result,
                ..
            } => {
                debug!(index, total, summary = %result.short_summary(), "command finished");
            }
        }
    }
}

fn log_report(report: &RouteReport) {
    for (i, summary) in report.summaries.iter().enumerate() {
        if !summary.is_empty() {
            info!(route = %report.route, index = i + 1, "{summary}");
        }
    }
    info!(
        route = %report.route,
        commands = report.results.len(),
        sent_bytes = report.total_sent_bytes(),
        "route finished"
    );
}

fn print_captured(result: &RunResult) {
    let stdout = result.stdout_text();
    let stderr = result.stderr_text();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
    if !stderr.is_empty() {
        eprintln!("{stderr}");
    }
}

/// `--plan` output: hooks and the rewritten rsync commands per route.
fn print_plan(routes: &[&Route], options: &ExecutionOptions, delete_override: Option<bool>) {
    println!("syncroute plan");
    for route in routes {
        let planned = plan(route, delete_override);
        println!();
        println!("route {} ({} commands):", route.name, planned.len());

        for hook in &route.before {
            println!("  before: {}", hook_command(hook).pretty_line());
        }
        for (i, command) in planned.iter().enumerate() {
            let rewritten = options.rewrite(command);
            println!("  [{}/{}]", i + 1, planned.len());
            for line in rewritten.pretty_multiline().lines() {
                println!("    {line}");
            }
        }
        for hook in &route.after {
            println!("  after: {}", hook_command(hook).pretty_line());
        }
    }

    debug!("plan printed (no execution)");
}
