// src/sync/planner.rs

//! Pure translation of a [`Route`] into ordered `rsync` commands.

use super::route::{Batch, Command, Destination, Plan, Route};

/// Program every synchronization command runs.
pub const RSYNC: &str = "rsync";

/// Flags every synchronization command starts with.
pub const BASE_FLAGS: [&str; 2] = ["-avz", "--progress"];

/// Plan `route`: one command per (batch, source, destination), in that
/// nesting order.
///
/// `delete_override` replaces the route's `delete_extraneous` default when
/// set. Planning never touches the filesystem or the network.
pub fn plan(route: &Route, delete_override: Option<bool>) -> Plan {
    let delete = delete_override.unwrap_or(route.delete_extraneous);

    let commands = route
        .batches
        .iter()
        .flat_map(|batch| {
            batch.sources.iter().flat_map(move |source| {
                batch
                    .destinations
                    .iter()
                    .map(move |destination| rsync_command(batch, source, destination, delete))
            })
        })
        .collect();

    Plan {
        route: route.clone(),
        commands,
    }
}

fn rsync_command(batch: &Batch, source: &str, destination: &Destination, delete: bool) -> Command {
    let mut argv: Vec<String> = std::iter::once(RSYNC)
        .chain(BASE_FLAGS)
        .map(String::from)
        .collect();

    if delete {
        argv.push("--delete".to_string());
    }
    if let Some(owner) = batch.chown.as_deref().filter(|o| !o.is_empty()) {
        argv.push(format!("--chown={owner}"));
    }
    argv.extend(batch.excludes.iter().map(|p| format!("--exclude={p}")));
    if batch.requires_sudo {
        argv.push("--rsync-path=sudo rsync".to_string());
    }

    argv.push(expand_tilde(source));
    argv.push(match destination {
        Destination::Remote { host, directory } => format!("{host}:{directory}"),
        Destination::Local { directory } => expand_tilde(directory),
    });

    Command::new(argv)
}

/// Expand a leading `~` to the user's home directory. Pure string transform;
/// the path need not exist.
pub fn expand_tilde(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}
