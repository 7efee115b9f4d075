// src/sync/hosts.rs

//! Host aliases from an OpenSSH client config.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::planner::expand_tilde;

pub const DEFAULT_SSH_CONFIG: &str = "~/.ssh/config";

pub fn default_ssh_config_path() -> PathBuf {
    PathBuf::from(expand_tilde(DEFAULT_SSH_CONFIG))
}

/// Names declared on `Host` lines, in file order. Patterns containing `*`
/// or `?` are skipped.
pub fn parse_hosts(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (keyword, rest) = line.split_once(char::is_whitespace)?;
            keyword.eq_ignore_ascii_case("host").then_some(rest)
        })
        .flat_map(str::split_whitespace)
        .filter(|name| !name.contains(['*', '?']))
        .map(str::to_string)
        .collect()
}

/// Read `path` and list its hosts. An unreadable file yields no hosts.
pub fn list_hosts(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_hosts(&content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ssh config not readable");
            Vec::new()
        }
    }
}
