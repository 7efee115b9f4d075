// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::sync::Route;
use crate::types::OutputPolicy;

/// Route file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// delete_extraneous = false
/// output = "verbose"
/// timeout = "30m"
///
/// [[route.backup.batch]]
/// sources = ["~/data"]
/// destinations = ["/backup", "box1:/srv"]
///
/// [[route.backup.after]]
/// line = "systemctl restart app"
/// host = "box1"
/// requires_sudo = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Global defaults from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All routes from `[route.<name>]`, keyed by route name.
    #[serde(default)]
    pub route: BTreeMap<String, RouteConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Default for routes that do not set `delete_extraneous` themselves.
    #[serde(default)]
    pub delete_extraneous: bool,

    #[serde(default)]
    pub output: OutputPolicy,

    /// Per-command timeout, e.g. `"30m"`. No timeout when absent.
    #[serde(default)]
    pub timeout: Option<String>,

    /// Extra rsync flags added to every command.
    #[serde(default)]
    pub additional_flags: Vec<String>,
}

/// `[route.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    /// Falls back to `[config].delete_extraneous` when `None`.
    #[serde(default)]
    pub delete_extraneous: Option<bool>,

    #[serde(default)]
    pub batch: Vec<BatchConfig>,

    #[serde(default)]
    pub before: Vec<HookConfig>,

    #[serde(default)]
    pub after: Vec<HookConfig>,
}

/// `[[route.<name>.batch]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchConfig {
    pub sources: Vec<String>,

    /// `"host:/dir"` for remote destinations, a plain path otherwise.
    pub destinations: Vec<String>,

    #[serde(default)]
    pub requires_sudo: bool,

    #[serde(default)]
    pub chown: Option<String>,

    #[serde(default)]
    pub excludes: Vec<String>,
}

/// `[[route.<name>.before]]` / `[[route.<name>.after]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookConfig {
    pub line: String,

    /// Remote host; the hook runs locally when absent.
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub cwd: Option<String>,

    #[serde(default)]
    pub requires_sudo: bool,
}

/// Validated route file. Only obtainable through `TryFrom<RawConfigFile>`
/// (see [`super::validate`]).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub output: OutputPolicy,
    pub timeout: Option<Duration>,
    pub additional_flags: Vec<String>,
    routes: BTreeMap<String, Route>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        output: OutputPolicy,
        timeout: Option<Duration>,
        additional_flags: Vec<String>,
        routes: BTreeMap<String, Route>,
    ) -> Self {
        Self {
            output,
            timeout,
            additional_flags,
            routes,
        }
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.get(name)
    }

    /// Routes in name order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn route_names(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }
}
