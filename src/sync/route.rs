// src/sync/route.rs

//! Synchronization model: routes, batches, destinations, commands, plans.

use std::fmt;

use super::hook::Hook;

/// Where one batch's sources are copied to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    Local { directory: String },
    Remote { host: String, directory: String },
}

impl Destination {
    pub fn local(directory: impl Into<String>) -> Self {
        Destination::Local {
            directory: directory.into(),
        }
    }

    pub fn remote(host: impl Into<String>, directory: impl Into<String>) -> Self {
        Destination::Remote {
            host: host.into(),
            directory: directory.into(),
        }
    }

    /// Parse the route-file string form.
    ///
    /// `host:/dir` is remote; anything else (`/dir`, `~/dir`, `./a:b`) is a
    /// local directory. The host part must be non-empty and contain no `/`.
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((host, directory)) if !host.is_empty() && !host.contains('/') => {
                Destination::remote(host, directory)
            }
            _ => Destination::local(s),
        }
    }

    pub fn directory(&self) -> &str {
        match self {
            Destination::Local { directory } | Destination::Remote { directory, .. } => directory,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Destination::Remote { .. })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Local { directory } => write!(f, "{directory}"),
            Destination::Remote { host, directory } => write!(f, "{host}:{directory}"),
        }
    }
}

/// A group of sources synced to every one of a group of destinations with
/// shared options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    pub sources: Vec<String>,
    pub destinations: Vec<Destination>,
    pub requires_sudo: bool,
    pub chown: Option<String>,
    pub excludes: Vec<String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn destination(mut self, destination: Destination) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn requires_sudo(mut self, sudo: bool) -> Self {
        self.requires_sudo = sudo;
        self
    }

    pub fn chown(mut self, owner: impl Into<String>) -> Self {
        self.chown = Some(owner.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Number of commands this batch plans to.
    pub fn command_count(&self) -> usize {
        self.sources.len() * self.destinations.len()
    }
}

/// A named, reusable synchronization job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub batches: Vec<Batch>,
    pub delete_extraneous: bool,
    /// Hooks run before the first synchronization command.
    pub before: Vec<Hook>,
    /// Hooks run after the last synchronization command succeeded.
    pub after: Vec<Hook>,
}

impl Route {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Vec::new(),
            delete_extraneous: false,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    pub fn batch(mut self, batch: Batch) -> Self {
        self.batches.push(batch);
        self
    }

    pub fn delete_extraneous(mut self, delete: bool) -> Self {
        self.delete_extraneous = delete;
        self
    }

    pub fn before(mut self, hook: Hook) -> Self {
        self.before.push(hook);
        self
    }

    pub fn after(mut self, hook: Hook) -> Self {
        self.after.push(hook);
        self
    }
}

/// One external invocation: `argv[0]` is the program name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    argv: Vec<String>,
}

impl Command {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// Parse a shell-quoted line (as produced by [`Command::pretty_line`]).
    pub fn from_line(line: &str) -> Result<Self, shell_words::ParseError> {
        shell_words::split(line).map(Self::new)
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn into_argv(self) -> Vec<String> {
        self.argv
    }

    /// Single line, quoting only the arguments that need it.
    pub fn pretty_line(&self) -> String {
        shell_words::join(&self.argv)
    }

    /// One argument per line with ` \` continuations:
    ///
    /// ```text
    /// rsync \
    ///     -avz \
    ///     /src
    /// ```
    pub fn pretty_multiline(&self) -> String {
        let words: Vec<String> = self
            .argv
            .iter()
            .map(|a| shell_words::quote(a).into_owned())
            .collect();
        let last = words.len().saturating_sub(1);
        words
            .iter()
            .enumerate()
            .map(|(i, word)| {
                let indent = if i == 0 { "" } else { "    " };
                let cont = if i == last { "" } else { " \\" };
                format!("{indent}{word}{cont}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_line())
    }
}

/// Ordered commands for one route. Produced by
/// [`plan`](super::planner::plan); never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub route: Route,
    pub commands: Vec<Command>,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }
}
