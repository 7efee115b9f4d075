// src/exec/diagnostics.rs

//! Diagnostic rendering for failed invocations.
//!
//! Redaction happens here and only here: the bytes handed to the child are
//! never touched, but anything rendered for a human (command lines, env
//! dumps, output previews) goes through [`redact`] first.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::context::{ExecContext, Launcher};

/// Replacement for redacted literals.
pub const REDACTION_MARKER: &str = "‹redacted›";

/// Default bound for output previews embedded in errors.
pub const PREVIEW_BYTES: usize = 400;

/// Replace every occurrence of every non-empty redaction literal.
pub fn redact(text: &str, redactions: &[String]) -> String {
    redactions
        .iter()
        .filter(|needle| !needle.is_empty())
        .fold(text.to_string(), |acc, needle| {
            acc.replace(needle.as_str(), REDACTION_MARKER)
        })
}

/// Quote `launch_path` + `argv` for display, redacting each word before
/// quoting and the joined line afterwards (secrets spanning words).
pub fn quote_command_line(launch_path: &str, argv: &[String], redactions: &[String]) -> String {
    let words: Vec<String> = std::iter::once(launch_path)
        .chain(argv.iter().map(String::as_str))
        .map(|word| redact(word, redactions))
        .collect();
    redact(&shell_words::join(&words), redactions)
}

/// First `max_bytes` of `text`, cut on a char boundary.
pub fn preview(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

pub(crate) fn clamp(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        text.to_string()
    } else {
        format!("{}… [truncated]", preview(text, max_bytes))
    }
}

/// Everything needed to reproduce a failed invocation, with secrets removed.
///
/// The redaction literals themselves are not kept, only their count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub launcher: Launcher,
    /// Redacted, quoted launch path + argv.
    pub command_line: String,
    /// Working directory, redacted like the command line.
    pub cwd: Option<String>,
    pub inherit_env: bool,
    /// Child environment with redaction applied to every value.
    pub env: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    pub accepted_exit_codes: BTreeSet<i32>,
    pub tee_stdout: bool,
    pub tee_stderr: bool,
    pub redaction_count: usize,
    pub duration: Duration,
    pub pid: u32,
}

impl RunContext {
    pub fn capture(
        ctx: &ExecContext,
        launch_path: &str,
        argv: &[String],
        env: &BTreeMap<String, String>,
        duration: Duration,
        pid: u32,
    ) -> Self {
        let redactions = &ctx.redactions;
        Self {
            launcher: ctx.launcher,
            command_line: quote_command_line(launch_path, argv, redactions),
            cwd: ctx
                .cwd
                .as_ref()
                .map(|p| redact(&p.display().to_string(), redactions)),
            inherit_env: ctx.inherit_env,
            env: env
                .iter()
                .map(|(k, v)| (redact(k, redactions), redact(v, redactions)))
                .collect(),
            timeout: ctx.timeout,
            accepted_exit_codes: ctx.accepted_exit_codes.clone(),
            tee_stdout: ctx.tee_stdout,
            tee_stderr: ctx.tee_stderr,
            redaction_count: redactions.iter().filter(|r| !r.is_empty()).count(),
            duration,
            pid,
        }
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Multi-line report header used by `ShellError::pretty`.
    pub(crate) fn render(&self, code: i32) -> String {
        let kv = |k: &str, v: String| format!("    {k}: {v}\n");
        let mut out = String::new();
        out.push_str(&format!("✗ Exit code: {code}\n"));
        out.push_str(&kv("PID", self.pid.to_string()));
        out.push_str(&kv("Duration", format!("{:.3}s", self.duration.as_secs_f64())));
        out.push_str(&kv("Launcher", format!("{:?}", self.launcher)));
        out.push_str(&kv(
            "CWD",
            self.cwd.clone().unwrap_or_else(|| "(none)".to_string()),
        ));
        out.push_str(&kv("Inherit env", self.inherit_env.to_string()));
        out.push_str(&kv(
            "Timeout",
            self.timeout
                .map(|t| format!("{:.3}s", t.as_secs_f64()))
                .unwrap_or_else(|| "(none)".to_string()),
        ));
        out.push_str(&kv(
            "Expected exit codes",
            self.accepted_exit_codes
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(","),
        ));
        out.push_str(&kv("Tee stdout", self.tee_stdout.to_string()));
        out.push_str(&kv("Tee stderr", self.tee_stderr.to_string()));
        out.push_str(&kv(
            "Redactions",
            if self.redaction_count == 0 {
                "(none)".to_string()
            } else {
                format!("{} literal(s)", self.redaction_count)
            },
        ));

        out.push_str("\n— Launcher & Args —\n");
        out.push_str(&format!("  {}\n", self.command_line));

        out.push_str("\n— Environment (values hidden) —\n");
        if self.env.is_empty() {
            out.push_str("  (empty)\n");
        } else {
            for key in self.env.keys() {
                out.push_str(&format!("  {key}={REDACTION_MARKER}\n"));
            }
        }
        out
    }
}
