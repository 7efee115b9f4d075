// tests/hook.rs

#![cfg(unix)]

use std::sync::Arc;

use syncroute::errors::SyncError;
use syncroute::exec::Launcher;
use syncroute::sync::{ExecutionOptions, Hook, ProcessCommandRunner, hook_command, run_hook};
use syncroute::types::OutputPolicy;

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn local_hook_is_wrapped_in_a_login_shell() {
    let cmd = hook_command(&Hook::local("make deploy"));
    assert_eq!(cmd.argv(), argv(&["sh", "-lc", "make deploy"]).as_slice());
}

#[test]
fn local_hook_with_cwd_and_sudo() {
    let cmd = hook_command(&Hook::local("systemctl restart app").cwd("/srv/app").requires_sudo(true));
    assert_eq!(
        cmd.argv(),
        argv(&["sh", "-lc", "cd /srv/app && sudo systemctl restart app"]).as_slice()
    );
}

#[test]
fn empty_cwd_is_ignored() {
    let cmd = hook_command(&Hook::local("ls").cwd(""));
    assert_eq!(cmd.argv()[2], "ls");
}

#[test]
fn remote_hook_goes_through_ssh_as_one_quoted_line() {
    let hook = Hook::remote("box1", "systemctl restart app")
        .cwd("/srv")
        .requires_sudo(true);
    let cmd = hook_command(&hook);

    assert_eq!(&cmd.argv()[..4], argv(&["ssh", "box1", "sh", "-lc"]).as_slice());
    assert_eq!(cmd.argv()[4], "'cd /srv && sudo systemctl restart app'");
    // What the remote shell ends up parsing.
    let remote: Vec<String> = shell_words::split(&cmd.argv()[2..].join(" ")).unwrap();
    assert_eq!(remote, argv(&["sh", "-lc", "cd /srv && sudo systemctl restart app"]));
}

fn quiet_options() -> ExecutionOptions {
    ExecutionOptions {
        output: OutputPolicy::Quiet,
        launcher: Launcher::Env,
        runner: Arc::new(ProcessCommandRunner),
        ..ExecutionOptions::default()
    }
}

#[tokio::test]
async fn local_hook_runs_for_real() {
    let dir = tempfile::tempdir().unwrap();
    let hook = Hook::local("touch marker && echo ok").cwd(dir.path().display().to_string());

    let result = run_hook(&hook, &quiet_options()).await.unwrap();

    assert_eq!(result.stdout_text(), "ok\n");
    assert!(dir.path().join("marker").exists());
}

#[tokio::test]
async fn failing_local_hook_is_a_hook_failure() {
    let err = run_hook(&Hook::local("exit 9"), &quiet_options()).await.unwrap_err();
    match err {
        SyncError::HookFailed {
            command_line,
            exit_code,
            ..
        } => {
            assert_eq!(exit_code, 9);
            assert_eq!(command_line, "sh -lc 'exit 9'");
        }
        other => panic!("expected HookFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failing_hook_keeps_its_captured_output() {
    let hook = Hook::local("echo preparing; echo 'disk full' >&2; exit 3");

    let err = run_hook(&hook, &quiet_options()).await.unwrap_err();

    let result = err.result().unwrap();
    assert_eq!(result.stdout_text(), "preparing\n");
    assert_eq!(result.stderr_text(), "disk full\n");
    assert_eq!(err.exit_code(), Some(3));
}
