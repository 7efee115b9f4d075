// tests/runner.rs

#![cfg(unix)]

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use syncroute::exec::{ExecContext, ExitStatus, Launcher, ShellError, ShellKind, run};
use syncroute_test_utils::{init_tracing, with_timeout};
use tokio_util::sync::CancellationToken;

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> ExecContext {
    ExecContext::new("/bin/sh").args(["-c", script])
}

#[tokio::test]
async fn captures_stdout_and_stderr_separately() -> TestResult {
    init_tracing();
    let result = run(&sh("printf out; printf err >&2"), &CancellationToken::new()).await?;

    assert_eq!(result.status, ExitStatus::Exited(0));
    assert_eq!(result.stdout_text(), "out");
    assert_eq!(result.stderr_text(), "err");
    assert_eq!(result.launched_path, "/bin/sh");
    assert!(result.pid > 0);
    Ok(())
}

#[tokio::test]
async fn stdin_bytes_reach_the_child() -> TestResult {
    let result = run(&ExecContext::new("cat").stdin("hello\n"), &CancellationToken::new()).await?;
    assert_eq!(result.stdout_text(), "hello\n");
    Ok(())
}

#[tokio::test]
async fn env_overlay_without_inheritance_is_the_whole_environment() -> TestResult {
    let ctx = ExecContext::new("/usr/bin/env")
        .inherit_env(false)
        .env("ONLY_VAR", "1");
    let result = run(&ctx, &CancellationToken::new()).await?;

    assert_eq!(result.stdout_text().trim(), "ONLY_VAR=1");
    Ok(())
}

#[tokio::test]
async fn env_overlay_wins_over_inherited_values() -> TestResult {
    let ctx = sh("printf %s \"$HOME\"").env("HOME", "/overlay");
    let result = run(&ctx, &CancellationToken::new()).await?;
    assert_eq!(result.stdout_text(), "/overlay");
    Ok(())
}

#[tokio::test]
async fn cwd_is_applied() -> TestResult {
    let dir = tempfile::tempdir()?;
    let result = run(&sh("pwd -P").cwd(dir.path()), &CancellationToken::new()).await?;
    assert_eq!(
        result.stdout_text().trim(),
        dir.path().canonicalize()?.display().to_string()
    );
    Ok(())
}

#[tokio::test]
async fn exit_code_seven_is_rejected_with_code_seven() {
    let err = run(&sh("echo boom >&2; exit 7"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), Some(7));
    assert!(matches!(err, ShellError::NonZeroExit { code: 7, .. }));
    let result = err.result().unwrap();
    assert_eq!(result.status, ExitStatus::Exited(7));
    assert_eq!(result.stderr_text(), "boom\n");
    assert!(err.to_string().contains("boom"));
}

#[tokio::test]
async fn accepted_exit_codes_are_not_errors() -> TestResult {
    let result = run(&sh("exit 3").accept_exit_codes([0, 3]), &CancellationToken::new()).await?;
    assert_eq!(result.exit_code(), Some(3));
    Ok(())
}

#[tokio::test]
async fn signal_termination_is_not_an_exit_code() -> TestResult {
    let result = run(&sh("kill -KILL $$"), &CancellationToken::new()).await?;

    assert_eq!(result.status, ExitStatus::Signaled(9));
    assert_eq!(result.exit_code(), None);
    assert!(!result.success());
    Ok(())
}

#[tokio::test]
async fn timeout_kills_the_child() {
    init_tracing();
    let started = Instant::now();
    let err = with_timeout(run(
        &sh("sleep 30").timeout(Duration::from_millis(200)),
        &CancellationToken::new(),
    ))
    .await
    .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));

    let ShellError::TimedOut { pid, after } = err else {
        unreachable!()
    };
    assert_eq!(after, Duration::from_millis(200));
    let gone = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), None);
    assert_eq!(gone, Err(nix::errno::Errno::ESRCH));
}

#[tokio::test]
async fn zero_timeout_means_no_timeout() -> TestResult {
    let result = run(&sh("sleep 0.1").timeout(Duration::ZERO), &CancellationToken::new()).await?;
    assert!(result.success());
    Ok(())
}

#[tokio::test]
async fn cancellation_terminates_the_child() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = with_timeout(run(&sh("sleep 30"), &cancel)).await.unwrap_err();
    assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
}

#[tokio::test]
async fn large_output_on_both_streams_does_not_deadlock() -> TestResult {
    let script = "head -c 1048576 /dev/zero; head -c 1048576 /dev/zero >&2";
    let result = with_timeout(run(&sh(script), &CancellationToken::new())).await?;

    assert_eq!(result.stdout.len(), 1_048_576);
    assert_eq!(result.stderr.len(), 1_048_576);
    Ok(())
}

#[tokio::test]
async fn chunk_callbacks_see_every_byte() -> TestResult {
    let seen_out = Arc::new(Mutex::new(Vec::new()));
    let seen_err = Arc::new(Mutex::new(Vec::new()));
    let (out, err) = (Arc::clone(&seen_out), Arc::clone(&seen_err));

    let ctx = sh("echo one; echo two >&2; echo three")
        .on_stdout_chunk(move |chunk| out.lock().unwrap().extend_from_slice(chunk))
        .on_stderr_chunk(move |chunk| err.lock().unwrap().extend_from_slice(chunk));
    let result = run(&ctx, &CancellationToken::new()).await?;

    assert_eq!(*seen_out.lock().unwrap(), result.stdout);
    assert_eq!(*seen_err.lock().unwrap(), result.stderr);
    assert_eq!(result.stdout_text(), "one\nthree\n");
    Ok(())
}

#[tokio::test]
async fn missing_program_is_a_launch_error() {
    let err = run(
        &ExecContext::new("/definitely/not/here"),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        ShellError::Launch { program, source } => {
            assert_eq!(program, "/definitely/not/here");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected launch error, got {other:?}"),
    }
}

#[tokio::test]
async fn shell_launcher_passes_one_quoted_line() -> TestResult {
    let ctx = ExecContext::new("printf")
        .args(["%s|", "a b", "$HOME"])
        .launcher(Launcher::Shell(ShellKind::Sh));
    let result = run(&ctx, &CancellationToken::new()).await?;

    assert_eq!(result.launched_path, "/bin/sh");
    assert_eq!(result.argv[0], "-lc");
    assert_eq!(result.argv.len(), 2);
    assert_eq!(result.stdout_text(), "a b|$HOME|");
    Ok(())
}

#[tokio::test]
async fn env_launcher_prefixes_usr_bin_env() -> TestResult {
    let ctx = ExecContext::new("echo").arg("hi").launcher(Launcher::Env);
    let result = run(&ctx, &CancellationToken::new()).await?;

    assert_eq!(result.launched_path, "/usr/bin/env");
    assert_eq!(result.argv, vec!["echo", "hi"]);
    assert_eq!(result.stdout_text(), "hi\n");
    Ok(())
}

#[tokio::test]
async fn secrets_never_appear_in_diagnostics() {
    let secret = "hunter2-s3cr3t";
    let ctx = sh(&format!("echo {secret}; echo \"$TOKEN\" >&2; exit 4"))
        .env("TOKEN", secret)
        .env(format!("KEY_{secret}"), "x")
        .redact(secret);

    let err = run(&ctx, &CancellationToken::new()).await.unwrap_err();

    // The child still received the secret verbatim.
    let result = err.result().unwrap();
    assert!(result.stdout_text().contains(secret));
    assert!(result.stderr_text().contains(secret));

    let rendered = [
        err.to_string(),
        err.pretty(4096),
        format!("{err:?}"),
        format!("{:?}", err.context().unwrap()),
    ];
    for text in rendered {
        assert!(!text.contains(secret), "secret leaked in: {text}");
    }
    assert!(err.pretty(4096).contains("‹redacted›"));
}

#[tokio::test]
async fn secret_in_working_directory_is_redacted() -> TestResult {
    let secret = "tok3n-abc123";
    let tmp = tempfile::tempdir()?;
    let dir = tmp.path().join(secret);
    std::fs::create_dir(&dir)?;

    let err = run(&sh("exit 3").cwd(&dir).redact(secret), &CancellationToken::new())
        .await
        .unwrap_err();

    let report = err.pretty(400);
    assert!(!report.contains(secret), "secret leaked in: {report}");
    let cwd_line = report
        .lines()
        .find(|line| line.trim_start().starts_with("CWD:"))
        .unwrap();
    assert!(cwd_line.ends_with("‹redacted›"), "{cwd_line}");
    assert!(!format!("{:?}", err.context().unwrap()).contains(secret));
    Ok(())
}

#[tokio::test]
async fn pretty_report_lists_context() {
    let err = run(
        &sh("exit 2").env("SOME_KEY", "value").timeout(Duration::from_secs(30)),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    let report = err.pretty(100);
    assert!(report.contains("Exit code: 2"));
    assert!(report.contains("Expected exit codes: 0"));
    assert!(report.contains("SOME_KEY=‹redacted›"));
    assert!(!report.contains("=value"));
    assert!(report.contains("/bin/sh -c 'exit 2'"));
}
