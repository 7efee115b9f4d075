// tests/config.rs

use std::io::Write;
use std::time::Duration;

use syncroute::config::{ConfigFile, load_and_validate};
use syncroute::errors::SyncrouteError;
use syncroute::sync::{Destination, HookTarget};
use syncroute::types::OutputPolicy;
use syncroute_test_utils::builders::{ConfigFileBuilder, RouteConfigBuilder};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const ROUTES: &str = r#"
[config]
delete_extraneous = true
output = "quiet-until-failure"
timeout = "30m"
additional_flags = ["--checksum"]

[route.backup]
delete_extraneous = false

[[route.backup.batch]]
sources = ["~/data", "/etc/app"]
destinations = ["/backup", "box1:/srv"]
requires_sudo = true
chown = "root:root"
excludes = [".git", "*.tmp"]

[[route.backup.before]]
line = "systemctl stop app"
host = "box1"
cwd = "/srv"
requires_sudo = true

[[route.backup.after]]
line = "echo done"

[[route.mirror.batch]]
sources = ["/www"]
destinations = ["web1:/var/www"]
"#;

fn write_config(contents: &str) -> std::io::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn loads_routes_batches_and_hooks() -> TestResult {
    let file = write_config(ROUTES)?;
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.output, OutputPolicy::QuietUntilFailure);
    assert_eq!(cfg.timeout, Some(Duration::from_secs(30 * 60)));
    assert_eq!(cfg.additional_flags, vec!["--checksum"]);
    assert_eq!(cfg.route_names().collect::<Vec<_>>(), vec!["backup", "mirror"]);

    let backup = cfg.route("backup").expect("backup route");
    assert!(!backup.delete_extraneous);
    let batch = &backup.batches[0];
    assert_eq!(batch.sources, vec!["~/data", "/etc/app"]);
    assert_eq!(
        batch.destinations,
        vec![Destination::local("/backup"), Destination::remote("box1", "/srv")]
    );
    assert!(batch.requires_sudo);
    assert_eq!(batch.chown.as_deref(), Some("root:root"));
    assert_eq!(batch.excludes, vec![".git", "*.tmp"]);

    assert_eq!(backup.before.len(), 1);
    assert_eq!(
        backup.before[0].target,
        HookTarget::Remote {
            host: "box1".into(),
            cwd: Some("/srv".into())
        }
    );
    assert!(backup.before[0].requires_sudo);
    assert_eq!(backup.after[0].target, HookTarget::Local { cwd: None });

    // Falls back to [config].delete_extraneous.
    assert!(cfg.route("mirror").expect("mirror route").delete_extraneous);
    Ok(())
}

#[test]
fn config_without_routes_is_rejected() {
    let err = ConfigFile::try_from(ConfigFileBuilder::new().raw()).unwrap_err();
    assert!(matches!(err, SyncrouteError::ConfigError(ref msg) if msg.contains("at least one")));
}

#[test]
fn batch_without_destinations_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_route("r", RouteConfigBuilder::new().batch(&["/a"], &[]).build())
        .raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("destinations"), "{err}");
}

#[test]
fn remote_destination_without_directory_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_route("r", RouteConfigBuilder::new().batch(&["/a"], &["box1:"]).build())
        .raw();
    assert!(ConfigFile::try_from(raw).is_err());
}

#[test]
fn empty_hook_line_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .with_route(
            "r",
            RouteConfigBuilder::new().batch(&["/a"], &["/b"]).before("  ", None).build(),
        )
        .raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("before hook #1"), "{err}");
}

#[test]
fn bad_timeout_is_rejected() {
    let raw = ConfigFileBuilder::new()
        .timeout("5 fortnights")
        .with_route("r", RouteConfigBuilder::new().batch(&["/a"], &["/b"]).build())
        .raw();
    let err = ConfigFile::try_from(raw).unwrap_err();
    assert!(err.to_string().contains("timeout"), "{err}");
}

#[test]
fn builder_produces_a_valid_config() {
    let cfg = ConfigFileBuilder::new()
        .delete_extraneous(true)
        .with_route(
            "r",
            RouteConfigBuilder::new()
                .batch(&["/a"], &["h:/b"])
                .after("echo hi", Some("h"))
                .build(),
        )
        .build();
    let route = cfg.route("r").unwrap();
    assert!(route.delete_extraneous);
    assert_eq!(route.after.len(), 1);
}

#[test]
fn unknown_keys_and_bad_output_modes_are_toml_errors() -> TestResult {
    let file = write_config("[config]\nouput = \"quiet\"\n")?;
    assert!(matches!(load_and_validate(file.path()), Err(SyncrouteError::TomlError(_))));

    let file = write_config("[config]\noutput = \"loud\"\n")?;
    assert!(matches!(load_and_validate(file.path()), Err(SyncrouteError::TomlError(_))));
    Ok(())
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/Syncroute.toml").unwrap_err();
    assert!(matches!(err, SyncrouteError::IoError(_)));
}
