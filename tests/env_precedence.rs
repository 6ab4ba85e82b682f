use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::{fs, path::Path, process::Command};
use tempfile::tempdir;

const TOML: &str = r#"
            [http]
            host = "127.0.0.1"
            port = 9999
        "#;

fn fleetwatch(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fleetwatch").unwrap();
    cmd.current_dir(dir)
        .env_remove("PORT")
        .env_remove("API_GATEWAY_URL")
        .env_remove("FLEETWATCH__HTTP__PORT")
        .env_remove("FLEETWATCH__HTTP__HOST");
    cmd
}

#[test]
fn file_value_is_used_when_no_env_or_cli() {
    let dir = tempdir().expect("failed to create temp dir for test");
    fs::write(dir.path().join("fleetwatch.toml"), TOML).unwrap();

    let mut cmd = fleetwatch(dir.path());
    cmd.arg("--print-bind");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:9999"));
}

#[test]
fn default_port_without_any_config() {
    let dir = tempdir().expect("failed to create temp dir for test");

    let mut cmd = fleetwatch(dir.path());
    cmd.arg("--print-bind");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.0.0.0:5000"));
}

#[test]
fn env_override_wins_over_file() {
    let dir = tempdir().expect("failed to create temp dir for test");
    fs::write(dir.path().join("fleetwatch.toml"), TOML).unwrap();

    let mut cmd = fleetwatch(dir.path());
    cmd.env("FLEETWATCH__HTTP__PORT", "7000").arg("--print-bind");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:7000"));
}

#[test]
fn plain_port_wins_over_prefixed_env() {
    let dir = tempdir().expect("failed to create temp dir for test");
    fs::write(dir.path().join("fleetwatch.toml"), TOML).unwrap();

    let mut cmd = fleetwatch(dir.path());
    cmd.env("FLEETWATCH__HTTP__PORT", "7000")
        .env("PORT", "7100")
        .arg("--print-bind");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:7100"));
}

#[test]
fn cli_override_wins_over_env_and_file() {
    let dir = tempdir().expect("failed to create temp dir for test");
    fs::write(dir.path().join("fleetwatch.toml"), TOML).unwrap();

    let mut cmd = fleetwatch(dir.path());
    cmd.env("FLEETWATCH__HTTP__PORT", "7000")
        .env("PORT", "7100")
        .arg("--http-bind")
        .arg("127.0.0.1:6000")
        .arg("--print-bind");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("127.0.0.1:6000"));
}

#[test]
fn non_http_upstream_is_rejected() {
    let dir = tempdir().expect("failed to create temp dir for test");

    let mut cmd = fleetwatch(dir.path());
    cmd.env("API_GATEWAY_URL", "ftp://files.example.com")
        .arg("--print-bind");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("upstream.base_url"));
}
