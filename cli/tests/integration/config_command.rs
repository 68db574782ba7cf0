//! Integration tests for `imgrelay config` command.
//!
//! All filesystem-touching tests set `IMGRELAY_CONFIG` to a temp path so
//! they never read or write `~/.imgrelay/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn imgrelay() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("imgrelay"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

// ---------------------------------------------------------------------------
// Subcommand registration
// ---------------------------------------------------------------------------

#[test]
fn test_config_help_shows_show_and_set_subcommands() {
    imgrelay()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("set"));
}

// ---------------------------------------------------------------------------
// `imgrelay config show`
// ---------------------------------------------------------------------------

#[test]
fn test_config_show_without_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    imgrelay()
        .args(["config", "show"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:8080"))
        .stdout(predicate::str::contains("120000"))
        .stdout(predicate::str::contains("5000"));
}

#[test]
fn test_config_show_names_the_file() {
    let (_dir, path) = temp_config_path();
    imgrelay()
        .args(["config", "show"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains(&path));
}

#[test]
fn test_config_show_json() {
    let (_dir, path) = temp_config_path();
    let output = imgrelay()
        .args(["config", "show", "--json"])
        .env("IMGRELAY_CONFIG", &path)
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["config"]["gateway"]["url"], "http://localhost:8080");
    assert_eq!(value["config"]["poll"]["interval_ms"], 5000);
    assert_eq!(value["path"], path.as_str());
}

// ---------------------------------------------------------------------------
// `imgrelay config set`
// ---------------------------------------------------------------------------

#[test]
fn test_config_set_writes_file() {
    let (_dir, path) = temp_config_path();
    imgrelay()
        .args(["config", "set", "gateway.url", "https://relay.example/"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Set gateway.url = https://relay.example"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("https://relay.example"), "got: {written}");

    imgrelay()
        .args(["config", "show"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("https://relay.example"));
}

#[test]
fn test_config_set_unknown_key_fails() {
    let (_dir, path) = temp_config_path();
    imgrelay()
        .args(["config", "set", "security.level", "strict"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown setting"));
    assert!(!std::path::Path::new(&path).exists());
}

#[test]
fn test_config_set_invalid_value_fails() {
    let (_dir, path) = temp_config_path();
    imgrelay()
        .args(["config", "set", "poll.timeout_ms", "soon"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_config_set_poll_interval_round_trips() {
    let (_dir, path) = temp_config_path();
    imgrelay()
        .args(["config", "set", "poll.interval_ms", "2500"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .success();
    imgrelay()
        .args(["config", "show"])
        .env("IMGRELAY_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("2500"));
}
