// CLI integration tests
//
// Every test points --config at a temp file so the user's config is never read.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn config_dir(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("optotoken.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

fn optotoken(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("optotoken").unwrap();
    cmd.arg("--config").arg(config).env_remove("RUST_LOG");
    cmd
}

const LAB_CONFIG: &str = "[token]\nsecret = \"USAB_2025_LAB3\"\n";

#[test]
fn token_for_window_zero() {
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path)
        .args(["token", "--window", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Token:    855857"))
        .stdout(predicate::str::contains("Next:     746144"));
}

#[test]
fn token_json_from_elapsed_seconds() {
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path)
        .args(["token", "--elapsed-secs", "65", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"window\": 2"))
        .stdout(predicate::str::contains("\"current\": 9875"));
}

#[test]
fn token_requires_a_window() {
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path).arg("token").assert().failure();
}

#[test]
fn different_secret_changes_tokens() {
    let (_dir, path) = config_dir("[token]\nsecret = \"USAB_2025_LAB4\"\n");
    optotoken(&path)
        .args(["token", "--window", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("855857").not());
}

#[test]
fn verify_session_reports_each_entry() {
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path)
        .args(["verify", "--no-wait", "--pulse-ms", "0"])
        .write_stdin("855857\nabc\n000001\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synchronized. origin ="))
        .stdout(predicate::str::contains("Window #0"))
        .stdout(predicate::str::contains("Token valid."))
        .stdout(predicate::str::contains("Invalid input."))
        .stdout(predicate::str::contains(
            "Token invalid. (current=855857, -1=855857, +1=746144)",
        ));
}

#[test]
fn verify_waits_for_enter_then_ends_at_eof() {
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path)
        .args(["verify", "--pulse-ms", "0"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Press ENTER to synchronize"))
        .stdout(predicate::str::contains("Synchronized."));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    optotoken(&path)
        .args(["token", "--window", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn invalid_config_fails() {
    let (_dir, path) = config_dir("[token]\nwindow_secs = 0\n");
    optotoken(&path)
        .args(["token", "--window", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_secs"));
}

#[test]
fn device_simulator_shows_first_token() {
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path)
        .args(["device", "--sync-after-ms", "100", "--run-secs", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Awaiting sync"))
        .stdout(predicate::str::contains("TOKEN: 855857"));
}

#[test]
fn device_rejects_pulse_at_startup() {
    // A sensor lit at start-up never produces a rising edge.
    let (_dir, path) = config_dir(LAB_CONFIG);
    optotoken(&path)
        .args(["device", "--sync-after-ms", "0", "--run-secs", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sync-after-ms"));
}
