//! CLI integration tests.
//!
//! These tests run the `mseed` binary against the in-memory backend with a
//! temporary state directory.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for running mseed in `dir`, isolated from user config.
fn mseed(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mseed").unwrap();
    cmd.current_dir(dir)
        .env_remove("MSEED_CONFIG")
        .env_remove("MSEED_BACKEND_TOKEN")
        .env_remove("MSEED_SELLER_PASSWORD")
        .env_remove("RUST_LOG")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"));
    cmd
}

/// Write a config selecting the in-memory backend with state under `dir`.
fn memory_config(dir: &Path) -> PathBuf {
    let path = dir.join("mseed.toml");
    std::fs::write(
        &path,
        format!(
            "[backend]\nkind = \"memory\"\n\n[run]\nstate_dir = \"{}\"\nrandom_seed = 7\n",
            dir.join("state").display()
        ),
    )
    .unwrap();
    path
}

#[test]
fn version_flag_works() {
    let dir = TempDir::new().unwrap();
    mseed(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mseed"));
}

#[test]
fn plan_lists_every_step_in_reference_order() {
    let dir = TempDir::new().unwrap();
    mseed(dir.path())
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. sales_channel"))
        .stdout(predicate::str::contains("14. configuration_rules"))
        .stdout(predicate::str::contains("sha256:"));
}

#[test]
fn plan_json_is_machine_readable() {
    let dir = TempDir::new().unwrap();
    let output = mseed(dir.path()).args(["--json", "plan"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let order = value["order"].as_array().unwrap();
    assert_eq!(order.len(), 14);
    assert_eq!(order[0], "sales_channel");
    assert_eq!(order[13], "configuration_rules");
    assert!(value["layers"].as_array().unwrap().len() > 1);
}

#[test]
fn dry_run_writes_no_state() {
    let dir = TempDir::new().unwrap();
    mseed(dir.path())
        .args(["run", "--dry-run", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("inventory_levels"));
    assert!(!dir.path().join(".mseed").exists());
}

#[test]
fn run_commits_then_refuses_without_force() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(dir.path());

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("committed"));
    assert!(dir.path().join("state/seeded.json").exists());
    assert!(dir.path().join("state/journal.json").exists());

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already seeded"))
        .stderr(predicate::str::contains("--force"));

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["run", "--force", "--sequential"])
        .assert()
        .success();
}

#[test]
fn status_reports_committed_run() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(dir.path());

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not seeded"))
        .stdout(predicate::str::contains("No run recorded"));

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["-q", "run"])
        .assert()
        .success();

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded by run"))
        .stdout(predicate::str::contains("phase:    committed"))
        .stdout(predicate::str::contains("14/14 completed"))
        .stdout(predicate::str::contains("seed:     7"));
}

#[test]
fn resume_and_abandon_need_a_run() {
    let dir = TempDir::new().unwrap();
    let config = memory_config(dir.path());

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("resume")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no run to resume"));

    mseed(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("abandon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no run to resume"));
}

#[test]
fn http_backend_without_url_is_reported() {
    let dir = TempDir::new().unwrap();
    mseed(dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no backend URL configured"));
}

#[test]
fn invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[run]\nmax_parallel = 0\n").unwrap();

    mseed(dir.path())
        .arg("--config")
        .arg(&path)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("run.max_parallel"));
}

#[test]
fn plaintext_token_warns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mseed.toml");
    std::fs::write(
        &path,
        "[backend]\nurl = \"http://localhost:9000\"\ntoken = \"abc\"\n",
    )
    .unwrap();

    // Picked up from the working directory.
    mseed(dir.path())
        .arg("status")
        .assert()
        .success()
        .stderr(predicate::str::contains("MSEED_BACKEND_TOKEN"));
}

#[test]
fn completion_generates_script() {
    let dir = TempDir::new().unwrap();
    mseed(dir.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mseed"));
}
