//! Tests for the `castle-metadata` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn castle_metadata(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("castle-metadata").unwrap();
    cmd.arg("--config").arg(config_dir.path().join("metadata.toml"));
    cmd
}

#[test]
fn test_help() {
    Command::cargo_bin("castle-metadata")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--allow-private-urls"))
        .stdout(predicate::str::contains("--include-source-code"));
}

#[test]
fn test_private_url_fails_with_policy_violation() {
    let temp = TempDir::new().unwrap();
    castle_metadata(&temp)
        .arg("http://10.0.0.5/pkg.castle")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("policy violation"));
}

#[test]
fn test_invalid_url_fails() {
    let temp = TempDir::new().unwrap();
    castle_metadata(&temp)
        .arg("not a url")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid URL"));
}

#[test]
fn test_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("metadata.toml"), "max_redirects = \"lots\"").unwrap();
    castle_metadata(&temp)
        .arg("http://10.0.0.5/pkg.castle")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
