//! Smoke tests -- verify the binary runs and key subcommands load.

use assert_cmd::Command;

#[test]
fn test_cli_help() {
    Command::cargo_bin("riskwatch")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "Per-employee security incident risk aggregation",
        ));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("riskwatch")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("riskwatch"));
}

#[test]
fn test_serve_subcommand_exists() {
    Command::cargo_bin("riskwatch")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success();
}

#[test]
fn test_fetch_once_subcommand_exists() {
    Command::cargo_bin("riskwatch")
        .unwrap()
        .args(["fetch-once", "--help"])
        .assert()
        .success()
        .stdout(predicates::str::contains("dump-dir"));
}
