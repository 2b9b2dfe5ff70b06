//! CLI Integration Tests
//!
//! Runs the mrf-parse binary against fixture MRFs in a temp directory.

// The binary is not built for coverage runs
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::{write_mrf, MrfFixture};
use predicates::prelude::*;
use tempfile::TempDir;

fn mrf_parse() -> Command {
    let mut cmd = Command::cargo_bin("mrf-parse").unwrap();
    cmd.env_remove("MRF_INDIR")
        .env_remove("MRF_OUTDIR")
        .env_remove("MRF_FISCAL_START")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_mrf(
        &dir.path().join("adams.xlsx"),
        &MrfFixture::new("Adams High").feedback("Great month"),
    );
    write_mrf(
        &dir.path().join("carver.xlsx"),
        &MrfFixture::new("Carver High"),
    );
    dir
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    mrf_parse()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mrf-parse"))
        .stdout(predicate::str::contains("PROCEDURES"));
}

#[test]
fn test_cli_version() {
    mrf_parse()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mrf-parse"));
}

// ═══════════════════════════════════════════════════════════════════════════
// ARGUMENT VALIDATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_rejects_month_13() {
    mrf_parse().args(["13", "2020", "h"]).assert().failure();
}

#[test]
fn test_cli_rejects_unknown_procedure() {
    mrf_parse().args(["5", "2020", "x"]).assert().failure();
}

#[test]
fn test_cli_missing_input_dir() {
    let dir = TempDir::new().unwrap();
    mrf_parse()
        .args(["5", "2020", "h", "-i"])
        .arg(dir.path().join("nope"))
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a folder"));
}

// ═══════════════════════════════════════════════════════════════════════════
// RUNS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_hours_run_writes_summary() {
    let input = fixture_dir();
    let output = TempDir::new().unwrap();

    mrf_parse()
        .args(["5", "2020", "h", "-y", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary saved to"))
        .stdout(predicate::str::contains("Data extraction took"));

    assert!(output.path().join("TOTAL HOURS PER TENET.xlsx").is_file());
}

#[test]
fn test_cli_money_alias_writes_funds_summary() {
    let input = fixture_dir();

    mrf_parse()
        .args(["1", "2020", "m", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(input.path())
        .assert()
        .success();

    assert!(input.path().join("TOTAL FUNDS RAISED PER DFI.xlsx").is_file());
}

#[test]
fn test_cli_declined_overwrite() {
    let input = fixture_dir();
    let existing = input.path().join("DISTRICT BOARD FEEDBACK.xlsx");
    std::fs::write(&existing, b"keep me").unwrap();

    mrf_parse()
        .args(["12", "2019", "f", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(input.path())
        .write_stdin("n\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Overwrite? [y/N]"))
        .stderr(predicate::str::contains("Overwrite cancelled"));

    assert_eq!(std::fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn test_cli_accepted_overwrite() {
    let input = fixture_dir();
    let existing = input.path().join("DISTRICT BOARD FEEDBACK.xlsx");
    std::fs::write(&existing, b"old").unwrap();

    mrf_parse()
        .args(["12", "2019", "f", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(input.path())
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Overwriting..."));

    assert_ne!(std::fs::read(&existing).unwrap(), b"old");
}

#[test]
fn test_cli_dump_json() {
    let input = fixture_dir();
    let output = TempDir::new().unwrap();

    mrf_parse()
        .args(["12", "2019", "feedback", "-y", "--dump", "json", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"club\": \"Adams High\""))
        .stdout(predicate::str::contains("December: Great month"))
        .stdout(predicate::str::contains("\"club\": \"Carver High\""));
}

#[test]
fn test_cli_skip_invalid() {
    let input = fixture_dir();
    std::fs::write(input.path().join("broken.xlsx"), b"not a zip").unwrap();
    let output = TempDir::new().unwrap();

    mrf_parse()
        .args(["5", "2020", "h", "-y", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .failure();

    mrf_parse()
        .args(["5", "2020", "h", "-y", "--skip-invalid", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped 1"));
}

#[test]
fn test_cli_indir_from_env() {
    let input = fixture_dir();
    let output = TempDir::new().unwrap();

    mrf_parse()
        .args(["5", "2020", "hours", "-y"])
        .env("MRF_INDIR", input.path())
        .env("MRF_OUTDIR", output.path())
        .assert()
        .success();

    assert!(output.path().join("TOTAL HOURS PER TENET.xlsx").is_file());
}
