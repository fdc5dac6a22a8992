//! CLI binary smoke tests using assert_cmd.
//!
//! These tests exercise the compiled `fixmat` binary to verify that
//! argument parsing, help text, and error handling work end-to-end.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("fixmat").unwrap()
}

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[test]
fn no_args_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_flag() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("template"));
}

#[test]
fn version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fixmat"));
}

// ---------------------------------------------------------------------------
// demo / template
// ---------------------------------------------------------------------------

#[test]
fn demo_with_defaults() {
    cmd()
        .arg("demo")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Default matrix (4x3):"))
        .stdout(predicate::str::contains("m3 > m5: true"))
        .stdout(predicate::str::contains("Total matrix objects: 8"));
}

#[test]
fn demo_summary_is_json() {
    cmd()
        .args(["demo", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"live_instances\": 8"));
}

#[test]
fn demo_missing_config_errors() {
    cmd()
        .args(["demo", "/nonexistent/path/demo.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn template_prints_defaults() {
    cmd()
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"square_size\": 2"))
        .stdout(predicate::str::contains("\"default_rows\": 4"));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[test]
fn verbose_flag_logs_to_stderr() {
    cmd()
        .args(["-vv", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total matrix objects: 8"))
        .stderr(predicate::str::contains("Demo finished with 8 live matrices"));
}

#[test]
fn log_env_var_enables_library_logging() {
    cmd()
        .env("FIXMAT_LOG", "fixed_matrix_cli=info")
        .arg("demo")
        .assert()
        .success()
        .stderr(predicate::str::contains("Demo finished with 8 live matrices"));
}

#[test]
fn quiet_by_default_for_library_logs() {
    cmd()
        .env_remove("FIXMAT_LOG")
        .arg("demo")
        .assert()
        .success()
        .stderr(predicate::str::contains("Demo finished").not());
}
