//! CLI Integration Tests
//!
//! These tests run the `safeair` binary without a backend. Run them with:
//! ```
//! cargo test --package safeair-cli --test cli_integration
//! ```

use std::path::Path;
use std::process::{Command, Output};

/// Run safeair with no backend configured and the config rooted at `config_home`.
fn run_safeair_in(config_home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_safeair"))
        .args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("SAFEAIR_LIVE_URL")
        .env_remove("LIVE_URL")
        .env_remove("SAFEAIR_MAPS_API_KEY")
        .env_remove("SAFEAIR_STYLE")
        .env_remove("NO_COLOR")
        .output()
        .expect("Failed to run safeair binary")
}

fn run_safeair(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("tempdir");
    run_safeair_in(dir.path(), args)
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// =============================================================================
// Help and Version
// =============================================================================

#[test]
fn test_help_command() {
    let output = run_safeair(&["--help"]);
    assert!(output.status.success(), "Help should succeed");

    let out = stdout(&output);
    for command in ["devices", "stats", "live", "trends", "register", "map", "config"] {
        assert!(out.contains(command), "Help should list {command}");
    }
}

#[test]
fn test_version_command() {
    let output = run_safeair(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_subcommand_help() {
    let output = run_safeair(&["trends", "--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("--day"));
    assert!(out.contains("--start"));
    assert!(out.contains("--end"));

    let output = run_safeair(&["register", "--help"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("--owner-type"));
    assert!(out.contains("--no-input"));
}

// =============================================================================
// Argument Errors
// =============================================================================

#[test]
fn test_invalid_subcommand() {
    let output = run_safeair(&["frobnicate"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("unrecognized subcommand"));
}

#[test]
fn test_trends_start_requires_end() {
    let output = run_safeair(&["trends", "--start", "2025-01-01"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("--end"));
}

#[test]
fn test_trends_rejects_bad_date() {
    let output = run_safeair(&["trends", "--start", "01/02/2025", "--end", "2025-01-07"]);
    assert!(!output.status.success());
}

#[test]
fn test_map_rejects_bad_size() {
    let output = run_safeair(&["map", "--size", "big"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("WIDTHxHEIGHT"));
}

// =============================================================================
// No Backend
// =============================================================================

#[test]
fn test_devices_without_backend() {
    let output = run_safeair(&["devices"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No backend configured"));
}

#[test]
fn test_stats_without_backend() {
    let output = run_safeair(&["stats"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("SAFEAIR_LIVE_URL"));
}

#[test]
fn test_register_without_input_lists_missing_fields() {
    let output = run_safeair(&[
        "register",
        "--base-url",
        "http://127.0.0.1:9",
        "--no-input",
        "--uid",
        "SAT-0001",
    ]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Missing required fields"));
    assert!(err.contains("--owner-name"));
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn test_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_safeair_in(dir.path(), &["config", "path"]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("safeair"));
    assert!(out.trim_end().ends_with("config.toml"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_safeair_in(dir.path(), &["config", "set", "poll-interval", "7"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_safeair_in(dir.path(), &["config", "get", "poll-interval"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "7");

    let output = run_safeair_in(dir.path(), &["config", "set", "poll-interval", "0"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_repairs_invalid_thresholds() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("safeair");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "elevated_threshold = 1200.0\nhigh_threshold = 1000.0\n",
    )
    .unwrap();

    // Commands that classify readings report the bad bands.
    let output = run_safeair_in(
        dir.path(),
        &["devices", "--base-url", "http://127.0.0.1:9"],
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid thresholds"));

    // The config command still works, so the file can be fixed.
    let output = run_safeair_in(dir.path(), &["config", "show"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_safeair_in(dir.path(), &["config", "unset", "elevated-threshold"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let output = run_safeair_in(dir.path(), &["config", "get", "elevated-threshold"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "");
}

// =============================================================================
// Completions
// =============================================================================

#[test]
fn test_completions_bash() {
    let output = run_safeair(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("safeair"));
}
