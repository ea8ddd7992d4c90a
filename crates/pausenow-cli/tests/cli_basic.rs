//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temp directory so
//! config and history never touch the real user profile.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &std::path::Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_pausenow"))
        .args(args)
        .env("HOME", home)
        .env_remove("PAUSENOW_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "eye_break_interval_minutes"]);
    assert_eq!(code, 0, "config get failed");
    assert_eq!(stdout.trim(), "20");
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "standup_seconds", "240"]);
    assert_eq!(code, 0, "config set failed");

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "standup_seconds"]);
    assert_eq!(stdout.trim(), "240");
    assert!(home.path().join(".config/pausenow/config.toml").exists());
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "nope", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_reset() {
    let home = tempfile::tempdir().unwrap();
    run_cli(home.path(), &["config", "set", "eye_break_seconds", "45"]);
    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "eye_break_seconds"]);
    assert_eq!(stdout.trim(), "20");
}

#[test]
fn test_stats_today_json_starts_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["stats", "today", "--json"]);
    assert_eq!(code, 0, "stats today failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["completed_count"], 0);
    assert_eq!(parsed["skipped_count"], 0);
}

#[test]
fn test_preview_paused_snapshot() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["preview", "--state", "paused", "--remaining", "90"],
    );
    assert_eq!(code, 0, "preview failed");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["home"]["remaining_text"], "01:30");
    assert_eq!(parsed["home"]["is_flowing"], false);
}

#[test]
fn test_preview_stopped_shows_full_interval() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["preview"]);
    assert_eq!(code, 0);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["home"]["remaining_text"], "20:00");
    assert_eq!(parsed["home"]["sand_progress"], 1.0);
}
