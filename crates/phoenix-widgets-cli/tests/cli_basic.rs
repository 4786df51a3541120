//! Basic CLI E2E tests.
//!
//! Tests run the built binary with the config directory pointed at a
//! temporary folder.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_phoenix-widgets"))
        .args(args)
        .env("PHOENIX_WIDGETS_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn parse_json(json: &str) -> serde_json::Value {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

#[test]
fn test_score_fresh_widget() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["score", "--json"]);
    assert_eq!(code, 0);

    let json = parse_json(&stdout);
    let score = json["score"].as_f64().unwrap();
    assert!((score - 0.6).abs() < 1e-9);
    assert_eq!(json["action"], "maintain");
}

#[test]
fn test_score_stale_widget_is_removed() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["score", "--hours-since-view", "24", "--age-hours", "24", "--json"],
    );
    assert_eq!(code, 0);
    assert_eq!(parse_json(&stdout)["action"], "remove");
}

#[test]
fn test_context_multiplier() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["context", "sleep-quality", "--hour", "23"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("x1.9"), "unexpected output: {stdout}");
}

#[test]
fn test_context_rejects_bad_hour() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["context", "sleep-quality", "--hour", "24"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "constraints.max_widgets"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "8");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "constraints.max_widgets", "4"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "constraints.max_widgets"]);
    assert_eq!(stdout.trim(), "4");
    assert!(dir.path().join("config.toml").exists());

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "constraints.max_widgets"]);
    assert_eq!(stdout.trim(), "8");
}

#[test]
fn test_config_unknown_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "constraints.bogus", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_place_reports_collisions_and_slot() {
    let dir = tempfile::tempdir().unwrap();
    let layout = dir.path().join("layout.json");
    std::fs::write(
        &layout,
        r#"{
            "viewport": { "width": 1440, "height": 900 },
            "widgets": [
                { "id": "a", "widget_type": "calendar-today", "rect": { "x": 10, "y": 10, "width": 300, "height": 150 } },
                { "id": "b", "widget_type": "sleep-quality", "rect": { "x": 100, "y": 100, "width": 300, "height": 150 } }
            ]
        }"#,
    )
    .unwrap();

    let (stdout, _, code) = run_cli(
        dir.path(),
        &["place", "--layout", layout.to_str().unwrap(), "--json"],
    );
    assert_eq!(code, 0);

    let json = parse_json(&stdout);
    let collisions = json["collisions"].as_array().unwrap();
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0]["widget1"], "a");
    assert_eq!(collisions[0]["widget2"], "b");
    assert!(json["placement"].is_object());
}

#[test]
fn test_simulate_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let args = ["simulate", "--minutes", "5", "--seed", "9", "--json"];
    let (first, _, code) = run_cli(dir.path(), &args);
    assert_eq!(code, 0);
    let (second, _, _) = run_cli(dir.path(), &args);

    let a = parse_json(&first);
    let b = parse_json(&second);
    assert_eq!(a["summary"], b["summary"]);
    assert_eq!(a["outcomes"], b["outcomes"]);
    assert_eq!(a["seed"], 9);
}

#[test]
fn test_watch_stops_opening_at_capacity() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["watch", "--seconds", "0", "--widgets", "12"]);
    assert_eq!(code, 0, "stderr: {stderr}");
    assert!(stdout.contains("on 8 widget(s)"), "unexpected output: {stdout}");
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("phoenix-widgets"));
}
