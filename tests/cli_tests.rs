//! CLI integration tests for the stayfront binary
//!
//! These tests run the compiled binary and check its output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a Command instance for the stayfront binary
#[allow(deprecated)]
fn stayfront_cmd() -> Command {
    let mut cmd = Command::cargo_bin("stayfront").expect("Failed to find stayfront binary");
    cmd.env_remove("RUST_LOG")
        .env_remove("STAYFRONT__MONITORING__MODE")
        .env_remove("STAYFRONT__NOTIFICATIONS__MAX_VISIBLE");
    cmd
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config");
    file
}

// ============================================================================
// --version / --help
// ============================================================================

#[test]
fn test_version_flag() {
    stayfront_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    stayfront_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("capture"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("toast"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_missing_subcommand_fails() {
    stayfront_cmd().assert().failure();
}

// ============================================================================
// capture
// ============================================================================

#[test]
fn test_capture_infers_category() {
    stayfront_cmd()
        .args(["capture", "HTTP 401 Unauthorized", "--severity", "high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"category\": \"auth\""))
        .stdout(predicate::str::contains("\"severity\": \"high\""))
        .stdout(predicate::str::contains("\"error_id\": \"err_"));
}

#[test]
fn test_capture_with_data_and_redirect() {
    stayfront_cmd()
        .args([
            "-q",
            "capture",
            "Session expired",
            "--category",
            "auth",
            "--data",
            "listing_id=42",
            "--data",
            "city=lisbon",
            "--redirect",
            "/login",
            "--user",
            "guest-7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"listing_id\": 42"))
        .stdout(predicate::str::contains("\"city\": \"lisbon\""))
        .stdout(predicate::str::contains("\"user_id\": \"guest-7\""))
        .stdout(predicate::str::contains("redirected to /login"));
}

#[test]
fn test_capture_rejects_bad_data() {
    stayfront_cmd()
        .args(["capture", "boom", "--data", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

#[test]
fn test_capture_rejects_unknown_severity() {
    stayfront_cmd()
        .args(["capture", "boom", "--severity", "severe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown severity"));
}

// ============================================================================
// classify
// ============================================================================

#[test]
fn test_classify_network() {
    stayfront_cmd()
        .args(["classify", "TypeError: Failed to fetch"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("network"));
}

#[test]
fn test_classify_unknown() {
    stayfront_cmd()
        .args(["classify", "the moon is made of cheese"])
        .assert()
        .success()
        .stdout(predicate::str::diff("unknown\n"));
}

// ============================================================================
// toast
// ============================================================================

#[test]
fn test_toast_renders_panel() {
    stayfront_cmd()
        .args([
            "toast",
            "Booking confirmed",
            "--kind",
            "success",
            "--message",
            "See you in Lisbon",
            "--duration-ms",
            "3000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("SUCCESS Booking confirmed"))
        .stdout(predicate::str::contains("See you in Lisbon"))
        .stdout(predicate::str::contains("auto-dismiss in 3s"))
        .stdout(predicate::str::contains("\u{1b}").not());
}

#[test]
fn test_toast_persistent() {
    stayfront_cmd()
        .args(["--no-color", "toast", "Verify your email", "--persistent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("persistent"));
}

#[test]
fn test_toast_empty_title_fails() {
    stayfront_cmd()
        .args(["toast", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title must not be empty"));
}

#[test]
fn test_toast_persistent_conflicts_with_duration() {
    stayfront_cmd()
        .args(["toast", "x", "--persistent", "--duration-ms", "10"])
        .assert()
        .failure();
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_config_defaults() {
    stayfront_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[monitoring]"))
        .stdout(predicate::str::contains("mode = \"development\""))
        .stdout(predicate::str::contains("max_reports = 100"))
        .stdout(predicate::str::contains("default_duration_ms = 5000"));
}

#[test]
fn test_config_file_is_loaded() {
    let file = write_config(
        r#"
[monitoring]
mode = "production"
max_reports = 25

[notifications]
default_duration_ms = 2500
"#,
    );

    stayfront_cmd()
        .arg("--config")
        .arg(file.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("mode = \"production\""))
        .stdout(predicate::str::contains("max_reports = 25"))
        .stdout(predicate::str::contains("default_duration_ms = 2500"));
}

#[test]
fn test_env_overrides_config() {
    stayfront_cmd()
        .env("STAYFRONT__MONITORING__MODE", "production")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("mode = \"production\""));
}

#[test]
fn test_missing_config_file_fails() {
    stayfront_cmd()
        .args(["--config", "/nonexistent/stayfront.toml", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}
