//! Integration tests for the curlport command line

mod common;

use assert_cmd::Command;
use common::{curlport, curlport_with_env, strip_colors, ExitStatus, MockEnvironment, COLOR};
use predicates::prelude::*;

const GET: &str = "curl https://api.example.com/users";

/// assert_cmd handle with an empty config directory
fn cmd(config: &MockEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("curlport").expect("binary built");
    cmd.env("CURLPORT_CONFIG_DIR", config.config_path())
        .env_remove("NO_COLOR")
        .env_remove("CURLPORT_LANGUAGE")
        .env_remove("CURLPORT_LOG");
    cmd
}

// =============================================================================
// Listing and help
// =============================================================================

#[test]
fn test_list() {
    let env = MockEnvironment::new();
    cmd(&env)
        .args(["--list", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("curl         cURL\n"))
        .stdout(predicate::str::contains("nodejs       Node.js\n    - Native HTTP\n    - Axios\n    - Got\n"))
        .stdout(predicate::str::contains("rust         Rust\n    - Reqwest\n    - Ureq\n"));
}

#[test]
fn test_help_exits_zero() {
    let env = MockEnvironment::new();
    cmd(&env)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--all-variants"));
}

#[test]
fn test_generate_completions() {
    let response = curlport(&["--generate-completions", "bash"]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("curlport"));
}

// =============================================================================
// Generation
// =============================================================================

#[test]
fn test_default_language_is_python() {
    let response = curlport(&[GET]);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);
    assert!(response.contains("import requests"));
    assert!(response.contains("'https://api.example.com/users'"));
}

#[test]
fn test_language_go() {
    let env = MockEnvironment::new();
    cmd(&env)
        .args(["-l", "go", GET])
        .assert()
        .success()
        .stdout(predicate::str::contains("http.NewRequest"))
        .stdout(predicate::str::contains("\"https://api.example.com/users\""));
}

#[test]
fn test_named_variant() {
    let response = curlport(&["-l", "javascript", "-v", "XMLHttpRequest", GET]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("XMLHttpRequest"));
}

#[test]
fn test_all_variants_banners() {
    let response = curlport(&["-l", "python", "--all-variants", GET]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.stdout.starts_with("# --- Requests ---\n"));
    assert!(response.contains("\n# --- HTTP Client ---\n"));
    assert_eq!(response.count("# --- "), 2);
}

#[test]
fn test_language_from_env() {
    let mut env = MockEnvironment::new();
    env.set_env("CURLPORT_LANGUAGE", "php");
    let response = curlport_with_env(&[GET], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("<?php"));
}

// =============================================================================
// Input
// =============================================================================

#[test]
fn test_command_from_stdin() {
    let mut env = MockEnvironment::new();
    env.set_stdin("curl -X POST \\\n  -d 'a=1' \\\n  https://api.example.com/users\n");
    let response = curlport_with_env(&["-l", "python", "-"], &env);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);
    assert!(response.contains("requests.post("));
}

#[test]
fn test_parse_only() {
    let response = curlport(&["--parse-only", "curl -H 'Accept: text/plain' -d 'a=1' https://api.example.com/users"]);
    assert_eq!(response.exit_status, ExitStatus::Success);

    let json = response.json().expect("parse-only prints JSON");
    assert_eq!(json["method"], "POST");
    assert_eq!(json["urls"][0]["url"], "https://api.example.com/users");
    assert_eq!(json["headers"]["Accept"], "text/plain");
    assert_eq!(json["dataArray"][0], "a=1");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_language() {
    let env = MockEnvironment::new();
    cmd(&env)
        .args(["-l", "cobol", GET])
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Unknown language 'cobol'"));
}

#[test]
fn test_unknown_variant() {
    let response = curlport(&["-l", "go", "-v", "Gin", GET]);
    assert_eq!(response.exit_code, 1);
    assert!(response.stderr.contains("Available: HTTP, Resty"));
}

#[test]
fn test_not_a_curl_command() {
    let response = curlport(&["wget https://api.example.com/users"]);
    assert_eq!(response.exit_status, ExitStatus::Error);
    assert!(response.stderr.contains("Command must start with \"curl\""));
    assert!(response.stdout.is_empty());
}

#[test]
fn test_bad_flag_is_a_usage_error() {
    let env = MockEnvironment::new();
    cmd(&env).args(["--no-such-flag", GET]).assert().failure();
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_default_language_and_variant() {
    let mut env = MockEnvironment::new();
    env.write_config("[defaults]\nlanguage = \"go\"\nvariant = \"Resty\"\n");

    let response = curlport_with_env(&[GET], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("resty"));

    // A configured variant does not carry over to another language
    let response = curlport_with_env(&["-l", "python", GET], &env);
    assert_eq!(response.exit_status, ExitStatus::Success, "stderr: {}", response.stderr);
    assert!(response.contains("import requests"));
}

#[test]
fn test_config_options_are_merged() {
    let mut env = MockEnvironment::new();
    env.write_config("[defaults]\noptions = [\"--all-variants\"]\n");

    let response = curlport_with_env(&["-l", "wget", GET], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("# --- Standard ---"));
    assert!(response.contains("# --- Mirror ---"));
}

#[test]
fn test_invalid_config_falls_back_to_defaults() {
    let mut env = MockEnvironment::new();
    env.write_config("[defaults\nlanguage = ");

    let response = curlport_with_env(&[GET], &env);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains("import requests"));
    assert!(response.stderr.contains("failed to load config"));
}

// =============================================================================
// Color
// =============================================================================

#[test]
fn test_color_never_has_no_escapes() {
    let response = curlport(&["--color", "never", GET]);
    assert!(!response.contains(COLOR));
}

#[test]
fn test_color_always_highlights() {
    let response = curlport(&["--color", "always", GET]);
    assert_eq!(response.exit_status, ExitStatus::Success);
    assert!(response.contains(COLOR));
    assert!(strip_colors(&response.stdout).contains("import requests"));
}
