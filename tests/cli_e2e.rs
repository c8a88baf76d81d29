//! End-to-end CLI tests for the request-gateway binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use support::start_mock_server_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

/// Command isolated from the user's config and token files.
fn isolated(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("request-gateway").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("request-gateway").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Call the admin console API"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("request-gateway").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("request-gateway"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("request-gateway").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_token_set_and_clear_persist_to_file() {
    let home = TempDir::new().unwrap();
    let token_file = home.path().join("tokens.json");

    isolated(&home)
        .args(["-q", "token", "set", "abc.def.ghi", "--token-file"])
        .arg(&token_file)
        .assert()
        .success();
    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&token_file).unwrap()).unwrap();
    assert_eq!(stored, json!({"Admin-Token": "abc.def.ghi"}));

    isolated(&home)
        .args(["-q", "token", "clear", "--token-file"])
        .arg(&token_file)
        .assert()
        .success();
    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&token_file).unwrap()).unwrap();
    assert_eq!(stored, json!({}));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.toml");
    std::fs::write(&config, "timeout_ms = 0\n").unwrap();

    isolated(&home)
        .args(["token", "clear", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_ms"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_prints_unwrapped_data() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/models"))
        .and(query_param("spac_id", "3"))
        .and(header("authorization", "Bearer stored-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 200, "data": {"name": "qwen"}})),
        )
        .mount(&mock_server)
        .await;

    let home = TempDir::new().unwrap();
    let config = home.path().join("config.toml");
    std::fs::write(&config, format!("base_url = \"{}\"\n", mock_server.uri())).unwrap();
    let token_file = home.path().join("tokens.json");
    std::fs::write(&token_file, r#"{"Admin-Token":"stored-token"}"#).unwrap();

    isolated(&home)
        .args(["-q", "--scope-id", "3", "send", "GET", "/api/models", "--config"])
        .arg(&config)
        .arg("--token-file")
        .arg(&token_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"qwen\""));
}
