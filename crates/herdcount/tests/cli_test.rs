//! Integration tests for the `herdcount` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! without a service; the query commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `herdcount` binary with env isolation.
///
/// Clears all `HERDCOUNT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn herdcount_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("herdcount");
    cmd.env("HOME", "/tmp/herdcount-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/herdcount-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("HERDCOUNT_API_URL")
        .env_remove("HERDCOUNT_USERNAME")
        .env_remove("HERDCOUNT_PASSWORD")
        .env_remove("HERDCOUNT_OUTPUT")
        .env_remove("HERDCOUNT_TIMEOUT")
        .env_remove("HERDCOUNT_INSECURE")
        .env_remove("HERDCOUNT_CA_CERT")
        .env_remove("HERDCOUNT_DATETIME_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same, aimed at `server` with alice's credentials.
fn against(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = herdcount_cmd();
    cmd.args(["--api-url", &format!("{}/api", server.uri())])
        .args(["--username", "alice", "--password", "secret"]);
    cmd
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login realizado com sucesso",
            "token": "abc123",
            "username": "alice"
        })))
        .mount(server)
        .await;
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = herdcount_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    herdcount_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("counting service")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("counts")),
    );
}

#[test]
fn test_version_flag() {
    herdcount_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("herdcount"));
}

#[test]
fn test_invalid_output_format() {
    herdcount_cmd()
        .args(["--output", "xml", "stats"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_counts_all_conflicts_with_recent() {
    herdcount_cmd()
        .args(["counts", "--all", "--recent"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    herdcount_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    herdcount_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("herdcount"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path() {
    herdcount_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_reflects_env_and_flags() {
    herdcount_cmd()
        .env("HERDCOUNT_API_URL", "https://farm.example/api")
        .args(["--timeout", "7", "-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("https://farm.example/api")
                .and(predicate::str::contains("\"timeout\": 7")),
        );
}

#[test]
fn test_config_file_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("herdcount");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "api_url = \"http://10.0.0.5:5000/api\"\nusername = \"carol\"\n",
    )
    .unwrap();

    herdcount_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["-o", "plain", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://10.0.0.5:5000/api"));
}

#[test]
fn test_bad_datetime_format_is_a_usage_error() {
    herdcount_cmd()
        .env("HERDCOUNT_DATETIME_FORMAT", "%Q")
        .args(["--api-url", "http://127.0.0.1:1/api", "count", "add", "d1"])
        .assert()
        .code(2);
}

// ── Service commands ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_ping() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "API funcionando!",
            "timestamp": "2024-06-15T10:30:00"
        })))
        .mount(&server)
        .await;

    against(&server)
        .arg("ping")
        .assert()
        .success()
        .stdout(predicate::str::contains("API funcionando!"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stats_json() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/counts/stats"))
        .and(header("Authorization", "Bearer abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_animals": 120,
            "total_records": 40,
            "today": 12,
            "this_week": 60,
            "this_month": 110
        })))
        .mount(&server)
        .await;

    against(&server)
        .args(["-o", "json-compact", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_animals\":120"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_wrong_password_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Credenciais inválidas" })),
        )
        .mount(&server)
        .await;

    against(&server)
        .arg("stats")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Credenciais inválidas"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_list_plain() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "id": "d1", "name": "Gate", "last_seen": "2024-06-15T10:30:00" },
                { "id": "d2", "name": "Barn", "last_seen": "2024-06-15T10:31:00" }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    against(&server)
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::diff("d1\nd2\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_table_shows_liveness() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [{ "id": "d1", "name": "Gate", "last_seen": "2020-01-01T00:00:00" }],
            "total": 1
        })))
        .mount(&server)
        .await;

    against(&server)
        .args(["devices", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Inactive"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_heartbeat_for_unknown_device() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/devices/nope/heartbeat"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "Dispositivo não encontrado" })),
        )
        .mount(&server)
        .await;

    against(&server)
        .args(["devices", "heartbeat", "nope"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("devices list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_counts_recent_are_newest_first() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/counts/today"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "counts": [
                { "id": "c1", "device_id": "d1", "count": 1, "animal_type": "bovino",
                  "timestamp": "2024-06-15T10:30:00" },
                { "id": "c2", "device_id": "d1", "count": 2, "animal_type": "bovino",
                  "timestamp": "2024-06-15T10:35:00" }
            ],
            "total_today": 3,
            "records": 2
        })))
        .mount(&server)
        .await;

    against(&server)
        .args(["-o", "plain", "counts", "--recent"])
        .assert()
        .success()
        .stdout(predicate::str::diff("c2\nc1\n"));
}

#[test]
fn test_count_zero_is_rejected() {
    herdcount_cmd()
        .args(["--api-url", "http://127.0.0.1:1/api", "count", "add", "d1", "-n", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_unreachable_service_exits_with_connection_code() {
    herdcount_cmd()
        .args(["--api-url", "http://127.0.0.1:1/api", "ping"])
        .assert()
        .code(7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_without_terminal_reports_login_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Credenciais inválidas" })),
        )
        .mount(&server)
        .await;

    let output = against(&server).arg("watch").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Credenciais inválidas"));
}
