//! Integration tests for the `pansync` binary.
//!
//! Offline commands run against temp files; `sync` runs end to end against
//! a wiremock Panorama. Nothing touches the user's real configuration.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `pansync` binary with env isolation.
///
/// Clears all `PANSYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn pansync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pansync");
    cmd.env("HOME", "/tmp/pansync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/pansync-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("PANSYNC_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const HEADER: &str = "group_name,rule_name,rule_type,description,tags,group_rules_by_tag,\
audit_commit,source_zone,source_address,destination_zone,destination_address,application,services,\
action,profile_type,group_profile,log_settings\n";

fn rule_row(name: &str) -> String {
    format!(
        "G1,{name},universal,managed,t1,,false,zoneA,10.0.0.0/8,zoneB,any,ssl web-browsing,\
         application-default,allow,group,default,log-fwd\n"
    )
}

fn rule_file(rows: &[String]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    file.write_all(HEADER.as_bytes()).unwrap();
    for row in rows {
        file.write_all(row.as_bytes()).unwrap();
    }
    file
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = pansync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    pansync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Panorama")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("device-groups")),
    );
}

#[test]
fn test_version_flag() {
    pansync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pansync"));
}

#[test]
fn test_completions_bash() {
    pansync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_concurrency_is_usage_error() {
    pansync_cmd()
        .args(["sync", "pano", "DG1", "--concurrency", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_zero_create_timeout_is_usage_error() {
    pansync_cmd()
        .args(["sync", "pano", "DG1", "--create-timeout", "0"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_default_output_applies() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("pansync");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[defaults]\noutput = \"json\"\n",
    )
    .unwrap();
    let file = rule_file(&[rule_row("r1")]);

    let output = pansync_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("check")
        .arg(file.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rules"], 1);
}

#[test]
fn test_config_path() {
    pansync_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Check ───────────────────────────────────────────────────────────

#[test]
fn test_check_clean_file() {
    let file = rule_file(&[rule_row("r1"), rule_row("r2")]);
    pansync_cmd()
        .arg("check")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2 valid rule(s), 0 problem(s)"));
}

#[test]
fn test_check_reports_problems() {
    let file = rule_file(&[rule_row("r1"), "G1,short\n".into(), rule_row("r1")]);
    let output = pansync_cmd().arg("check").arg(file.path()).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("malformed_row"), "stdout:\n{stdout}");
    assert!(stdout.contains("duplicate"), "stdout:\n{stdout}");
}

#[test]
fn test_check_exit_zero() {
    let file = rule_file(&["G1,short\n".into()]);
    pansync_cmd()
        .args(["check", "--exit-zero"])
        .arg(file.path())
        .assert()
        .success();
}

#[test]
fn test_check_json_output() {
    let file = rule_file(&[rule_row("r1"), rule_row(" ")]);
    let output = pansync_cmd()
        .args(["check", "-o", "json"])
        .arg(file.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rules"], 1);
    assert_eq!(report["problems"][0]["row"], 3);
    assert_eq!(report["problems"][0]["kind"], "missing_name");
}

#[test]
fn test_check_missing_file() {
    let output = pansync_cmd()
        .args(["check", "/tmp/pansync-cli-test-nonexistent/all.csv"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Cannot read rule file"));
}

// ── Sync argument validation ────────────────────────────────────────

#[test]
fn test_sync_without_host_is_usage_error() {
    let output = pansync_cmd().arg("sync").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Missing"));
}

#[test]
fn test_unknown_profile() {
    let output = pansync_cmd()
        .args(["-p", "nope", "sync", "pano", "DG1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("profile 'nope' not found"));
}

// ── Sync against a mock Panorama ────────────────────────────────────

async fn mock_panorama(existing: &[&str]) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<response status = 'success'><result><key>TESTKEY</key></result></response>",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/restapi/v10.1/Panorama/DeviceGroups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@status": "success",
            "@code": "19",
            "result": { "entry": [{ "@name": "DG-Branch" }, { "@name": "DG-Core" }] }
        })))
        .mount(&server)
        .await;

    let entries: Vec<_> = existing.iter().map(|n| json!({ "@name": n })).collect();
    Mock::given(method("GET"))
        .and(path("/restapi/v10.1/Policies/SecurityPreRules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "@status": "success",
            "@code": "19",
            "result": { "entry": entries }
        })))
        .mount(&server)
        .await;

    server
}

fn created_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "@status": "success",
        "@code": "20",
        "msg": "command succeeded"
    }))
}

async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_creates_missing_rules() {
    let server = mock_panorama(&["r1"]).await;
    Mock::given(method("POST"))
        .and(path("/restapi/v10.1/Policies/SecurityPreRules"))
        .and(query_param("device-group", "DG-Branch"))
        .and(body_partial_json(json!({
            "entry": { "from": { "member": ["zoneA"] }, "action": "allow" }
        })))
        .respond_with(created_ok())
        .expect(2)
        .mount(&server)
        .await;

    let file = rule_file(&[rule_row("r1"), rule_row("r2"), rule_row("r3")]);
    let mut cmd = pansync_cmd();
    cmd.args(["-o", "json", "sync", &server.uri(), "DG-Branch", "admin", "secret"])
        .arg(file.path());
    let output = run(cmd).await;

    assert_eq!(
        output.status.code(),
        Some(0),
        "{}",
        combined_output(&output)
    );
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["created"].as_array().unwrap().len(), 2);
    assert_eq!(report["skipped"][0]["name"], "r1");
    assert_eq!(report["skipped"][0]["reason"]["kind"], "already_exists");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Syncing"), "{stderr}");
    assert!(stderr.contains("Authenticated as admin"), "{stderr}");
    assert!(stderr.contains("Device group DG-Branch exists"), "{stderr}");
    assert!(!stderr.contains("secret"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_dry_run_creates_nothing() {
    let server = mock_panorama(&[]).await;
    Mock::given(method("POST"))
        .and(path("/restapi/v10.1/Policies/SecurityPreRules"))
        .respond_with(created_ok())
        .expect(0)
        .mount(&server)
        .await;

    let file = rule_file(&[rule_row("r1")]);
    let mut cmd = pansync_cmd();
    cmd.args(["-o", "plain", "sync", &server.uri(), "DG-Branch", "--api-key", "K", "--dry-run"])
        .arg("--rule-file")
        .arg(file.path());
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("r1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_unknown_device_group() {
    let server = mock_panorama(&[]).await;
    Mock::given(method("POST"))
        .and(path("/restapi/v10.1/Policies/SecurityPreRules"))
        .respond_with(created_ok())
        .expect(0)
        .mount(&server)
        .await;

    let file = rule_file(&[rule_row("r1")]);
    let mut cmd = pansync_cmd();
    cmd.args(["sync", &server.uri(), "DG-Missing", "--api-key", "K", "-f"])
        .arg(file.path());
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("DG-Missing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_partial_failure() {
    let server = mock_panorama(&[]).await;
    Mock::given(method("POST"))
        .and(path("/restapi/v10.1/Policies/SecurityPreRules"))
        .and(query_param("name", "bad"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 3,
            "message": "Invalid Object"
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/restapi/v10.1/Policies/SecurityPreRules"))
        .respond_with(created_ok())
        .mount(&server)
        .await;

    let file = rule_file(&[rule_row("good"), rule_row("bad"), rule_row("also-good")]);
    let mut cmd = pansync_cmd();
    cmd.args(["sync", &server.uri(), "DG-Branch", "--api-key", "K", "-f"])
        .arg(file.path());
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(text.contains("1 of 3 rule creation(s) failed"), "{text}");
    assert!(text.contains("2 created, 0 skipped, 1 failed"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            "<response status = 'error' code = '403'><result><msg>Invalid Credential</msg></result></response>",
        ))
        .mount(&server)
        .await;

    let file = rule_file(&[rule_row("r1")]);
    let mut cmd = pansync_cmd();
    cmd.args(["sync", &server.uri(), "DG-Branch", "admin", "wrong"])
        .arg(file.path());
    let output = run(cmd).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("Invalid Credential"));
}
