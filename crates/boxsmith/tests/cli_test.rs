//! Integration tests for the `boxsmith` CLI binary.
//!
//! Every test runs against a store file in a temporary directory, with the
//! config directory pointed at a nonexistent path.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `boxsmith` binary with env isolation.
fn boxsmith_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("boxsmith");
    cmd.env("HOME", "/tmp/boxsmith-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/boxsmith-cli-test-nonexistent")
        .env_remove("BOXSMITH_STORE")
        .env_remove("BOXSMITH_OUTPUT")
        .env_remove("BOXSMITH_USER")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

struct Fixture {
    dir: TempDir,
    store: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    let snapshot = json!({
        "inbounds": [
            { "id": 1, "owner": 7, "type": "mixed", "address": "127.0.0.1", "port": 7890 },
            { "id": 2, "owner": 8, "type": "tun", "share": true }
        ],
        "outbounds": [
            { "id": 10, "owner": 7, "type": "selector", "name": "proxy", "outbounds": [11, 12] },
            { "id": 11, "owner": 7, "type": "trojan", "region": "sg",
              "address": "203.0.113.20", "port": 443, "password": "hunter2" },
            { "id": 12, "owner": 8, "type": "direct", "name": "direct" }
        ],
        "profiles": [
            { "id": 100, "created_by": 7, "name": "laptop",
              "inbounds": [1, 2], "outbounds": [10, 11], "route_final": 11 },
            { "id": 101, "created_by": 7, "name": "dangling", "outbounds": [11, 99] },
            { "id": 102, "created_by": 8, "name": "theirs", "outbounds": [12] },
            { "id": 103, "created_by": 7, "name": "borrowed", "outbounds": [11, 12] }
        ]
    });
    std::fs::write(&store, serde_json::to_string_pretty(&snapshot).unwrap()).unwrap();
    Fixture { dir, store }
}

impl Fixture {
    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = boxsmith_cmd();
        cmd.arg("--store").arg(&self.store);
        cmd
    }
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = boxsmith_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    boxsmith_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("sing-box")
            .and(predicate::str::contains("export"))
            .and(predicate::str::contains("check")),
    );
}

#[test]
fn test_completions_bash() {
    boxsmith_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_missing_store_is_usage_error() {
    let output = boxsmith_cmd().args(["export", "100"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No entity store"));
}

#[test]
fn test_config_path_prints_location() {
    boxsmith_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Export ──────────────────────────────────────────────────────────

#[test]
fn test_export_prints_document() {
    let fx = fixture();
    let output = fx.cmd().args(["export", "100"]).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let doc: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["route"]["final"], "out.trojan.sg.11");
    assert_eq!(doc["inbounds"].as_array().unwrap().len(), 2);
    assert_eq!(
        doc["outbounds"][0]["outbounds"],
        json!(["out.trojan.sg.11", "out.direct.default.direct.12"])
    );
}

#[test]
fn test_export_json_wraps_delivery() {
    let fx = fixture();
    let output = fx
        .cmd()
        .args(["--output", "json", "export", "100"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let delivery: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(delivery["method"], "direct");
    assert_eq!(delivery["fileName"], "laptop.json");
    assert!(delivery["content"].as_str().unwrap().starts_with("{\n  "));
}

#[test]
fn test_export_reports_omissions_on_stderr() {
    let fx = fixture();
    fx.cmd()
        .args(["--color", "never", "export", "101"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: omitted outbound #99: not found"));
}

#[test]
fn test_export_to_file() {
    let fx = fixture();
    let target = fx.dir.path().join("out.json");
    fx.cmd()
        .args(["-q", "export", "100", "--out-file"])
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let doc: Value = serde_json::from_str(&std::fs::read_to_string(target).unwrap()).unwrap();
    assert_eq!(doc["log"]["level"], "info");
}

#[test]
fn test_export_oss_uploads_object() {
    let fx = fixture();
    let bucket = fx.dir.path().join("bucket");
    fx.cmd()
        .args(["export", "100", "--method", "oss", "--public-domain", "cdn.example"])
        .arg("--object-root")
        .arg(&bucket)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://cdn.example/profiles/100-laptop.json",
        ));
    assert!(bucket.join("profiles/100-laptop.json").is_file());
}

#[test]
fn test_export_oss_without_root_fails() {
    let fx = fixture();
    let output = fx
        .cmd()
        .args(["export", "100", "--method", "oss"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("not configured"));
}

#[test]
fn test_export_out_file_rejects_oss() {
    let fx = fixture();
    let output = fx
        .cmd()
        .args(["export", "100", "--method", "oss", "--out-file", "x.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_export_unknown_profile() {
    let fx = fixture();
    let output = fx.cmd().args(["export", "555"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("profile #555 not found"));
}

#[test]
fn test_export_as_other_user_is_forbidden() {
    let fx = fixture();
    let output = fx
        .cmd()
        .args(["--user", "8", "export", "100"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_export_with_unreadable_reference_is_forbidden() {
    let fx = fixture();
    // Outbound 12 belongs to user 8 and is not shared.
    let output = fx
        .cmd()
        .args(["--user", "7", "export", "103"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
    assert!(combined_output(&output).contains("12"));
}

// ── Entity / list / check ───────────────────────────────────────────

#[test]
fn test_entity_prints_fragment() {
    let fx = fixture();
    let output = fx.cmd().args(["entity", "outbound", "10"]).output().unwrap();
    assert!(output.status.success());

    let fragment: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(fragment["tag"], "out.selector.default.proxy.10");
    assert_eq!(fragment["type"], "selector");
}

#[test]
fn test_entity_plain_prints_tag() {
    let fx = fixture();
    fx.cmd()
        .args(["-o", "plain", "entity", "in", "1"])
        .assert()
        .success()
        .stdout("in.mixed.1\n");
}

#[test]
fn test_entity_profile_kind_is_rejected() {
    let fx = fixture();
    let output = fx.cmd().args(["entity", "profile", "100"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_list_readable_filters_by_user() {
    let fx = fixture();
    fx.cmd()
        .args(["-o", "plain", "--user", "7", "list", "inbound", "--readable"])
        .assert()
        .success()
        .stdout("1\n2\n");
    fx.cmd()
        .args(["-o", "plain", "--user", "7", "list", "outbound", "--readable"])
        .assert()
        .success()
        .stdout("10\n11\n");
}

#[test]
fn test_list_table_shows_tags() {
    let fx = fixture();
    fx.cmd()
        .args(["list", "outbound"])
        .assert()
        .success()
        .stdout(predicate::str::contains("out.trojan.sg.11").and(predicate::str::contains("Tag")));
}

#[test]
fn test_check_all_profiles() {
    let fx = fixture();
    let output = fx
        .cmd()
        .args(["-o", "json", "check"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    let statuses: Vec<&str> = reports
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["ok", "omissions", "ok", "ok"]);
}

#[test]
fn test_check_strict_fails_on_omissions() {
    let fx = fixture();
    let output = fx
        .cmd()
        .args(["check", "101", "--strict"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("1 of 1 profiles failed"));
}
