//! End-to-end tests of the `sdkup` binary: exit codes, output and a full
//! install against a mock catalog.

use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const UNREACHABLE: &str = "http://127.0.0.1:9";

fn sdkup(root: &Path, registry: &str) -> Command {
    let mut cmd = Command::cargo_bin("sdkup").unwrap();
    cmd.env_remove("SDKUP_DIR")
        .env_remove("SDKUP_REGISTRY")
        .env_remove("SDKUP_PLATFORM")
        .env_remove("RUST_LOG")
        .arg("--directory")
        .arg(root)
        .arg("--registry")
        .arg(registry)
        .arg("--platform")
        .arg("linuxx64");
    cmd
}

fn seed_candidates(root: &Path, candidates: &str) {
    fs::create_dir_all(root.join("var")).unwrap();
    fs::write(root.join("var").join("candidates"), candidates).unwrap();
}

fn tool_archive() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let script = b"#!/bin/sh\necho tool 1.0\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(script.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, "tool-1.0/bin/tool", &script[..])
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

async fn mock_catalog() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/candidates/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tool"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/candidates/default/tool"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.0"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/candidates/tool/linuxx64/versions/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.0,2.0"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broker/download/tool/1.0/linuxx64"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Sdkman-ArchiveType", "tar.gz")
                .set_body_bytes(tool_archive()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broker/download/tool/2.0/linuxx64"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("sdkup").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_missing_subcommand_is_usage_error() {
    let mut cmd = Command::cargo_bin("sdkup").unwrap();
    cmd.assert().code(2);
}

#[test]
fn test_unknown_candidate_offline() {
    let root = TempDir::new().unwrap();
    sdkup(root.path(), UNREACHABLE)
        .args(["install", "nosuch"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nosuch"));
    assert!(!root.path().join("candidates").join("nosuch").exists());
}

#[test]
fn test_current_with_nothing_in_use() {
    let root = TempDir::new().unwrap();
    sdkup(root.path(), UNREACHABLE)
        .arg("current")
        .assert()
        .code(10)
        .stderr(predicate::str::contains("No candidates are in use"));
}

#[test]
fn test_current_json_error_envelope() {
    let root = TempDir::new().unwrap();
    sdkup(root.path(), UNREACHABLE)
        .args(["--json", "current", "tool"])
        .assert()
        .code(10)
        .stdout(predicate::str::contains(r#""status":"error""#))
        .stdout(predicate::str::contains("sdkup::no_current"));
}

#[test]
fn test_export_with_nothing_in_use_prints_nothing() {
    let root = TempDir::new().unwrap();
    sdkup(root.path(), UNREACHABLE)
        .args(["export", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_use_requires_installed_version() {
    let root = TempDir::new().unwrap();
    seed_candidates(root.path(), "tool");
    sdkup(root.path(), UNREACHABLE)
        .args(["use", "tool@1.0"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("not installed"));
}

#[test]
fn test_use_unknown_candidate() {
    let root = TempDir::new().unwrap();
    seed_candidates(root.path(), "tool");
    sdkup(root.path(), UNREACHABLE)
        .args(["use", "other@1.0"])
        .assert()
        .code(3);
}

#[test]
fn test_update_offline_fails() {
    let root = TempDir::new().unwrap();
    sdkup(root.path(), UNREACHABLE)
        .arg("update")
        .assert()
        .code(6);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_install_then_current_and_export() {
    let server = mock_catalog().await;
    let root = TempDir::new().unwrap();

    sdkup(root.path(), &server.uri())
        .args(["install", "tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed tool 1.0"));

    let version_dir = root.path().join("candidates").join("tool").join("1.0");
    assert!(version_dir.join("bin").join("tool").is_file());
    assert!(root.path().join("archives").join("tool").join("1.0.tar.gz").is_file());

    sdkup(root.path(), &server.uri())
        .arg("current")
        .assert()
        .success()
        .stdout("tool@1.0\n");

    sdkup(root.path(), &server.uri())
        .args(["export", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("export PATH="))
        .stdout(predicate::str::contains("TOOL_HOME"));

    sdkup(root.path(), &server.uri())
        .args(["install", "tool"])
        .assert()
        .code(4);

    sdkup(root.path(), &server.uri())
        .args(["list", "tool"])
        .assert()
        .success()
        .stdout(predicate::str::contains("> * 1.0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_install_download_failure_leaves_nothing() {
    let server = mock_catalog().await;
    let root = TempDir::new().unwrap();

    sdkup(root.path(), &server.uri())
        .args(["install", "tool@2.0"])
        .assert()
        .code(6);

    assert!(!root.path().join("candidates").join("tool").join("2.0").exists());
    let archives = root.path().join("archives").join("tool");
    let leftovers = fs::read_dir(&archives)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_install_unlisted_version() {
    let server = mock_catalog().await;
    let root = TempDir::new().unwrap();

    sdkup(root.path(), &server.uri())
        .args(["install", "tool@9.9"])
        .assert()
        .code(9);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_reports_added_candidates() {
    let server = mock_catalog().await;
    let root = TempDir::new().unwrap();

    sdkup(root.path(), &server.uri())
        .arg("update")
        .assert()
        .success()
        .stdout("Adding new candidates: tool\n");

    sdkup(root.path(), &server.uri())
        .arg("update")
        .assert()
        .success()
        .stdout("No new candidates found at this time.\n");
}
