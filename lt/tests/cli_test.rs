//! Tests for the `lt` binary that need no chat server

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn lt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lt").unwrap();
    // Keep project-local config out of the way
    cmd.current_dir(dir.path());
    cmd.env_remove("OLLAMA_HOST").env_remove("OLLAMA_MODEL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_dump_tools_prints_wire_schemas() {
    let dir = TempDir::new().unwrap();
    let output = lt(&dir).arg("--dump-tools").output().unwrap();

    assert!(output.status.success());
    let schemas: Value = serde_json::from_slice(&output.stdout).unwrap();
    let schemas = schemas.as_array().unwrap();
    assert_eq!(schemas.len(), 11);
    assert_eq!(schemas[0]["type"], "function");
    assert_eq!(schemas[0]["function"]["name"], "get_weather");
    assert_eq!(schemas[10]["function"]["name"], "run_command");
    assert_eq!(schemas[10]["function"]["parameters"]["required"][0], "command");
}

#[test]
fn test_help_lists_flags() {
    let dir = TempDir::new().unwrap();

    lt(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dump-tools"))
        .stdout(predicate::str::contains("--auto-approve-reads"))
        .stdout(predicate::str::contains("--max-iterations"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();

    lt(&dir)
        .args(["-c", "does-not-exist.yml", "--dump-tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_unreachable_server_fails() {
    let dir = TempDir::new().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    lt(&dir)
        .args(["--host", &format!("http://{}", addr), "-T", "2", "-m", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Agent loop failed"));
}
