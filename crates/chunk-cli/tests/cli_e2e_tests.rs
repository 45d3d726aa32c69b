//! CLI end-to-end tests that invoke the compiled `chunk` binary.
//!
//! These tests use `env!("CARGO_BIN_EXE_chunk")` to locate the binary and
//! `std::process::Command` to run it against files in temporary directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const ITEM: &str = "<ITEM\n  <TAKE\n    SOURCE WAVE\n    FILE \"a.wav\"\n  >\n>\n";

/// Returns the path to the compiled `chunk` binary.
fn chunk_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_chunk"))
}

/// Run `chunk` with the given args in the given directory.
fn run(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(chunk_bin())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("CHUNK_CONFIG")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute chunk binary")
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

// ============================================================================
// General
// ============================================================================

#[test]
fn test_help_exits_zero() {
    let out = Command::new(chunk_bin())
        .arg("--help")
        .output()
        .expect("failed to run chunk --help");

    assert!(out.status.success(), "chunk --help should exit 0");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("remove-line"),
        "help output should mention 'remove-line', got:\n{}",
        stdout
    );
}

#[test]
fn test_version_flag() {
    let out = Command::new(chunk_bin())
        .arg("--version")
        .output()
        .expect("failed to run chunk --version");
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("chunk"));
}

#[test]
fn test_no_command_prints_hint() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &[]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("chunk --help"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_well_formed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(dir.path(), &["validate", "item.chunk"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("2 blocks"), "got:\n{}", stdout);
}

#[test]
fn test_validate_malformed_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.chunk", "<ITEM\n  <TAKE\n  >\n");

    let out = run(dir.path(), &["validate", "broken.chunk"]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Malformed chunk at line 0"), "got:\n{}", stderr);
}

#[test]
fn test_missing_file_exits_non_zero() {
    let dir = TempDir::new().unwrap();
    let out = run(dir.path(), &["validate", "absent.chunk"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("absent.chunk"));
}

// ============================================================================
// get
// ============================================================================

#[test]
fn test_get_prints_block_verbatim() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(dir.path(), &["get", "item.chunk", "TAKE"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "  <TAKE\n    SOURCE WAVE\n    FILE \"a.wav\"\n  >\n"
    );
}

#[test]
fn test_get_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(
        dir.path(),
        &["get", "item.chunk", "SOURCE", "--within", "TAKE", "--json"],
    );
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["found"], true);
    assert_eq!(value["kind"], "field");
    assert_eq!(value["start"], 2);
    assert_eq!(value["text"], "    SOURCE WAVE\n");
}

#[test]
fn test_get_missing_target_exits_zero() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(dir.path(), &["get", "item.chunk", "TAKE", "--occurrence", "1"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("No TAKE found"));
}

#[test]
fn test_get_on_malformed_file_fails() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "broken.chunk", "<ITEM\n>\n>\n");

    let out = run(dir.path(), &["get", "broken.chunk", "ITEM"]);
    assert!(!out.status.success());
}

// ============================================================================
// remove-line
// ============================================================================

#[test]
fn test_remove_line_end_to_end() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(dir.path(), &["remove-line", "item.chunk", "TAKE", "FILE"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        read(dir.path(), "item.chunk"),
        "<ITEM\n  <TAKE\n    SOURCE WAVE\n  >\n>\n"
    );
    assert_eq!(read(dir.path(), "item.chunk.bak"), ITEM);
}

#[test]
fn test_remove_line_dry_run_prints_diff() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(
        dir.path(),
        &["remove-line", "item.chunk", "TAKE", "FILE", "--dry-run"],
    );
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("-    FILE \"a.wav\""));
    assert_eq!(read(dir.path(), "item.chunk"), ITEM);
}

#[test]
fn test_remove_line_not_found_leaves_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "item.chunk", ITEM);

    let out = run(
        dir.path(),
        &["remove-line", "item.chunk", "TAKE", "FILE", "--contains", "b.wav"],
    );
    assert!(out.status.success());
    assert_eq!(read(dir.path(), "item.chunk"), ITEM);
    assert!(!dir.path().join("item.chunk.bak").exists());
}
