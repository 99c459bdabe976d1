//! CLI integration tests for freight-builder.
//!
//! None of these need rpmbuild or a package manager: they cover argument
//! handling, manifest loading and validation, and workspace cleanup on
//! failure.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"[package]
name = "foo"
version = "1.0"
release = "1"
license = "GPL"
summary = "s"

[[repository]]
name = "base"
url = "http://x"

[packages]
rpms = ["bash", "coreutils"]

[yum]
releasever = "30"
"#;

/// Get the freight-builder binary command.
fn freight() -> Command {
    let mut cmd = Command::cargo_bin("freight-builder").unwrap();
    cmd.env_remove("FREIGHT_BACKEND");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

fn write_manifest(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("container.toml");
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// General
// ============================================================================

#[test]
fn test_help_lists_commands() {
    freight()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("introspect"));
}

#[test]
fn test_completions_bash() {
    freight()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("freight-builder"));
}

// ============================================================================
// freight-builder build
// ============================================================================

#[test]
fn test_build_missing_manifest() {
    let tmp = temp_dir();

    freight()
        .args(["build", "does-not-exist.toml"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read manifest"));
}

#[test]
fn test_build_malformed_manifest() {
    let tmp = temp_dir();
    let manifest = write_manifest(tmp.path(), "[package]\nname = \"foo\"\n");

    freight()
        .arg("build")
        .arg(&manifest)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse manifest"));
}

#[test]
fn test_build_rejects_unknown_backend() {
    let tmp = temp_dir();
    let manifest = write_manifest(tmp.path(), MANIFEST);

    freight()
        .arg("build")
        .arg(&manifest)
        .args(["--backend", "apt"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid backend"));
}

#[test]
fn test_build_rejects_unsafe_manifest_and_cleans_up() {
    let tmp = temp_dir();
    let work = tmp.path().join("work");
    fs::create_dir(&work).unwrap();
    let manifest = write_manifest(
        tmp.path(),
        &MANIFEST.replace("name = \"foo\"", "name = \"foo;reboot\""),
    );

    freight()
        .arg("build")
        .arg(&manifest)
        .arg("--no-preflight")
        .arg("--work-root")
        .arg(&work)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid manifest"));

    // The workspace created by init is gone again.
    assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
}

#[test]
fn test_build_missing_work_root() {
    let tmp = temp_dir();
    let manifest = write_manifest(tmp.path(), MANIFEST);

    freight()
        .arg("build")
        .arg(&manifest)
        .arg("--no-preflight")
        .arg("--work-root")
        .arg(tmp.path().join("missing"))
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot create"));
}

// ============================================================================
// freight-builder introspect
// ============================================================================

#[test]
fn test_introspect_rejects_foreign_artifact() {
    let tmp = temp_dir();
    let work = tmp.path().join("work");
    fs::create_dir(&work).unwrap();
    let manifest = write_manifest(tmp.path(), MANIFEST);

    freight()
        .arg("introspect")
        .arg(&manifest)
        .arg("bash-5.0-1.x86_64.rpm")
        .arg("--no-preflight")
        .arg("--work-root")
        .arg(&work)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a freight container artifact"));

    assert_eq!(fs::read_dir(&work).unwrap().count(), 0);
}

#[test]
fn test_introspect_requires_artifact_argument() {
    let tmp = temp_dir();
    let manifest = write_manifest(tmp.path(), MANIFEST);

    freight()
        .arg("introspect")
        .arg(&manifest)
        .current_dir(tmp.path())
        .assert()
        .failure();
}
