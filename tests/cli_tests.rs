//! Integration tests for the tasktree CLI
//!
//! These tests run the actual CLI binary and verify output.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the binary to test, isolated from the caller's environment
///
/// `home` stands in for the user's home and config directories, so a real
/// `~/.config/tasktree/config.toml` never leaks into a test.
fn tasktree_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tasktree").unwrap();
    cmd.env("NO_COLOR", "1")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("TASKTREE_LOADERS");
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const V1_TASKS: &str = r#"
name: build
tasks:
  - name: compile
    script: go build
    parameters:
      - name: target
    options:
      - name: race
  - name: release
    steps:
      - script: make dist
      - name: publish
        steps:
          - task: upload
"#;

const DYNAMIC_TASKS: &str = r#"
fmt:
  script: go fmt ./...
test:
  unit:
    script: go test ./...
"#;

#[test]
fn test_help_flag() {
    let temp_dir = TempDir::new().unwrap();
    tasktree_cmd(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("loaders"));
}

#[test]
fn test_tree_help_lists_format() {
    let temp_dir = TempDir::new().unwrap();
    tasktree_cmd(&temp_dir)
        .args(["tree", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--dynamic"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_v1_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(&temp_dir, "build.yaml", V1_TASKS);

    tasktree_cmd(&temp_dir)
        .arg("validate")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Tasks: 3"))
        .stdout(predicate::str::contains("Steps: 3"));
}

#[test]
fn test_validate_dynamic_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(&temp_dir, "tasks.yaml", DYNAMIC_TASKS);

    tasktree_cmd(&temp_dir)
        .args(["validate", "--dynamic"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Format: dynamic"))
        .stdout(predicate::str::contains("Tasks: 3"))
        .stdout(predicate::str::contains("Steps: 2"));
}

#[test]
fn test_validate_script_and_steps_fails_with_fix() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(
        &temp_dir,
        "bad.yaml",
        "name: bad\nscript: make\nsteps:\n  - script: make\n",
    );

    tasktree_cmd(&temp_dir)
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Both script and steps exist"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_validate_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    tasktree_cmd(&temp_dir)
        .args(["validate", "/no/such/dir/tasks.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TT-003"));
}

#[test]
fn test_validate_unrecognized_document() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(&temp_dir, "empty.yaml", "description: nothing\n");

    tasktree_cmd(&temp_dir)
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TT-010"));
}

// ============================================================================
// tree
// ============================================================================

#[test]
fn test_tree_text_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(&temp_dir, "build.yaml", V1_TASKS);

    tasktree_cmd(&temp_dir)
        .arg("tree")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("compile <target> [--race]"))
        .stdout(predicate::str::contains("step-1 [script]"))
        .stdout(predicate::str::contains("publish [sequence]"))
        .stdout(predicate::str::contains("step-1 [task]"));
}

#[test]
fn test_tree_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(&temp_dir, "build.yaml", V1_TASKS);

    let output = tasktree_cmd(&temp_dir)
        .args(["tree", "--format", "json"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "build");
    assert_eq!(json["kind"], "composite");
    assert_eq!(json["tasks"][0]["name"], "compile");
    assert_eq!(json["tasks"][0]["inputs"][0]["argument-index"], 0);
    assert_eq!(json["tasks"][1]["steps"][1]["kind"], "sequence");
    assert_eq!(json["tasks"][1]["steps"][1]["steps"][0]["kind"], "task");
}

#[test]
fn test_tree_dynamic_root_named_after_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = write(&temp_dir, "project.yaml", DYNAMIC_TASKS);

    let output = tasktree_cmd(&temp_dir)
        .args(["tree", "--dynamic", "--format", "json"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "project");
    assert_eq!(json["tasks"][1]["tasks"][0]["name"], "unit");
}

// ============================================================================
// loaders / config
// ============================================================================

#[test]
fn test_loaders_default_order() {
    let temp_dir = TempDir::new().unwrap();
    let config = write(&temp_dir, "tasktree.toml", "");

    tasktree_cmd(&temp_dir)
        .arg("loaders")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. script"))
        .stdout(predicate::str::contains("2. task"))
        .stdout(predicate::str::contains("3. sequence"));
}

#[test]
fn test_config_restricts_loaders() {
    let temp_dir = TempDir::new().unwrap();
    let config = write(
        &temp_dir,
        "tasktree.toml",
        "[loaders]\nenabled = [\"script\"]\n",
    );
    let file = write(&temp_dir, "build.yaml", V1_TASKS);

    tasktree_cmd(&temp_dir)
        .arg("--config")
        .arg(&config)
        .arg("validate")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("All loaders failed"));
}

#[test]
fn test_env_overrides_loader_list() {
    let temp_dir = TempDir::new().unwrap();
    let config = write(&temp_dir, "tasktree.toml", "");

    tasktree_cmd(&temp_dir)
        .env("TASKTREE_LOADERS", "sequence,script")
        .args(["loaders", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. sequence"))
        .stdout(predicate::str::contains("2. script"))
        .stdout(predicate::str::contains("task").not());
}

#[test]
fn test_unknown_loader_in_env_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = write(&temp_dir, "tasktree.toml", "");

    tasktree_cmd(&temp_dir)
        .env("TASKTREE_LOADERS", "docker")
        .args(["loaders", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown step loader 'docker'"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_default_config_location_is_read() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".config").join("tasktree");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[loaders]\nenabled = [\"task\"]\n",
    )
    .unwrap();

    tasktree_cmd(&temp_dir)
        .arg("loaders")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. task"))
        .stdout(predicate::str::contains("script").not());
}

#[test]
fn test_empty_home_uses_default_loaders() {
    let temp_dir = TempDir::new().unwrap();

    tasktree_cmd(&temp_dir)
        .arg("loaders")
        .assert()
        .success()
        .stdout(predicate::str::contains("3. sequence"));
}
