//! Integration tests for dynamic task maps
//!
//! Plain `name → body` mappings where a `script` key marks a leaf.

use std::fs;

use pretty_assertions::assert_eq;
use serde_yaml::Mapping;
use tasktree::ast::{named_tasks_to_array, TaskDef, TaskTreeBuilder};
use tasktree::error::TaskTreeError;
use tasktree::step::{BuiltinLoader, StepLoaderRegistry};
use tasktree::TaskTreeConfig;
use tempfile::TempDir;

const TASKS: &str = r#"
build:
  description: Compile the binary
  script: go build -o bin/app
  options:
    - name: race
      type: boolean
test:
  unit:
    script: go test ./...
  integration:
    script:
      - docker compose up -d
      - go test -tags integration ./...
    runner:
      image: golang:1.22
  lint:
    script: ""
release:
  script: ""
  steps:
    - task: build
    - script: goreleaser release
"#;

fn build(yaml: &str) -> Result<Vec<TaskDef>, TaskTreeError> {
    TaskTreeBuilder::new(&StepLoaderRegistry::with_builtins()).build_from_str(yaml)
}

#[test]
fn test_dynamic_tree_shape() {
    let tasks = build(TASKS).unwrap();

    let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["build", "test", "release"]);

    let build = &tasks[0];
    assert!(build.is_leaf());
    assert_eq!(build.description, "Compile the binary");
    assert_eq!(build.named_inputs().count(), 1);
    assert_eq!(build.steps.len(), 1);

    let test = &tasks[1];
    assert!(test.is_composite());
    let children: Vec<_> = test.tasks.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(children, vec!["unit", "integration", "lint"]);
    assert_eq!(
        test.tasks[1].script,
        "docker compose up -d\ngo test -tags integration ./..."
    );
}

#[test]
fn test_empty_script_leaf_uses_explicit_steps() {
    let tasks = build(TASKS).unwrap();

    let lint = &tasks[1].tasks[2];
    assert!(lint.is_leaf());
    assert!(lint.steps.is_empty());

    let release = &tasks[2];
    let kinds: Vec<_> = release.steps.iter().map(|s| s.kind()).collect();
    assert_eq!(kinds, vec!["task", "script"]);
    let step_names: Vec<_> = release.steps.iter().map(|s| s.name()).collect();
    assert_eq!(step_names, vec!["step-1", "step-2"]);
}

#[test]
fn test_walk_covers_every_task() {
    let root = TaskDef {
        name: "tasks".to_string(),
        tasks: build(TASKS).unwrap(),
        ..Default::default()
    };

    let mut paths = Vec::new();
    root.walk(|path, _| paths.push(path.join(".")));
    assert_eq!(
        paths,
        vec![
            "tasks",
            "tasks.build",
            "tasks.test",
            "tasks.test.unit",
            "tasks.test.integration",
            "tasks.test.lint",
            "tasks.release",
        ]
    );
    assert_eq!(root.step_count(), 5);
}

#[test]
fn test_malformed_bodies() {
    let err = build("deploy: ./deploy.sh\n").unwrap_err();
    assert!(matches!(err, TaskTreeError::MalformedInput { ref path, .. } if path == "deploy"));

    let err = build("deploy:\n  - script: a\n").unwrap_err();
    assert_eq!(err.code(), "TT-040");

    let err = build("ci:\n  ~:\n    script: a\n").unwrap_err();
    assert!(matches!(err, TaskTreeError::NonStringKey { ref path, .. } if path == "ci"));
}

#[test]
fn test_non_string_key_inside_leaf() {
    let err = build("build:\n  script: make\n  runner:\n    1: one\n").unwrap_err();
    match err {
        TaskTreeError::NonStringKey { path, key } => {
            assert_eq!(path, "build.runner");
            assert_eq!(key, "1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_loader_selection_applies_to_dynamic_path() {
    let mut config = TaskTreeConfig::default();
    config.loaders.enabled = vec![BuiltinLoader::Script];
    let registry = StepLoaderRegistry::from_config(&config).unwrap();

    let err = TaskTreeBuilder::new(&registry)
        .build_from_str("release:\n  script: ''\n  steps:\n    - task: build\n")
        .unwrap_err();
    assert!(err.to_string().contains("release"));
    assert_eq!(err.root_cause().code(), "TT-023");
}

#[test]
fn test_build_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tasks.yaml");
    fs::write(&path, TASKS).unwrap();

    let registry = StepLoaderRegistry::with_builtins();
    let tasks = TaskTreeBuilder::new(&registry).build_from_file(&path).unwrap();
    assert_eq!(tasks.len(), 3);
}

#[test]
fn test_named_map_conversion_matches_key_set() {
    let mapping: Mapping = serde_yaml::from_str(TASKS).unwrap();
    let registry = StepLoaderRegistry::with_builtins();
    let tasks = TaskTreeBuilder::new(&registry).build(&mapping).unwrap();

    let renamed = named_tasks_to_array(tasks.into_iter().map(|t| (format!("x-{}", t.name), t)));
    let names: Vec<_> = renamed.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["x-build", "x-test", "x-release"]);
    assert_eq!(renamed[1].tasks.len(), 3);
}
