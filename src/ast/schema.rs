//! Schema Resolution - v1 / v2 task documents → `TaskDef`
//!
//! Two historical document shapes describe the same thing:
//!
//! ```yaml
//! # v1: named node, children as a list
//! name: build
//! tasks:
//!   - name: compile
//!     script: go build
//! ```
//!
//! ```yaml
//! # v2: children keyed by name, script may be a list of lines
//! tasks:
//!   deploy:
//!     script:
//!       - echo start
//!       - echo done
//! ```
//!
//! Versions are tried in [`SchemaVersion::TRIAL_ORDER`]. A version whose
//! identification rule does not hold is "not applicable" and the next one is
//! tried. Once a version matches, every later error (inputs, steps, children)
//! is reported under that version; there is no fallback past that point.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{Result, TaskTreeError};
use crate::step::{StepLoaderRegistry, StepSynthesizer};
use crate::util::string_key;

use super::input::{normalize_inputs, null_as_default, InputConfig, OptionConfig, ParameterConfig};
use super::task::{named_tasks_to_array, TaskDef};

// ============================================================================
// SCHEMA VERSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    /// `name` + `tasks: [...]`
    V1,
    /// `tasks: {name: body}` + `script` as string or lines
    V2,
}

impl SchemaVersion {
    pub const TRIAL_ORDER: [SchemaVersion; 2] = [Self::V1, Self::V2];

    fn identify(self, node: &Value) -> Identified {
        match self {
            Self::V1 => match serde_yaml::from_value::<RawTaskDefV1>(node.clone()) {
                Err(e) => Identified::NotApplicable(format!("not v1 format: {}", e)),
                Ok(raw) if raw.name.is_empty() && raw.tasks.is_empty() => {
                    Identified::NotApplicable(
                        "not v1 format: both `name` and `tasks` are empty".to_string(),
                    )
                }
                Ok(raw) => Identified::Matched(RawTaskDef::V1(raw)),
            },
            Self::V2 => match serde_yaml::from_value::<RawTaskDefV2>(node.clone()) {
                Err(e) => Identified::NotApplicable(format!("not v2 format: {}", e)),
                Ok(raw)
                    if raw.tasks.is_empty()
                        && raw.resolved_script().is_empty()
                        && raw.steps.is_empty() =>
                {
                    Identified::NotApplicable(
                        "not v2 format: `tasks`, `script` and `steps` are missing".to_string(),
                    )
                }
                Ok(raw) => Identified::Matched(RawTaskDef::V2(raw)),
            },
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => f.write_str("v1"),
            Self::V2 => f.write_str("v2"),
        }
    }
}

/// Outcome of checking one version against a node
enum Identified {
    Matched(RawTaskDef),
    NotApplicable(String),
}

enum RawTaskDef {
    V1(RawTaskDefV1),
    V2(RawTaskDefV2),
}

// ============================================================================
// RAW SHAPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawTaskDefV1 {
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    inputs: Vec<InputConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    parameters: Vec<ParameterConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    options: Vec<OptionConfig>,
    /// Child nodes, each resolved through the full trial order
    #[serde(default, deserialize_with = "null_as_default")]
    tasks: Vec<Value>,
    #[serde(default)]
    runner: Option<Mapping>,
    #[serde(default, deserialize_with = "null_as_default")]
    script: String,
    #[serde(default, deserialize_with = "null_as_default")]
    steps: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    autoenv: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    autodir: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    interactive: bool,
}

#[derive(Debug, Deserialize)]
struct RawTaskDefV2 {
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    inputs: Vec<InputConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    parameters: Vec<ParameterConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    options: Vec<OptionConfig>,
    /// Child bodies keyed by task name, in document order
    #[serde(default, deserialize_with = "null_as_default")]
    tasks: Mapping,
    #[serde(default)]
    runner: Option<Mapping>,
    #[serde(default)]
    script: Option<ScriptSource>,
    #[serde(default, deserialize_with = "null_as_default")]
    steps: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    autoenv: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    autodir: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    interactive: bool,
}

impl RawTaskDefV2 {
    fn resolved_script(&self) -> String {
        self.script
            .as_ref()
            .map(ScriptSource::resolve)
            .unwrap_or_default()
    }
}

/// Handles string OR list of lines for `script`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptSource {
    Text(String),
    Lines(Vec<String>),
}

impl ScriptSource {
    /// Lines are joined with `\n`
    pub fn resolve(&self) -> String {
        match self {
            ScriptSource::Text(s) => s.clone(),
            ScriptSource::Lines(lines) => lines.join("\n"),
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Error label for a top-level node without a `name`
const ROOT_LABEL: &str = "<root>";

/// Resolves raw task nodes into `TaskDef`s
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'r> {
    registry: &'r StepLoaderRegistry,
}

impl<'r> SchemaResolver<'r> {
    pub fn new(registry: &'r StepLoaderRegistry) -> Self {
        Self { registry }
    }

    /// Resolve one node (and, recursively, its children)
    pub fn resolve(&self, node: &Value) -> Result<TaskDef> {
        self.resolve_as(node, ROOT_LABEL)
    }

    /// `label` names the node in errors when the node has no `name` of its
    /// own (v2 children are named by their parent's key)
    fn resolve_as(&self, node: &Value, label: &str) -> Result<TaskDef> {
        let mut last_mismatch = String::new();
        for version in SchemaVersion::TRIAL_ORDER {
            debug!(%version, task = label, "trying task schema");
            match version.identify(node) {
                Identified::Matched(RawTaskDef::V1(raw)) => return self.normalize_v1(raw, label),
                Identified::Matched(RawTaskDef::V2(raw)) => return self.normalize_v2(raw, label),
                Identified::NotApplicable(reason) => {
                    debug!(%version, %reason, "task schema not applicable");
                    last_mismatch = reason;
                }
            }
        }
        Err(TaskTreeError::UnrecognizedSchema {
            reason: last_mismatch,
        })
    }

    fn normalize_v1(&self, raw: RawTaskDefV1, label: &str) -> Result<TaskDef> {
        let task_label = if raw.name.is_empty() { label } else { raw.name.as_str() };
        let wrap = wrap_invalid(SchemaVersion::V1, task_label.to_string());

        let mut tasks = Vec::with_capacity(raw.tasks.len());
        for (i, child) in raw.tasks.iter().enumerate() {
            let child_label = v1_child_label(child, i);
            let task = self.resolve_as(child, &child_label).map_err(|e| {
                wrap(TaskTreeError::ChildTask {
                    child: child_label.clone(),
                    source: Box::new(e),
                })
            })?;
            tasks.push(task);
        }

        let steps = StepSynthesizer::new(self.registry)
            .synthesize(&raw.script, raw.runner.as_ref(), &raw.steps)
            .map_err(&wrap)?;

        Ok(TaskDef {
            name: raw.name,
            description: raw.description,
            inputs: normalize_inputs(raw.inputs, raw.parameters, raw.options),
            tasks,
            steps,
            script: raw.script,
            autoenv: raw.autoenv,
            autodir: raw.autodir,
            interactive: raw.interactive,
        })
    }

    fn normalize_v2(&self, raw: RawTaskDefV2, label: &str) -> Result<TaskDef> {
        let wrap = wrap_invalid(SchemaVersion::V2, label.to_string());
        let script = raw.resolved_script();

        let mut children = Vec::with_capacity(raw.tasks.len());
        for (key, body) in &raw.tasks {
            let name = string_key(key, "tasks").map_err(&wrap)?;
            let task = self.resolve_as(body, name).map_err(|e| {
                wrap(TaskTreeError::ChildTask {
                    child: name.to_string(),
                    source: Box::new(e),
                })
            })?;
            children.push((name.to_string(), task));
        }

        let steps = StepSynthesizer::new(self.registry)
            .synthesize(&script, raw.runner.as_ref(), &raw.steps)
            .map_err(&wrap)?;

        Ok(TaskDef {
            name: String::new(),
            description: raw.description,
            inputs: normalize_inputs(raw.inputs, raw.parameters, raw.options),
            tasks: named_tasks_to_array(children),
            steps,
            script,
            autoenv: raw.autoenv,
            autodir: raw.autodir,
            interactive: raw.interactive,
        })
    }
}

fn wrap_invalid(version: SchemaVersion, task: String) -> impl Fn(TaskTreeError) -> TaskTreeError {
    move |source| TaskTreeError::InvalidTask {
        version,
        task: task.clone(),
        source: Box::new(source),
    }
}

fn v1_child_label(child: &Value, index: usize) -> String {
    match child.get("name").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("tasks[{}]", index + 1),
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Parse and resolve a task document
pub fn load_task_def(yaml: &str, registry: &StepLoaderRegistry) -> Result<TaskDef> {
    let node: Value = serde_yaml::from_str(yaml)?;
    SchemaResolver::new(registry).resolve(&node)
}

/// Read, parse and resolve a task document file
pub fn load_task_file(path: impl AsRef<Path>, registry: &StepLoaderRegistry) -> Result<TaskDef> {
    let yaml = super::read_document(path.as_ref())?;
    load_task_def(&yaml, registry)
}
