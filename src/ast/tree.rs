//! Dynamic Task Maps - plain nested mappings → `TaskDef`s
//!
//! The third document shape has no schema markers at all. Structure alone
//! decides what a body is:
//!
//! ```yaml
//! build:
//!   script: go build ./...     # has `script` → leaf
//! test:                        # no `script` → composite
//!   unit:
//!     script: go test ./...
//!   lint:
//!     script: ""               # still a leaf, with no steps
//! ```
//!
//! An empty body is neither, and is rejected.
//!
//! The mapping is decoded once into a [`TaskNode`] tree, then each node is
//! turned into a `TaskDef`. This path never goes through the v1/v2 trial
//! order.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{Result, TaskTreeError};
use crate::step::{StepLoaderRegistry, StepSynthesizer};
use crate::util::{child_path, ensure_string_keys, string_key, value_kind};

use super::input::{normalize_inputs, null_as_default, InputConfig, OptionConfig, ParameterConfig};
use super::schema::ScriptSource;
use super::task::TaskDef;

/// Key whose presence marks a leaf body
const LEAF_MARKER: &str = "script";

// ============================================================================
// NODE TREE
// ============================================================================

#[derive(Debug, Clone)]
pub enum TaskNode {
    Leaf(Box<LeafBody>),
    Composite(Vec<NamedNode>),
}

#[derive(Debug, Clone)]
pub struct NamedNode {
    pub name: String,
    pub node: TaskNode,
}

/// Typed fields of a leaf body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeafBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inputs: Vec<InputConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<OptionConfig>,
    #[serde(default)]
    pub script: Option<ScriptSource>,
    #[serde(default)]
    pub runner: Option<Mapping>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub autoenv: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub autodir: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interactive: bool,
}

impl TaskNode {
    /// Classify and decode one body found at `path`
    pub fn parse(body: &Value, path: &str) -> Result<Self> {
        let Value::Mapping(mapping) = body else {
            return Err(TaskTreeError::MalformedInput {
                path: path.to_string(),
                reason: format!("task body must be a mapping, found {}", value_kind(body)),
            });
        };

        if mapping.contains_key(LEAF_MARKER) {
            ensure_string_keys(body, path)?;
            let leaf: LeafBody = serde_yaml::from_value(body.clone()).map_err(|e| {
                TaskTreeError::MalformedInput {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            })?;
            return Ok(TaskNode::Leaf(Box::new(leaf)));
        }

        if mapping.is_empty() {
            return Err(TaskTreeError::MalformedInput {
                path: path.to_string(),
                reason: "task body has neither a `script` key nor child tasks".to_string(),
            });
        }
        parse_task_map(mapping, path).map(TaskNode::Composite)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TaskNode::Leaf(_))
    }
}

/// Decode every `name: body` entry of a task map, in document order
pub fn parse_task_map(mapping: &Mapping, path: &str) -> Result<Vec<NamedNode>> {
    let mut nodes = Vec::with_capacity(mapping.len());
    for (key, body) in mapping {
        let name = string_key(key, path)?;
        let node = TaskNode::parse(body, &child_path(path, name))?;
        nodes.push(NamedNode {
            name: name.to_string(),
            node,
        });
    }
    Ok(nodes)
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds `TaskDef`s from a dynamic task map
#[derive(Debug, Clone, Copy)]
pub struct TaskTreeBuilder<'r> {
    registry: &'r StepLoaderRegistry,
}

impl<'r> TaskTreeBuilder<'r> {
    pub fn new(registry: &'r StepLoaderRegistry) -> Self {
        Self { registry }
    }

    /// Top-level `name → body` map to ordered tasks
    pub fn build(&self, tasks: &Mapping) -> Result<Vec<TaskDef>> {
        parse_task_map(tasks, "")?
            .into_iter()
            .map(|named| self.to_task(named, ""))
            .collect()
    }

    pub fn build_from_str(&self, yaml: &str) -> Result<Vec<TaskDef>> {
        let document: Value = serde_yaml::from_str(yaml)?;
        match &document {
            Value::Mapping(tasks) => self.build(tasks),
            // An empty document has no tasks
            Value::Null => Ok(Vec::new()),
            other => Err(TaskTreeError::MalformedInput {
                path: "<root>".to_string(),
                reason: format!("task map must be a mapping, found {}", value_kind(other)),
            }),
        }
    }

    pub fn build_from_file(&self, path: impl AsRef<Path>) -> Result<Vec<TaskDef>> {
        let yaml = super::read_document(path.as_ref())?;
        self.build_from_str(&yaml)
    }

    fn to_task(&self, named: NamedNode, parent: &str) -> Result<TaskDef> {
        let path = child_path(parent, &named.name);
        match named.node {
            TaskNode::Leaf(leaf) => {
                debug!(task = %path, "building leaf task");
                self.leaf_to_task(named.name, *leaf)
                    .map_err(|e| TaskTreeError::ChildTask {
                        child: path,
                        source: Box::new(e),
                    })
            }
            TaskNode::Composite(children) => {
                let tasks = children
                    .into_iter()
                    .map(|child| self.to_task(child, &path))
                    .collect::<Result<Vec<_>>>()?;
                Ok(TaskDef {
                    name: named.name,
                    tasks,
                    ..Default::default()
                })
            }
        }
    }

    fn leaf_to_task(&self, name: String, leaf: LeafBody) -> Result<TaskDef> {
        let script = leaf
            .script
            .as_ref()
            .map(ScriptSource::resolve)
            .unwrap_or_default();
        let steps = StepSynthesizer::new(self.registry).synthesize(
            &script,
            leaf.runner.as_ref(),
            &leaf.steps,
        )?;

        Ok(TaskDef {
            name,
            description: leaf.description,
            inputs: normalize_inputs(leaf.inputs, leaf.parameters, leaf.options),
            tasks: Vec::new(),
            steps,
            script,
            autoenv: leaf.autoenv,
            autodir: leaf.autodir,
            interactive: leaf.interactive,
        })
    }
}
