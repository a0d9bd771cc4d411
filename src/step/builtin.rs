//! Built-in Step Kinds
//!
//! - `script`: a shell script, optionally run inside a container runner
//! - `task`: invoke another task by name with input values
//! - `sequence`: a list of nested steps, resolved through the loading context
//!
//! ```yaml
//! steps:
//!   - script: make build
//!     runner:
//!       image: golang:1.22
//!   - task: test.unit
//!     inputs:
//!       verbose: true
//!   - name: release
//!     steps:
//!       - script: make dist
//!       - task: publish
//! ```

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{StepLoadError, TaskTreeError};
use crate::util::value_kind;

use super::registry::{StepLoader, StepLoadingContext};
use super::synth::default_step_name;
use super::{Step, StepDef};

// ============================================================================
// BUILTIN LOADER SET
// ============================================================================

/// The enumerable set of loaders shipped with the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinLoader {
    Script,
    Task,
    Sequence,
}

impl BuiltinLoader {
    /// Default registration order
    pub const ALL: [BuiltinLoader; 3] = [Self::Script, Self::Task, Self::Sequence];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Task => "task",
            Self::Sequence => "sequence",
        }
    }

    pub fn loader(&self) -> Box<dyn StepLoader> {
        match self {
            Self::Script => Box::new(ScriptStepLoader),
            Self::Task => Box::new(TaskStepLoader),
            Self::Sequence => Box::new(SequenceStepLoader),
        }
    }
}

impl fmt::Display for BuiltinLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinLoader {
    type Err = TaskTreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.name() == s.trim())
            .ok_or_else(|| TaskTreeError::UnknownLoader {
                name: s.trim().to_string(),
            })
    }
}

// ============================================================================
// SCRIPT
// ============================================================================

/// Container runner for script steps
///
/// Free-form in the document; the known keys are read here and the rest is
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub envfile: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStep {
    pub name: String,
    pub script: String,
    pub silent: bool,
    pub runner: Option<RunnerConfig>,
}

#[derive(Deserialize)]
struct ScriptParams {
    #[serde(default)]
    name: Option<String>,
    script: String,
    #[serde(default)]
    silent: bool,
    #[serde(default)]
    runner: Option<RunnerConfig>,
}

impl Step for ScriptStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "script"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles configurations with a `script` key
pub struct ScriptStepLoader;

impl StepLoader for ScriptStepLoader {
    fn name(&self) -> &str {
        "script"
    }

    fn load_step(
        &self,
        def: &StepDef,
        _ctx: &dyn StepLoadingContext,
    ) -> Result<Arc<dyn Step>, StepLoadError> {
        if !def.contains_key("script") {
            return Err(StepLoadError::unsupported("script", "no `script` key"));
        }
        let params: ScriptParams = def
            .decode()
            .map_err(|e| StepLoadError::invalid("script", e.to_string()))?;

        Ok(Arc::new(ScriptStep {
            name: params.name.unwrap_or_else(|| "script".to_string()),
            script: params.script,
            silent: params.silent,
            runner: params.runner,
        }))
    }
}

// ============================================================================
// TASK
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStep {
    pub name: String,
    /// Target task, `.` separating nested task names
    pub task: String,
    pub inputs: Mapping,
}

impl TaskStep {
    /// Target task as a name path (`test.unit` → `["test", "unit"]`)
    pub fn target_path(&self) -> Vec<&str> {
        self.task.split('.').collect()
    }
}

#[derive(Deserialize)]
struct TaskParams {
    #[serde(default)]
    name: Option<String>,
    task: String,
    #[serde(default)]
    inputs: Option<Mapping>,
}

impl Step for TaskStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "task"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Handles configurations with a `task` key
pub struct TaskStepLoader;

impl StepLoader for TaskStepLoader {
    fn name(&self) -> &str {
        "task"
    }

    fn load_step(
        &self,
        def: &StepDef,
        _ctx: &dyn StepLoadingContext,
    ) -> Result<Arc<dyn Step>, StepLoadError> {
        if !def.contains_key("task") {
            return Err(StepLoadError::unsupported("task", "no `task` key"));
        }
        let params: TaskParams = def
            .decode()
            .map_err(|e| StepLoadError::invalid("task", e.to_string()))?;

        if params.task.trim().is_empty() || params.task.split('.').any(str::is_empty) {
            return Err(StepLoadError::invalid(
                "task",
                format!("invalid task reference '{}'", params.task),
            ));
        }

        Ok(Arc::new(TaskStep {
            name: params.name.unwrap_or_else(|| params.task.clone()),
            task: params.task,
            inputs: params.inputs.unwrap_or_default(),
        }))
    }
}

// ============================================================================
// SEQUENCE
// ============================================================================

#[derive(Debug, Clone)]
pub struct SequenceStep {
    pub name: String,
    pub steps: Vec<Arc<dyn Step>>,
}

impl Step for SequenceStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        "sequence"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn steps(&self) -> &[Arc<dyn Step>] {
        &self.steps
    }
}

/// Handles configurations with a `steps` list, loading each entry through
/// the context
pub struct SequenceStepLoader;

impl StepLoader for SequenceStepLoader {
    fn name(&self) -> &str {
        "sequence"
    }

    fn load_step(
        &self,
        def: &StepDef,
        ctx: &dyn StepLoadingContext,
    ) -> Result<Arc<dyn Step>, StepLoadError> {
        let raw_steps = match def.get("steps") {
            None => return Err(StepLoadError::unsupported("sequence", "no `steps` key")),
            Some(Value::Sequence(items)) => items,
            Some(other) => {
                return Err(StepLoadError::invalid(
                    "sequence",
                    format!("`steps` must be a sequence, found {}", value_kind(other)),
                ))
            }
        };

        let mut steps = Vec::with_capacity(raw_steps.len());
        for (i, raw) in raw_steps.iter().enumerate() {
            let Value::Mapping(mapping) = raw else {
                return Err(StepLoadError::invalid(
                    "sequence",
                    format!("steps[{}] must be a mapping, found {}", i + 1, value_kind(raw)),
                ));
            };
            let mut nested = StepDef::from_mapping(mapping.clone(), "")
                .map_err(|e| StepLoadError::nested("sequence", e))?;
            if nested.has_blank_name() {
                nested.insert("name", default_step_name(i));
            }
            let step = ctx.load_step(nested).map_err(|e| {
                StepLoadError::nested(
                    "sequence",
                    TaskTreeError::StepLoad {
                        index: i + 1,
                        source: Box::new(e),
                    },
                )
            })?;
            steps.push(step);
        }

        Ok(Arc::new(SequenceStep {
            name: def.name().unwrap_or("sequence").to_string(),
            steps,
        }))
    }
}
