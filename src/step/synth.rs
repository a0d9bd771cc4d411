//! Step Synthesis - script shorthand or explicit steps → loaded steps
//!
//! A task declares its behaviour either with `script` (one implicit step) or
//! with an explicit `steps` list, never both:
//!
//! ```yaml
//! script: go build ./...        # → [{name: script, script: ..., silent: false}]
//! ```
//!
//! ```yaml
//! steps:
//!   - script: go vet ./...      # → name defaults to step-1
//!   - name: build
//!     script: go build ./...
//! ```

use std::sync::Arc;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{Result, TaskTreeError};
use crate::util::{value_kind, SCRIPT_STEP_NAME};

use super::registry::StepLoaderRegistry;
use super::{Step, StepDef};

/// Default name for the step at zero-based `index` (`step-1`, `step-2`, ...)
pub fn default_step_name(index: usize) -> String {
    format!("step-{}", index + 1)
}

/// Turns a task's script/runner/steps declaration into loaded steps
#[derive(Debug, Clone, Copy)]
pub struct StepSynthesizer<'r> {
    registry: &'r StepLoaderRegistry,
}

impl<'r> StepSynthesizer<'r> {
    pub fn new(registry: &'r StepLoaderRegistry) -> Self {
        Self { registry }
    }

    /// Produce the ordered step list for one task
    ///
    /// - script and steps both present: `ScriptAndSteps`, no loader runs
    /// - script only: one synthesized `script` step (plus `runner`)
    /// - steps only: each entry loaded in order, blank names defaulted
    pub fn synthesize(
        &self,
        script: &str,
        runner: Option<&Mapping>,
        raw_steps: &[Value],
    ) -> Result<Vec<Arc<dyn Step>>> {
        if !script.is_empty() {
            if !raw_steps.is_empty() {
                return Err(TaskTreeError::ScriptAndSteps);
            }
            return self.synthesize_script(script, runner).map(|step| vec![step]);
        }

        let mut steps = Vec::with_capacity(raw_steps.len());
        for (i, raw) in raw_steps.iter().enumerate() {
            let path = format!("steps[{}]", i + 1);
            let Value::Mapping(mapping) = raw else {
                return Err(TaskTreeError::MalformedInput {
                    path,
                    reason: format!("expected a mapping, found {}", value_kind(raw)),
                });
            };

            let mut def = StepDef::from_mapping(mapping.clone(), &path)?;
            if def.has_blank_name() {
                def.insert("name", default_step_name(i));
            }

            let step = self
                .registry
                .load_step(def)
                .map_err(|e| TaskTreeError::StepLoad {
                    index: i + 1,
                    source: Box::new(e),
                })?;
            steps.push(step);
        }
        Ok(steps)
    }

    fn synthesize_script(&self, script: &str, runner: Option<&Mapping>) -> Result<Arc<dyn Step>> {
        let mut raw = Mapping::new();
        raw.insert("name".into(), SCRIPT_STEP_NAME.into());
        raw.insert("script".into(), script.into());
        raw.insert("silent".into(), false.into());
        if let Some(runner) = runner {
            raw.insert("runner".into(), Value::Mapping(runner.clone()));
        }
        let def = StepDef::from_mapping(raw, "")?;

        debug!(script_len = script.len(), has_runner = runner.is_some(), "synthesizing script step");
        self.registry
            .load_step(def)
            .map_err(|e| TaskTreeError::ScriptStepLoad {
                source: Box::new(e),
            })
    }
}
