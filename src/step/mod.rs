//! Step Module - raw step configurations and their loaded form
//!
//! - `StepDef`: string-keyed raw configuration, the input of every loader
//! - `Step`: opaque loaded step, produced by a `StepLoader`
//! - `registry`: ordered loader collection (`StepLoaderRegistry`)
//! - `synth`: script/steps → `Vec<Arc<dyn Step>>` (`StepSynthesizer`)
//! - `builtin`: the `script`, `task` and `sequence` step kinds

mod builtin;
mod registry;
mod synth;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::Result;
use crate::util::{child_path, ensure_string_keys, string_key};

pub use builtin::{
    BuiltinLoader, RunnerConfig, ScriptStep, ScriptStepLoader, SequenceStep, SequenceStepLoader,
    TaskStep, TaskStepLoader,
};
pub use registry::{StepLoader, StepLoaderRegistry, StepLoaderRegistryBuilder, StepLoadingContext};
pub use synth::{default_step_name, StepSynthesizer};

// ============================================================================
// STEP
// ============================================================================

/// A loaded, executable step
///
/// The loading core never looks inside a step. Execution backends downcast
/// through [`Step::as_any`] to the concrete kinds they know.
pub trait Step: fmt::Debug + Send + Sync {
    /// Step name (explicit, or `step-<n>` / `script` when defaulted)
    fn name(&self) -> &str;

    /// Step kind, usually the name of the loader that produced it
    fn kind(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    /// Nested steps, for composite kinds
    fn steps(&self) -> &[Arc<dyn Step>] {
        &[]
    }
}

// ============================================================================
// STEP DEF
// ============================================================================

/// Raw step configuration
///
/// A string-keyed mapping with arbitrary nested values. Every key, at any
/// depth, is guaranteed to be a string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepDef {
    config: Mapping,
}

impl StepDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a raw mapping, rejecting non-string keys
    ///
    /// `path` locates the mapping in the document for error messages.
    pub fn from_mapping(config: Mapping, path: &str) -> Result<Self> {
        for (key, value) in &config {
            let key = string_key(key, path)?;
            ensure_string_keys(value, &child_path(path, key))?;
        }
        Ok(Self { config })
    }

    /// Insert a value, returning the previous one
    ///
    /// Nested mappings are not re-checked here; prefer `from_mapping` for
    /// document data.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.config.insert(Value::String(key.to_string()), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The `name` field, when it is a string
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// True when `name` is missing, null or an empty string
    pub fn has_blank_name(&self) -> bool {
        match self.get("name") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.config.keys().filter_map(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.config.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.config
    }

    /// Decode the whole configuration into a typed parameter struct
    pub fn decode<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_yaml::Error> {
        serde_yaml::from_value(Value::Mapping(self.config.clone()))
    }
}
