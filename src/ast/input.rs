//! Task Inputs - unified `inputs` and legacy `parameters`/`options`
//!
//! Two declaration styles exist:
//!
//! ```yaml
//! # legacy: positional parameters + named options
//! parameters:
//!   - name: target
//! options:
//!   - name: verbose
//!     type: boolean
//!
//! # unified
//! inputs:
//!   - name: target
//!     argument-index: 0
//!   - name: verbose
//!     type: boolean
//! ```
//!
//! [`normalize_inputs`] folds both into one ordered `Vec<InputConfig>`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::util::DEFAULT_INPUT_TYPE;

/// One declared task input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub description: String,

    /// Zero-based order among positional inputs; `None` for named inputs
    #[serde(
        default,
        rename = "argument-index",
        skip_serializing_if = "Option::is_none"
    )]
    pub argument_index: Option<usize>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Absorbs all trailing unmatched arguments
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub remainings: bool,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Mapping::is_empty"
    )]
    pub properties: Mapping,
}

impl InputConfig {
    pub fn is_positional(&self) -> bool {
        self.argument_index.is_some()
    }

    /// Declared type, `string` when omitted
    pub fn effective_type(&self) -> &str {
        self.ty.as_deref().unwrap_or(DEFAULT_INPUT_TYPE)
    }
}

/// Legacy `parameters:` / `options:` entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LegacyInput {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remainings: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: Mapping,
}

/// Positional declaration (`parameters:`)
pub type ParameterConfig = LegacyInput;

/// Named declaration (`options:`)
pub type OptionConfig = LegacyInput;

impl LegacyInput {
    fn into_input(self, argument_index: Option<usize>) -> InputConfig {
        InputConfig {
            name: self.name,
            description: self.description,
            argument_index,
            ty: self.ty,
            default: self.default,
            remainings: self.remainings,
            properties: self.properties,
        }
    }
}

/// Merge input declarations into one ordered list
///
/// A non-empty `inputs` list is returned as is and the legacy lists are
/// ignored. Otherwise parameters come first, indexed 0.. by their position
/// among parameters, followed by options without an index.
pub fn normalize_inputs(
    inputs: Vec<InputConfig>,
    parameters: Vec<ParameterConfig>,
    options: Vec<OptionConfig>,
) -> Vec<InputConfig> {
    if !inputs.is_empty() {
        return inputs;
    }

    let mut result = Vec::with_capacity(parameters.len() + options.len());
    result.extend(
        parameters
            .into_iter()
            .enumerate()
            .map(|(i, p)| p.into_input(Some(i))),
    );
    result.extend(options.into_iter().map(|o| o.into_input(None)));
    result
}

/// Treat an explicit YAML `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(value: &bool) -> bool {
    !*value
}
