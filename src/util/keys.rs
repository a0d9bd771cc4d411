//! Key checks for raw YAML mappings
//!
//! YAML allows any scalar (and even collections) as mapping keys. Task and
//! step configurations are string-keyed, so every raw mapping is checked
//! before it is handed to loaders or decoded into typed fields.

use serde_yaml::Value;

use crate::error::{Result, TaskTreeError};

/// Human-readable kind of a YAML value, for error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Join a parent path and a segment with `.`
pub fn child_path(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

/// Borrow a mapping key as `&str`, or fail with `NonStringKey`
pub fn string_key<'a>(key: &'a Value, path: &str) -> Result<&'a str> {
    match key {
        Value::String(s) => Ok(s.as_str()),
        other => Err(TaskTreeError::NonStringKey {
            path: path.to_string(),
            key: describe_key(other),
        }),
    }
}

/// Check that every mapping key under `value` is a string, recursively
///
/// Sequences are walked too, so a mapping nested in a list is covered.
/// Items are labelled from 1, like `steps[1]` in step errors.
pub fn ensure_string_keys(value: &Value, path: &str) -> Result<()> {
    match value {
        Value::Mapping(mapping) => {
            for (key, nested) in mapping {
                let key = string_key(key, path)?;
                ensure_string_keys(nested, &child_path(path, key))?;
            }
            Ok(())
        }
        Value::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                ensure_string_keys(item, &format!("{}[{}]", path, i + 1))?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => ensure_string_keys(&tagged.value, path),
        _ => Ok(()),
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => format!("<{}>", value_kind(other)),
    }
}
