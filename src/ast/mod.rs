//! AST Module - task documents → canonical task trees
//!
//! - `task`: `TaskDef`, the version-independent task model
//! - `input`: `InputConfig` and legacy parameters/options folding
//! - `schema`: v1/v2 shapes and `SchemaResolver`
//! - `tree`: dynamic task maps (`TaskNode`, `TaskTreeBuilder`)
//!
//! These types describe what a task *is*. Running it is left to whoever
//! consumes the resolved `TaskDef` tree.

mod input;
mod schema;
mod task;
mod tree;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, TaskTreeError};

pub use input::{normalize_inputs, InputConfig, LegacyInput, OptionConfig, ParameterConfig};
pub use schema::{load_task_def, load_task_file, SchemaResolver, SchemaVersion, ScriptSource};
pub use task::{named_tasks_to_array, TaskDef};
pub use tree::{parse_task_map, LeafBody, NamedNode, TaskNode, TaskTreeBuilder};

/// Read a task document, mapping a missing file to `FileNotFound`
fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TaskTreeError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => TaskTreeError::Io(e),
    })
}
