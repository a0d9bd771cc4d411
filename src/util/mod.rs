//! Utilities Module - shared infrastructure
//!
//! - `constants`: Centralized limits and default names
//! - `keys`: String-key checks for raw YAML mappings

pub mod constants;
mod keys;

pub use constants::{DEFAULT_INPUT_TYPE, MAX_LOADERS, MAX_NESTING_DEPTH, SCRIPT_STEP_NAME};
pub use keys::{child_path, ensure_string_keys, string_key, value_kind};
