//! Centralized constants for task loading
//!
//! All limits and default names in one place for easy tuning.

// ═══════════════════════════════════════════════════════════════
// Registry Limits
// ═══════════════════════════════════════════════════════════════

/// Maximum number of step loaders a registry accepts
pub const MAX_LOADERS: usize = 32;

/// Maximum depth of steps nested inside other steps (sequence in sequence...)
pub const MAX_NESTING_DEPTH: usize = 16;

// ═══════════════════════════════════════════════════════════════
// Default Names
// ═══════════════════════════════════════════════════════════════

/// Name of the step synthesized from a task's `script` shorthand
pub const SCRIPT_STEP_NAME: &str = "script";

/// Input type reported when a declaration omits `type`
pub const DEFAULT_INPUT_TYPE: &str = "string";
