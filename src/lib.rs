//! Tasktree - task definition loader for YAML task trees
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DOMAIN MODEL                          │
//! │  ast/       Documents → TaskDef (v1, v2, dynamic maps)       │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        STEP LOADING                          │
//! │  step/      StepSynthesizer, StepLoaderRegistry, built-ins   │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    INFRASTRUCTURE LAYER                      │
//! │  config/    Loader selection (tasktree.toml, env)            │
//! │  util/      Constants, YAML key checks                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`ast`] | Schema resolution, input normalization, dynamic task maps |
//! | [`step`] | Step synthesis and the pluggable loader registry |
//! | [`config`] | Which built-in loaders are registered, in which order |
//! | [`util`] | Limits, default names, string-key checks |
//! | [`error`] | Error types with codes and fix suggestions |
//!
//! ## Quick Start
//!
//! ```
//! use tasktree::{load_task_def, StepLoaderRegistry};
//!
//! let registry = StepLoaderRegistry::with_builtins();
//! let task = load_task_def("name: build\nscript: go build\n", &registry).unwrap();
//! assert_eq!(task.steps.len(), 1);
//! ```

// ═══════════════════════════════════════════════════════════════
// DOMAIN MODEL - documents → TaskDef
// ═══════════════════════════════════════════════════════════════
pub mod ast;

// ═══════════════════════════════════════════════════════════════
// STEP LOADING
// ═══════════════════════════════════════════════════════════════
pub mod step;

// ═══════════════════════════════════════════════════════════════
// INFRASTRUCTURE
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;
pub mod util;

// Re-exports for convenience
pub use ast::{
    load_task_def, load_task_file, InputConfig, SchemaResolver, SchemaVersion, TaskDef,
    TaskTreeBuilder,
};
pub use config::TaskTreeConfig;
pub use error::{FixSuggestion, Result, StepLoadError, TaskTreeError};
pub use step::{Step, StepDef, StepLoader, StepLoaderRegistry, StepLoadingContext, StepSynthesizer};
