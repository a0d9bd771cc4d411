// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! Tasktree Error Types with Error Codes
//!
//! Error code ranges:
//! - TT-000-009: Document errors (YAML, IO)
//! - TT-010-019: Schema resolution errors
//! - TT-020-029: Step synthesis and loading errors
//! - TT-030-039: Registry setup errors
//! - TT-040-049: Malformed input shape errors
//! - TT-050-059: Configuration errors
//!
//! Wrapping variants (`InvalidTask`, `ChildTask`, `StepLoad`, `ScriptStepLoad`)
//! keep the underlying error as `source`; use [`TaskTreeError::root_cause`] to
//! reach the innermost one.

use thiserror::Error;

use crate::ast::SchemaVersion;

pub type Result<T> = std::result::Result<T, TaskTreeError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum TaskTreeError {
    // ═══════════════════════════════════════════
    // DOCUMENT ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[TT-001] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("[TT-002] IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("[TT-003] Task file not found: {path}")]
    FileNotFound { path: String },

    // ═══════════════════════════════════════════
    // SCHEMA ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[TT-010] No task schema matched: {reason}")]
    UnrecognizedSchema { reason: String },

    #[error("[TT-011] Error while reading {version} config of task '{task}': {source}")]
    InvalidTask {
        version: SchemaVersion,
        task: String,
        #[source]
        source: Box<TaskTreeError>,
    },

    #[error("[TT-012] Error in child task '{child}': {source}")]
    ChildTask {
        child: String,
        #[source]
        source: Box<TaskTreeError>,
    },

    // ═══════════════════════════════════════════
    // STEP ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[TT-020] Both script and steps exist")]
    ScriptAndSteps,

    #[error("[TT-021] Error reading step[{index}]: {source}")]
    StepLoad {
        /// 1-based position in the `steps` list
        index: usize,
        #[source]
        source: Box<TaskTreeError>,
    },

    #[error("[TT-022] Script step failed to load: {source}")]
    ScriptStepLoad {
        #[source]
        source: Box<TaskTreeError>,
    },

    #[error("[TT-023] All loaders failed to load step '{step}': {source}")]
    AllLoadersFailed {
        step: String,
        #[source]
        source: StepLoadError,
    },

    #[error("[TT-025] Step nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },

    // ═══════════════════════════════════════════
    // REGISTRY ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[TT-030] No step loaders registered")]
    NoLoaders,

    #[error("[TT-031] Step loader registry is full ({max} loaders)")]
    RegistryFull { max: usize },

    #[error("[TT-032] Unknown step loader '{name}'")]
    UnknownLoader { name: String },

    // ═══════════════════════════════════════════
    // INPUT SHAPE ERRORS (040-049)
    // ═══════════════════════════════════════════
    #[error("[TT-040] Malformed input at '{path}': {reason}")]
    MalformedInput { path: String, reason: String },

    #[error("[TT-041] Non-string key {key} at '{path}'")]
    NonStringKey { path: String, key: String },

    // ═══════════════════════════════════════════
    // CONFIG ERRORS (050-059)
    // ═══════════════════════════════════════════
    #[error("[TT-050] Configuration error: {reason}")]
    Config { reason: String },
}

impl TaskTreeError {
    /// Get the error code (e.g., "TT-020")
    pub fn code(&self) -> &'static str {
        match self {
            Self::YamlParse(_) => "TT-001",
            Self::Io(_) => "TT-002",
            Self::FileNotFound { .. } => "TT-003",
            Self::UnrecognizedSchema { .. } => "TT-010",
            Self::InvalidTask { .. } => "TT-011",
            Self::ChildTask { .. } => "TT-012",
            Self::ScriptAndSteps => "TT-020",
            Self::StepLoad { .. } => "TT-021",
            Self::ScriptStepLoad { .. } => "TT-022",
            Self::AllLoadersFailed { .. } => "TT-023",
            Self::NestingTooDeep { .. } => "TT-025",
            Self::NoLoaders => "TT-030",
            Self::RegistryFull { .. } => "TT-031",
            Self::UnknownLoader { .. } => "TT-032",
            Self::MalformedInput { .. } => "TT-040",
            Self::NonStringKey { .. } => "TT-041",
            Self::Config { .. } => "TT-050",
        }
    }

    /// Innermost error behind the wrapping variants
    pub fn root_cause(&self) -> &TaskTreeError {
        let mut current = self;
        loop {
            match current {
                Self::InvalidTask { source, .. }
                | Self::ChildTask { source, .. }
                | Self::StepLoad { source, .. }
                | Self::ScriptStepLoad { source } => current = source,
                _ => return current,
            }
        }
    }

    /// True when the document content is at fault, false for setup errors
    /// (missing files, registry or config problems).
    pub fn is_malformed_input(&self) -> bool {
        !matches!(
            self.root_cause(),
            Self::Io(_)
                | Self::FileNotFound { .. }
                | Self::NoLoaders
                | Self::RegistryFull { .. }
                | Self::UnknownLoader { .. }
                | Self::Config { .. }
        )
    }
}

impl FixSuggestion for TaskTreeError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            TaskTreeError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            TaskTreeError::Io(_) => Some("Check file path and permissions"),
            TaskTreeError::FileNotFound { .. } => Some("Check the file path exists"),
            TaskTreeError::UnrecognizedSchema { .. } => {
                Some("Give the task a `name` or `tasks` list, or a `tasks` map, `script` or `steps`")
            }
            TaskTreeError::InvalidTask { source, .. }
            | TaskTreeError::ChildTask { source, .. }
            | TaskTreeError::StepLoad { source, .. }
            | TaskTreeError::ScriptStepLoad { source } => source.fix_suggestion(),
            TaskTreeError::ScriptAndSteps => {
                Some("Use either `script` or `steps` on a task, not both")
            }
            TaskTreeError::AllLoadersFailed { source, .. } if source.is_unsupported() => {
                Some("Check the step has a `script`, `task` or `steps` key")
            }
            TaskTreeError::AllLoadersFailed { .. } => Some("Fix the step fields reported above"),
            TaskTreeError::NestingTooDeep { .. } => Some("Flatten nested `steps` sequences"),
            TaskTreeError::NoLoaders => Some("Enable at least one loader in [loaders] enabled"),
            TaskTreeError::RegistryFull { .. } => Some("Register fewer step loaders"),
            TaskTreeError::UnknownLoader { .. } => {
                Some("Valid loaders are: script, task, sequence")
            }
            TaskTreeError::MalformedInput { .. } => {
                Some("Task bodies must be mappings of field names to values")
            }
            TaskTreeError::NonStringKey { .. } => Some("Quote the key so it is read as a string"),
            TaskTreeError::Config { .. } => Some("Check tasktree.toml syntax"),
        }
    }
}

/// Outcome of a single loader refusing or failing a step.
///
/// `Unsupported` means the step is not meant for this loader. The other
/// variants mean the loader recognized the step and found it broken; the
/// registry still tries the remaining loaders, but reports these first.
#[derive(Error, Debug)]
pub enum StepLoadError {
    #[error("loader '{loader}' does not handle this step: {reason}")]
    Unsupported { loader: String, reason: String },

    #[error("loader '{loader}' found an invalid step: {reason}")]
    Invalid { loader: String, reason: String },

    #[error("loader '{loader}' failed to load a nested step: {source}")]
    Nested {
        loader: String,
        #[source]
        source: Box<TaskTreeError>,
    },
}

impl StepLoadError {
    pub fn unsupported(loader: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            loader: loader.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid(loader: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            loader: loader.into(),
            reason: reason.into(),
        }
    }

    pub fn nested(loader: impl Into<String>, source: TaskTreeError) -> Self {
        Self::Nested {
            loader: loader.into(),
            source: Box::new(source),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_and_steps_code_and_display() {
        let err = TaskTreeError::ScriptAndSteps;
        assert_eq!(err.code(), "TT-020");
        assert!(err.to_string().contains("[TT-020]"));
        assert!(err.to_string().contains("Both script and steps"));
    }

    #[test]
    fn test_root_cause_unwraps_nested_wrappers() {
        let err = TaskTreeError::InvalidTask {
            version: SchemaVersion::V1,
            task: "build".to_string(),
            source: Box::new(TaskTreeError::StepLoad {
                index: 2,
                source: Box::new(TaskTreeError::NoLoaders),
            }),
        };
        assert_eq!(err.code(), "TT-011");
        assert_eq!(err.root_cause().code(), "TT-030");
        assert!(err.to_string().contains("step[2]"));
    }

    #[test]
    fn test_is_malformed_input() {
        let data = TaskTreeError::StepLoad {
            index: 1,
            source: Box::new(TaskTreeError::NonStringKey {
                path: "steps[1]".to_string(),
                key: "1".to_string(),
            }),
        };
        assert!(data.is_malformed_input());

        let setup = TaskTreeError::ScriptStepLoad {
            source: Box::new(TaskTreeError::NoLoaders),
        };
        assert!(!setup.is_malformed_input());
    }

    #[test]
    fn test_fix_suggestion_follows_wrapped_source() {
        let err = TaskTreeError::ChildTask {
            child: "deploy".to_string(),
            source: Box::new(TaskTreeError::ScriptAndSteps),
        };
        let suggestion = err.fix_suggestion().unwrap();
        assert!(suggestion.contains("not both"));
    }

    #[test]
    fn test_step_load_error_classification() {
        assert!(StepLoadError::unsupported("script", "no `script` key").is_unsupported());
        assert!(!StepLoadError::invalid("script", "bad").is_unsupported());
        let nested = StepLoadError::nested("sequence", TaskTreeError::NestingTooDeep { max: 4 });
        assert!(!nested.is_unsupported());
        assert!(nested.to_string().contains("sequence"));
    }
}
