//! Step Loader Registry
//!
//! Ordered, bounded collection of [`StepLoader`]s. A registry is assembled
//! once at startup through [`StepLoaderRegistryBuilder`] and is immutable
//! afterwards; resolution code receives it as `&StepLoaderRegistry`.
//!
//! ## Resolution Order
//!
//! Loaders are tried in registration order:
//! - first `Ok` wins and is returned immediately
//! - any `StepLoadError` moves on to the next loader, so a loader registered
//!   later can still take a step an earlier one half-recognized
//! - when every loader failed, the result is `AllLoadersFailed` wrapping the
//!   last `Invalid`/`Nested` error if there was one, else the last
//!   `Unsupported` refusal

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::TaskTreeConfig;
use crate::error::{Result, StepLoadError, TaskTreeError};
use crate::util::{MAX_LOADERS, MAX_NESTING_DEPTH};

use super::builtin::BuiltinLoader;
use super::{Step, StepDef};

// ============================================================================
// PLUGIN INTERFACE
// ============================================================================

/// A pluggable step kind
///
/// Return `StepLoadError::Unsupported` when the configuration is not meant
/// for this loader, and `Invalid`/`Nested` when it is but cannot be loaded.
pub trait StepLoader: Send + Sync {
    /// Loader name, used in logs and errors
    fn name(&self) -> &str;

    fn load_step(
        &self,
        def: &StepDef,
        ctx: &dyn StepLoadingContext,
    ) -> std::result::Result<Arc<dyn Step>, StepLoadError>;
}

/// Callback handed to loaders for resolving nested step configurations
pub trait StepLoadingContext {
    /// Resolve a nested step through the same registry
    fn load_step(&self, def: StepDef) -> Result<Arc<dyn Step>>;
}

// ============================================================================
// BUILDER
// ============================================================================

/// Startup-time builder; the only way to add loaders
#[derive(Default)]
pub struct StepLoaderRegistryBuilder {
    loaders: Vec<Box<dyn StepLoader>>,
}

impl StepLoaderRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a loader after the ones already registered
    pub fn register(&mut self, loader: impl StepLoader + 'static) -> Result<&mut Self> {
        self.register_boxed(Box::new(loader))
    }

    pub fn register_boxed(&mut self, loader: Box<dyn StepLoader>) -> Result<&mut Self> {
        if self.loaders.len() >= MAX_LOADERS {
            return Err(TaskTreeError::RegistryFull { max: MAX_LOADERS });
        }
        debug!(loader = loader.name(), position = self.loaders.len(), "registering step loader");
        self.loaders.push(loader);
        Ok(self)
    }

    pub fn register_builtin(&mut self, builtin: BuiltinLoader) -> Result<&mut Self> {
        self.register_boxed(builtin.loader())
    }

    /// Freeze the loader list
    pub fn build(self) -> StepLoaderRegistry {
        StepLoaderRegistry {
            loaders: self.loaders,
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Immutable, ordered set of step loaders
pub struct StepLoaderRegistry {
    loaders: Vec<Box<dyn StepLoader>>,
}

impl StepLoaderRegistry {
    pub fn builder() -> StepLoaderRegistryBuilder {
        StepLoaderRegistryBuilder::new()
    }

    /// Registry with every built-in loader, in `BuiltinLoader::ALL` order
    pub fn with_builtins() -> Self {
        Self {
            loaders: BuiltinLoader::ALL.iter().map(|b| b.loader()).collect(),
        }
    }

    /// Registry with the built-in loaders enabled in the config, in config order
    pub fn from_config(config: &TaskTreeConfig) -> Result<Self> {
        let mut builder = Self::builder();
        for builtin in &config.loaders.enabled {
            builder.register_builtin(*builtin)?;
        }
        Ok(builder.build())
    }

    pub fn loader_names(&self) -> Vec<&str> {
        self.loaders.iter().map(|l| l.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Resolve a raw step configuration into a step
    pub fn load_step(&self, def: StepDef) -> Result<Arc<dyn Step>> {
        self.load_at_depth(def, 0)
    }

    #[instrument(level = "debug", skip(self, def), fields(step = def.name().unwrap_or("")))]
    fn load_at_depth(&self, def: StepDef, depth: usize) -> Result<Arc<dyn Step>> {
        if depth > MAX_NESTING_DEPTH {
            return Err(TaskTreeError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
            });
        }

        let step_name = def.name().unwrap_or("<unnamed>").to_string();
        let ctx = LoadingContext {
            registry: self,
            depth,
        };

        let mut last_refusal = None;
        let mut last_rejection = None;
        for loader in &self.loaders {
            match loader.load_step(&def, &ctx) {
                Ok(step) => {
                    debug!(loader = loader.name(), kind = step.kind(), "step loaded");
                    return Ok(step);
                }
                Err(e) if e.is_unsupported() => {
                    debug!(loader = loader.name(), reason = %e, "loader skipped step");
                    last_refusal = Some(e);
                }
                Err(e) => {
                    debug!(loader = loader.name(), error = %e, "loader rejected step");
                    last_rejection = Some(e);
                }
            }
        }

        match last_rejection.or(last_refusal) {
            Some(source) => Err(TaskTreeError::AllLoadersFailed {
                step: step_name,
                source,
            }),
            None => Err(TaskTreeError::NoLoaders),
        }
    }
}

impl Default for StepLoaderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for StepLoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepLoaderRegistry")
            .field("loaders", &self.loader_names())
            .finish()
    }
}

/// Context passed to loaders; nested loads go one level deeper
struct LoadingContext<'r> {
    registry: &'r StepLoaderRegistry,
    depth: usize,
}

impl StepLoadingContext for LoadingContext<'_> {
    fn load_step(&self, def: StepDef) -> Result<Arc<dyn Step>> {
        self.registry.load_at_depth(def, self.depth + 1)
    }
}
