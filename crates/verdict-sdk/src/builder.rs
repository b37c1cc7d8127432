//! Builder pattern for DecisionEngine

use crate::config::EngineConfig;
use crate::decision_engine::engine::EngineInner;
use crate::decision_engine::DecisionEngine;
use crate::handler::{
    BlockingClosureHandler, BlockingCustomNodeHandler, ClosureHandler, CustomNodeHandler,
};
use std::future::Future;
use std::sync::Arc;
use verdict_core::Value;
use verdict_repository::{
    BlockingClosureLoader, BlockingDecisionLoader, ClosureLoader, DecisionLoader, NoopLoader,
    RepositoryResult,
};
use verdict_runtime::{CustomNodeRequest, Scheduling, ZeroDivisionPolicy};

/// Builder for DecisionEngine
///
/// # Example
///
/// ```rust,ignore
/// use verdict_sdk::{DecisionEngineBuilder, FilesystemLoader};
///
/// // Documents on disk, blocking custom nodes
/// let engine = DecisionEngineBuilder::new()
///     .with_loader(FilesystemLoader::new("decisions")?)
///     .with_blocking_handler_fn(|request| Ok(request.input))
///     .build();
///
/// // Async loader and handler with tracing on by default
/// let engine = DecisionEngineBuilder::new()
///     .with_loader_fn(|key| async move { fetch(&key).await })
///     .with_handler_fn(|request| async move { call_service(request).await })
///     .enable_trace(true)
///     .build();
/// ```
#[derive(Default)]
pub struct DecisionEngineBuilder {
    config: EngineConfig,
    loader: Option<Arc<dyn DecisionLoader>>,
    blocking_loader: Option<Arc<dyn BlockingDecisionLoader>>,
    handler: Option<Arc<dyn CustomNodeHandler>>,
    blocking_handler: Option<Arc<dyn BlockingCustomNodeHandler>>,
}

impl DecisionEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // ========== Loaders ==========

    /// Loader serving both evaluation modes
    pub fn with_loader<L>(mut self, loader: L) -> Self
    where
        L: DecisionLoader + BlockingDecisionLoader + 'static,
    {
        let loader = Arc::new(loader);
        self.loader = Some(loader.clone());
        self.blocking_loader = Some(loader);
        self
    }

    /// Loader used by async evaluations
    pub fn with_async_loader<L: DecisionLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    /// Loader used by blocking evaluations
    pub fn with_blocking_loader<L: BlockingDecisionLoader + 'static>(mut self, loader: L) -> Self {
        self.blocking_loader = Some(Arc::new(loader));
        self
    }

    /// Async loader from a closure
    pub fn with_loader_fn<F, Fut>(self, load: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RepositoryResult<Vec<u8>>> + Send + 'static,
    {
        self.with_async_loader(ClosureLoader::new(load))
    }

    /// Blocking loader from a closure
    pub fn with_blocking_loader_fn<F>(self, load: F) -> Self
    where
        F: Fn(&str) -> RepositoryResult<Vec<u8>> + Send + Sync + 'static,
    {
        self.with_blocking_loader(BlockingClosureLoader::new(load))
    }

    // ========== Custom Node Handlers ==========

    /// Handler used by async evaluations
    pub fn with_handler<H: CustomNodeHandler + 'static>(mut self, handler: H) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Handler used by blocking evaluations
    pub fn with_blocking_handler<H: BlockingCustomNodeHandler + 'static>(mut self, handler: H) -> Self {
        self.blocking_handler = Some(Arc::new(handler));
        self
    }

    /// Async handler from a closure
    pub fn with_handler_fn<F, Fut>(self, handle: F) -> Self
    where
        F: Fn(CustomNodeRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.with_handler(ClosureHandler::new(handle))
    }

    /// Blocking handler from a closure
    pub fn with_blocking_handler_fn<F>(self, handle: F) -> Self
    where
        F: Fn(CustomNodeRequest) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.with_blocking_handler(BlockingClosureHandler::new(handle))
    }

    // ========== Evaluation Settings ==========

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Trace evaluations by default
    pub fn enable_trace(mut self, enable: bool) -> Self {
        self.config.trace = enable;
        self
    }

    pub fn with_zero_division(mut self, policy: ZeroDivisionPolicy) -> Self {
        self.config.zero_division = policy;
        self
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.config.scheduling = scheduling;
        self
    }

    pub fn with_nodes_in_context(mut self, enabled: bool) -> Self {
        self.config.nodes_in_context = enabled;
        self
    }

    pub fn with_validate_input(mut self, enabled: bool) -> Self {
        self.config.validate_input = enabled;
        self
    }

    /// Build the engine. Missing loaders behave like [`NoopLoader`].
    pub fn build(self) -> DecisionEngine {
        tracing::info!(
            async_loader = self.loader.is_some(),
            blocking_loader = self.blocking_loader.is_some(),
            async_handler = self.handler.is_some(),
            blocking_handler = self.blocking_handler.is_some(),
            max_depth = self.config.max_depth,
            "decision engine initialized"
        );

        let inner = EngineInner::new(
            self.config,
            self.loader.unwrap_or_else(|| Arc::new(NoopLoader)),
            self.blocking_loader.unwrap_or_else(|| Arc::new(NoopLoader)),
            self.handler,
            self.blocking_handler,
        );
        DecisionEngine::from_inner(inner)
    }
}
