//! Core DecisionEngine implementation

use super::decision::Decision;
use super::host::{AsyncHost, BlockingHost};
use crate::builder::DecisionEngineBuilder;
use crate::config::{EngineConfig, EvaluationOptions};
use crate::error::{Result, SdkError};
use crate::handler::{BlockingCustomNodeHandler, CustomNodeHandler};
use futures::executor::block_on;
use std::sync::Arc;
use verdict_compiler::Compiler;
use verdict_core::{CompiledDecision, Value};
use verdict_repository::{BlockingDecisionLoader, CacheStats, DecisionCache, DecisionLoader};
use verdict_runtime::{DecisionResponse, GraphExecutor, Interpreter};

/// Which loader serves a cache miss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadMode {
    Async,
    Blocking,
}

/// State shared by an engine, its clones and every decision handle
pub(crate) struct EngineInner {
    pub(crate) config: EngineConfig,
    compiler: Compiler,
    loader: Arc<dyn DecisionLoader>,
    blocking_loader: Arc<dyn BlockingDecisionLoader>,
    pub(crate) handler: Option<Arc<dyn CustomNodeHandler>>,
    pub(crate) blocking_handler: Option<Arc<dyn BlockingCustomNodeHandler>>,
    cache: DecisionCache<CompiledDecision>,
}

impl EngineInner {
    pub(crate) fn new(
        config: EngineConfig,
        loader: Arc<dyn DecisionLoader>,
        blocking_loader: Arc<dyn BlockingDecisionLoader>,
        handler: Option<Arc<dyn CustomNodeHandler>>,
        blocking_handler: Option<Arc<dyn BlockingCustomNodeHandler>>,
    ) -> Self {
        Self {
            config,
            compiler: Compiler::new(),
            loader,
            blocking_loader,
            handler,
            blocking_handler,
            cache: DecisionCache::new(),
        }
    }

    /// Cached compiled decision for `key`, loading and compiling it on a miss.
    /// Concurrent misses for one key share a single load.
    pub(crate) async fn resolve(&self, key: &str, mode: LoadMode) -> Result<Arc<CompiledDecision>> {
        self.cache
            .get_or_try_init(key, || async {
                let document = match mode {
                    LoadMode::Async => self.loader.load(key).await,
                    LoadMode::Blocking => self.blocking_loader.load_blocking(key),
                }
                .map_err(|e| SdkError::document_load(key, e))?;

                tracing::debug!(key, bytes = document.len(), "compiling decision");
                Ok::<_, SdkError>(self.compiler.compile(&document)?)
            })
            .await
    }

    pub(crate) fn compile(&self, content: &[u8]) -> Result<CompiledDecision> {
        Ok(self.compiler.compile(content)?)
    }

    pub(crate) fn evaluate_blocking(
        &self,
        decision: &CompiledDecision,
        input: Value,
        options: &EvaluationOptions,
    ) -> Result<DecisionResponse> {
        let host = BlockingHost::new(self);
        let executor = GraphExecutor::new(&host, self.config.execution_options(options, true));
        Ok(block_on(executor.evaluate(decision, input))?)
    }

    pub(crate) async fn evaluate_async(
        &self,
        decision: &CompiledDecision,
        input: Value,
        options: &EvaluationOptions,
    ) -> Result<DecisionResponse> {
        let host = AsyncHost::new(self);
        let executor = GraphExecutor::new(&host, self.config.execution_options(options, false));
        Ok(executor.evaluate(decision, input).await?)
    }
}

/// Decision engine
///
/// Cloning is cheap; clones share the loader, handlers and the
/// compiled-decision cache.
///
/// # Example
///
/// ```rust,ignore
/// use verdict_sdk::{DecisionEngine, MemoryLoader};
///
/// let loader = MemoryLoader::new();
/// loader.insert("double.json", document);
///
/// let engine = DecisionEngine::builder().with_loader(loader).build();
/// let response = engine.evaluate("double.json", json!({"input": 5}))?;
/// ```
#[derive(Clone)]
pub struct DecisionEngine {
    inner: Arc<EngineInner>,
}

impl DecisionEngine {
    /// Engine without loader or handlers. Only decisions created from
    /// content can be evaluated.
    pub fn new() -> Self {
        DecisionEngineBuilder::new().build()
    }

    pub fn builder() -> DecisionEngineBuilder {
        DecisionEngineBuilder::new()
    }

    pub(crate) fn from_inner(inner: EngineInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Evaluate the decision stored under `key` on the calling thread
    pub fn evaluate(&self, key: &str, input: impl Into<Value>) -> Result<DecisionResponse> {
        self.evaluate_with(key, input, EvaluationOptions::default())
    }

    /// Blocking evaluation with per-call options
    #[tracing::instrument(skip(self, input, options))]
    pub fn evaluate_with(
        &self,
        key: &str,
        input: impl Into<Value>,
        options: EvaluationOptions,
    ) -> Result<DecisionResponse> {
        let input = input.into();
        let decision = block_on(self.inner.resolve(key, LoadMode::Blocking))?;
        self.inner.evaluate_blocking(&decision, input, &options)
    }

    /// Evaluate the decision stored under `key` without blocking.
    /// Dropping the returned future cancels any handler call it owns.
    pub async fn evaluate_async(&self, key: &str, input: impl Into<Value>) -> Result<DecisionResponse> {
        self.evaluate_async_with(key, input, EvaluationOptions::default())
            .await
    }

    /// Async evaluation with per-call options
    #[tracing::instrument(skip(self, input, options))]
    pub async fn evaluate_async_with(
        &self,
        key: &str,
        input: impl Into<Value>,
        options: EvaluationOptions,
    ) -> Result<DecisionResponse> {
        let input = input.into();
        let decision = self.inner.resolve(key, LoadMode::Async).await?;
        self.inner.evaluate_async(&decision, input, &options).await
    }

    /// Handle to the cached decision for `key`, loading it with the
    /// blocking loader on a miss
    pub fn get_decision(&self, key: &str) -> Result<Decision> {
        let decision = block_on(self.inner.resolve(key, LoadMode::Blocking))?;
        Ok(Decision::new(self.inner.clone(), decision, Some(key.to_string())))
    }

    /// Handle to the cached decision for `key`, loading it with the async
    /// loader on a miss
    pub async fn get_decision_async(&self, key: &str) -> Result<Decision> {
        let decision = self.inner.resolve(key, LoadMode::Async).await?;
        Ok(Decision::new(self.inner.clone(), decision, Some(key.to_string())))
    }

    /// Compile anonymous content. The result is not cached.
    pub fn create_decision(&self, content: impl AsRef<[u8]>) -> Result<Decision> {
        let decision = self.inner.compile(content.as_ref())?;
        Ok(Decision::new(self.inner.clone(), Arc::new(decision), None))
    }

    /// Evaluate a standard expression with this engine's settings
    pub fn evaluate_expression(&self, expression: &str, context: impl Into<Value>) -> Result<Value> {
        let interpreter = Interpreter::new(self.inner.config.zero_division);
        Ok(verdict_runtime::evaluate_expression_with(
            &interpreter,
            expression,
            &context.into(),
        )?)
    }

    /// Evaluate a unary expression against `$` with this engine's settings
    pub fn evaluate_unary_expression(&self, expression: &str, context: impl Into<Value>) -> Result<bool> {
        let interpreter = Interpreter::new(self.inner.config.zero_division);
        Ok(verdict_runtime::evaluate_unary_expression_with(
            &interpreter,
            expression,
            &context.into(),
        )?)
    }

    /// Render a `{{ expression }}` template with this engine's settings
    pub fn render_template(&self, template: &str, context: impl Into<Value>) -> Result<Value> {
        let interpreter = Interpreter::new(self.inner.config.zero_division);
        Ok(verdict_runtime::render_template_with(
            &interpreter,
            template,
            &context.into(),
        )?)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.stats()
    }

    /// Drop the cached decision for `key`
    pub fn invalidate(&self, key: &str) -> bool {
        self.inner.cache.invalidate(key)
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("config", &self.inner.config)
            .field("has_handler", &self.inner.handler.is_some())
            .field("has_blocking_handler", &self.inner.blocking_handler.is_some())
            .field("cache", &self.inner.cache.stats())
            .finish()
    }
}
