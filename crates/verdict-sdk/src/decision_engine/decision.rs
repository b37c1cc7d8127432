//! Compiled decision handle

use super::engine::EngineInner;
use crate::config::EvaluationOptions;
use crate::error::Result;
use std::sync::Arc;
use verdict_core::{CompiledDecision, Value};
use verdict_runtime::DecisionResponse;

/// A compiled decision bound to the engine that produced it
#[derive(Clone)]
pub struct Decision {
    engine: Arc<EngineInner>,
    decision: Arc<CompiledDecision>,
    key: Option<String>,
}

impl Decision {
    pub(crate) fn new(engine: Arc<EngineInner>, decision: Arc<CompiledDecision>, key: Option<String>) -> Self {
        Self {
            engine,
            decision,
            key,
        }
    }

    /// Cache key, `None` for decisions created from content
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn compiled(&self) -> &CompiledDecision {
        &self.decision
    }

    /// Evaluate on the calling thread
    pub fn evaluate(&self, input: impl Into<Value>) -> Result<DecisionResponse> {
        self.evaluate_with(input, EvaluationOptions::default())
    }

    pub fn evaluate_with(&self, input: impl Into<Value>, options: EvaluationOptions) -> Result<DecisionResponse> {
        self.engine
            .evaluate_blocking(&self.decision, input.into(), &options)
    }

    /// Evaluate without blocking
    pub async fn evaluate_async(&self, input: impl Into<Value>) -> Result<DecisionResponse> {
        self.evaluate_async_with(input, EvaluationOptions::default())
            .await
    }

    pub async fn evaluate_async_with(
        &self,
        input: impl Into<Value>,
        options: EvaluationOptions,
    ) -> Result<DecisionResponse> {
        self.engine
            .evaluate_async(&self.decision, input.into(), &options)
            .await
    }
}

impl std::fmt::Debug for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decision")
            .field("key", &self.key)
            .field("nodes", &self.decision.nodes.len())
            .finish()
    }
}
