//! Runtime hosts
//!
//! The executor is written against `DecisionHost`. The async host awaits
//! the async loader and handler; the blocking host calls the blocking ones
//! inline, so its futures complete without suspending.

use super::engine::{EngineInner, LoadMode};
use async_trait::async_trait;
use std::sync::Arc;
use verdict_core::{CompiledDecision, Value};
use verdict_runtime::{CustomNodeRequest, DecisionHost, RuntimeError};

fn handler_error(node_id: String, error: anyhow::Error) -> RuntimeError {
    RuntimeError::CustomHandler {
        node_id,
        cause: format!("{error:#}"),
    }
}

pub(crate) struct AsyncHost<'e> {
    engine: &'e EngineInner,
}

impl<'e> AsyncHost<'e> {
    pub(crate) fn new(engine: &'e EngineInner) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<'e> DecisionHost for AsyncHost<'e> {
    async fn load(&self, key: &str) -> verdict_runtime::Result<Arc<CompiledDecision>> {
        self.engine
            .resolve(key, LoadMode::Async)
            .await
            .map_err(|e| e.into_load_error(key))
    }

    async fn handle(&self, request: CustomNodeRequest) -> verdict_runtime::Result<Value> {
        let handler = self
            .engine
            .handler
            .as_ref()
            .ok_or(RuntimeError::NoHandlerConfigured)?;

        let node_id = request.node_id.clone();
        handler
            .handle(request)
            .await
            .map_err(|e| handler_error(node_id, e))
    }
}

pub(crate) struct BlockingHost<'e> {
    engine: &'e EngineInner,
}

impl<'e> BlockingHost<'e> {
    pub(crate) fn new(engine: &'e EngineInner) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl<'e> DecisionHost for BlockingHost<'e> {
    async fn load(&self, key: &str) -> verdict_runtime::Result<Arc<CompiledDecision>> {
        self.engine
            .resolve(key, LoadMode::Blocking)
            .await
            .map_err(|e| e.into_load_error(key))
    }

    async fn handle(&self, request: CustomNodeRequest) -> verdict_runtime::Result<Value> {
        let handler = self
            .engine
            .blocking_handler
            .as_ref()
            .ok_or(RuntimeError::NoHandlerConfigured)?;

        let node_id = request.node_id.clone();
        handler
            .handle_blocking(request)
            .map_err(|e| handler_error(node_id, e))
    }
}
