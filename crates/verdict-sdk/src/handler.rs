//! Custom node handlers
//!
//! An engine holds at most one handler per evaluation mode. Async
//! evaluations call [`CustomNodeHandler`]; blocking evaluations call
//! [`BlockingCustomNodeHandler`] on the calling thread.

use async_trait::async_trait;
use std::future::Future;
use verdict_core::Value;
use verdict_runtime::CustomNodeRequest;

/// Asynchronous custom node handler
#[async_trait]
pub trait CustomNodeHandler: Send + Sync {
    /// Produce the output of a custom node
    async fn handle(&self, request: CustomNodeRequest) -> anyhow::Result<Value>;
}

/// Blocking custom node handler
pub trait BlockingCustomNodeHandler: Send + Sync {
    /// Produce the output of a custom node on the calling thread
    fn handle_blocking(&self, request: CustomNodeRequest) -> anyhow::Result<Value>;
}

/// Async handler backed by a closure returning a future
pub struct ClosureHandler<F> {
    handle: F,
}

impl<F, Fut> ClosureHandler<F>
where
    F: Fn(CustomNodeRequest) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    pub fn new(handle: F) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl<F, Fut> CustomNodeHandler for ClosureHandler<F>
where
    F: Fn(CustomNodeRequest) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn handle(&self, request: CustomNodeRequest) -> anyhow::Result<Value> {
        (self.handle)(request).await
    }
}

/// Blocking handler backed by a closure
pub struct BlockingClosureHandler<F> {
    handle: F,
}

impl<F> BlockingClosureHandler<F>
where
    F: Fn(CustomNodeRequest) -> anyhow::Result<Value> + Send + Sync,
{
    pub fn new(handle: F) -> Self {
        Self { handle }
    }
}

impl<F> BlockingCustomNodeHandler for BlockingClosureHandler<F>
where
    F: Fn(CustomNodeRequest) -> anyhow::Result<Value> + Send + Sync,
{
    fn handle_blocking(&self, request: CustomNodeRequest) -> anyhow::Result<Value> {
        (self.handle)(request)
    }
}
