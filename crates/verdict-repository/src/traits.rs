//! Loader traits
//!
//! A loader maps an opaque decision key to raw document bytes. Async
//! loaders serve `evaluate_async`; blocking loaders serve the blocking
//! evaluation path and run on the calling thread.

use crate::RepositoryResult;
use async_trait::async_trait;

/// Asynchronous document loader
#[async_trait]
pub trait DecisionLoader: Send + Sync {
    /// Fetch the raw document for `key`
    async fn load(&self, key: &str) -> RepositoryResult<Vec<u8>>;
}

/// Blocking document loader
pub trait BlockingDecisionLoader: Send + Sync {
    /// Fetch the raw document for `key` on the calling thread
    fn load_blocking(&self, key: &str) -> RepositoryResult<Vec<u8>>;
}
