//! Closure and no-op loaders

use crate::traits::{BlockingDecisionLoader, DecisionLoader};
use crate::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use std::future::Future;

/// Async loader backed by a closure returning a future
pub struct ClosureLoader<F> {
    load: F,
}

impl<F, Fut> ClosureLoader<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = RepositoryResult<Vec<u8>>> + Send,
{
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

#[async_trait]
impl<F, Fut> DecisionLoader for ClosureLoader<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = RepositoryResult<Vec<u8>>> + Send,
{
    async fn load(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        (self.load)(key.to_string()).await
    }
}

/// Blocking loader backed by a closure
pub struct BlockingClosureLoader<F> {
    load: F,
}

impl<F> BlockingClosureLoader<F>
where
    F: Fn(&str) -> RepositoryResult<Vec<u8>> + Send + Sync,
{
    pub fn new(load: F) -> Self {
        Self { load }
    }
}

impl<F> BlockingDecisionLoader for BlockingClosureLoader<F>
where
    F: Fn(&str) -> RepositoryResult<Vec<u8>> + Send + Sync,
{
    fn load_blocking(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        (self.load)(key)
    }
}

/// Loader that has no documents. Engines without a loader use it, so only
/// anonymous decisions can be evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoader;

#[async_trait]
impl DecisionLoader for NoopLoader {
    async fn load(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        Err(RepositoryError::NotFound(key.to_string()))
    }
}

impl BlockingDecisionLoader for NoopLoader {
    fn load_blocking(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        Err(RepositoryError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_closure_loader() {
        let loader = ClosureLoader::new(|key: String| async move {
            match key.as_str() {
                "known" => Ok(b"{}".to_vec()),
                "broken" => Err(RepositoryError::internal(key, anyhow::anyhow!("disk on fire"))),
                _ => Err(RepositoryError::NotFound(key)),
            }
        });

        assert_eq!(loader.load("known").await.unwrap(), b"{}".to_vec());
        assert!(loader.load("missing").await.unwrap_err().is_not_found());
        assert_eq!(
            loader.load("broken").await.unwrap_err().to_string(),
            "Failed to load decision 'broken': disk on fire"
        );
    }

    #[test]
    fn test_blocking_closure_loader() {
        let loader = BlockingClosureLoader::new(|key: &str| Ok(key.as_bytes().to_vec()));
        assert_eq!(loader.load_blocking("abc").unwrap(), b"abc".to_vec());
    }

    #[tokio::test]
    async fn test_noop_loader() {
        assert!(NoopLoader.load("any").await.unwrap_err().is_not_found());
        assert!(NoopLoader.load_blocking("any").unwrap_err().is_not_found());
    }
}
