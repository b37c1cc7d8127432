//! In-memory loader

use crate::traits::{BlockingDecisionLoader, DecisionLoader};
use crate::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Loader serving documents registered in memory. Suitable for tests and
/// for hosts that fetch documents themselves.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    documents: Arc<DashMap<String, Arc<[u8]>>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw document bytes under `key`, replacing any previous one
    pub fn insert(&self, key: impl Into<String>, document: impl Into<Vec<u8>>) {
        let document: Vec<u8> = document.into();
        self.documents.insert(key.into(), Arc::from(document));
    }

    /// Register a JSON document under `key`
    pub fn insert_json(&self, key: impl Into<String>, document: &serde_json::Value) {
        self.insert(key, document.to_string());
    }

    pub fn with_document(self, key: impl Into<String>, document: impl Into<Vec<u8>>) -> Self {
        self.insert(key, document);
        self
    }

    pub fn remove(&self, key: &str) -> bool {
        self.documents.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn get(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        self.documents
            .get(key)
            .map(|document| document.to_vec())
            .ok_or_else(|| RepositoryError::NotFound(key.to_string()))
    }
}

#[async_trait]
impl DecisionLoader for MemoryLoader {
    async fn load(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        self.get(key)
    }
}

impl BlockingDecisionLoader for MemoryLoader {
    fn load_blocking(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_and_load() {
        let loader = MemoryLoader::new().with_document("raw", "{}");
        loader.insert_json("json", &json!({"nodes": [], "edges": []}));

        assert_eq!(loader.len(), 2);
        assert_eq!(loader.load("raw").await.unwrap(), b"{}".to_vec());

        let loaded: serde_json::Value = serde_json::from_slice(&loader.load_blocking("json").unwrap()).unwrap();
        assert_eq!(loaded, json!({"nodes": [], "edges": []}));
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let loader = MemoryLoader::new();
        let shared = loader.clone();
        loader.insert("a", "{}");

        assert!(shared.load("a").await.is_ok());
        assert!(shared.remove("a"));
        assert!(loader.load("a").await.unwrap_err().is_not_found());
    }
}
