//! File system loader
//!
//! Keys are paths relative to the loader root. A key without an extension
//! also matches `<key>.json`.

use crate::traits::{BlockingDecisionLoader, DecisionLoader};
use crate::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use dashmap::DashMap;
use path_absolutize::Absolutize;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

const DEFAULT_EXTENSION: &str = "json";

/// Loads decision documents from a directory
#[derive(Debug)]
pub struct FilesystemLoader {
    root: PathBuf,
    /// Keep loaded bytes so each file is read at most once
    keep_in_memory: bool,
    memory: DashMap<String, Vec<u8>>,
}

impl FilesystemLoader {
    /// Create a loader rooted at `root`, which must exist
    pub fn new<P: AsRef<Path>>(root: P) -> RepositoryResult<Self> {
        let path = root.as_ref();
        if !path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let root = path
            .absolutize()
            .map_err(|e| RepositoryError::internal(path.display().to_string(), e))?
            .to_path_buf();

        Ok(Self {
            root,
            keep_in_memory: false,
            memory: DashMap::new(),
        })
    }

    pub fn keep_in_memory(mut self, keep: bool) -> Self {
        self.keep_in_memory = keep;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Candidate paths for a key, rejecting keys that leave the root
    fn candidates(&self, key: &str) -> RepositoryResult<Vec<PathBuf>> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.trim().is_empty() || escapes {
            return Err(RepositoryError::InvalidKey(key.to_string()));
        }

        let path = self.root.join(relative);
        let mut candidates = vec![path.clone()];
        if path.extension().is_none() {
            candidates.push(path.with_extension(DEFAULT_EXTENSION));
        }
        Ok(candidates)
    }

    fn remember(&self, key: &str, document: &[u8]) {
        if self.keep_in_memory {
            self.memory.insert(key.to_string(), document.to_vec());
        }
    }

    fn remembered(&self, key: &str) -> Option<Vec<u8>> {
        self.memory.get(key).map(|document| document.clone())
    }
}

fn read_error(key: &str, error: std::io::Error) -> Option<RepositoryError> {
    match error.kind() {
        ErrorKind::NotFound => None,
        _ => Some(RepositoryError::internal(key, error)),
    }
}

#[async_trait]
impl DecisionLoader for FilesystemLoader {
    async fn load(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        if let Some(document) = self.remembered(key) {
            return Ok(document);
        }

        for path in self.candidates(key)? {
            match fs::read(&path).await {
                Ok(document) => {
                    tracing::debug!(key, path = %path.display(), "loaded decision document");
                    self.remember(key, &document);
                    return Ok(document);
                }
                Err(e) => {
                    if let Some(error) = read_error(key, e) {
                        return Err(error);
                    }
                }
            }
        }
        Err(RepositoryError::NotFound(key.to_string()))
    }
}

impl BlockingDecisionLoader for FilesystemLoader {
    fn load_blocking(&self, key: &str) -> RepositoryResult<Vec<u8>> {
        if let Some(document) = self.remembered(key) {
            return Ok(document);
        }

        for path in self.candidates(key)? {
            match std::fs::read(&path) {
                Ok(document) => {
                    tracing::debug!(key, path = %path.display(), "loaded decision document");
                    self.remember(key, &document);
                    return Ok(document);
                }
                Err(e) => {
                    if let Some(error) = read_error(key, e) {
                        return Err(error);
                    }
                }
            }
        }
        Err(RepositoryError::NotFound(key.to_string()))
    }
}
