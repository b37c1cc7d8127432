//! Compiled decision cache
//!
//! Entries are published once per key. Concurrent lookups of a key that is
//! not yet cached share a single initialisation; the others wait on its
//! result. A failed initialisation leaves the entry empty so the next lookup
//! retries it.

use dashmap::DashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from a published entry
    pub hits: u64,
    /// Lookups that found no published entry
    pub misses: u64,
    /// Initialisations that ran
    pub compilations: u64,
    /// Published entries
    pub size: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Keyed cache with coalesced initialisation
pub struct DecisionCache<V> {
    entries: DashMap<String, Arc<OnceCell<Arc<V>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    compilations: AtomicU64,
}

impl<V> Default for DecisionCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            compilations: AtomicU64::new(0),
        }
    }
}

impl<V> DecisionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Published value for `key`, without initialising it
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Published value for `key`, or the result of `init` published under it.
    /// Errors are returned to every waiting caller and not cached.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: &str, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // The map guard must be released before awaiting
        let cell = self.entries.entry(key.to_string()).or_default().clone();

        if let Some(value) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let value = cell
            .get_or_try_init(|| async {
                self.compilations.fetch_add(1, Ordering::Relaxed);
                let value = init().await?;
                tracing::info!(key, "decision published to cache");
                Ok(Arc::new(value))
            })
            .await?;
        Ok(value.clone())
    }

    /// Drop the entry for `key`; returns whether a published value was removed
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries
            .remove(key)
            .is_some_and(|(_, cell)| cell.initialized())
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of published entries
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compilations: self.compilations.load(Ordering::Relaxed),
            size: self.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_after_miss() {
        let cache: DecisionCache<String> = DecisionCache::new();

        let first = cache
            .get_or_try_init("a", || async { Ok::<_, String>("compiled".to_string()) })
            .await
            .unwrap();
        let second = cache
            .get_or_try_init("a", || async { Ok::<_, String>("recompiled".to_string()) })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                compilations: 1,
                size: 1
            }
        );
        assert_eq!(cache.stats().hit_rate(), 0.5);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache: DecisionCache<u32> = DecisionCache::new();

        let err = cache
            .get_or_try_init("k", || async { Err::<u32, _>("load failed") })
            .await
            .unwrap_err();
        assert_eq!(err, "load failed");
        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);

        let value = cache
            .get_or_try_init("k", || async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(*value, 7);
        assert_eq!(cache.stats().compilations, 2);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache: DecisionCache<u32> = DecisionCache::new();
        for key in ["a", "b"] {
            cache.get_or_try_init(key, || async { Ok::<_, ()>(1) }).await.unwrap();
        }

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
