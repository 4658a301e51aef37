//! Keyed result cache
//!
//! Each key maps to a cell that is filled exactly once. Concurrent callers
//! asking for the same key while it is being computed wait on the same cell
//! instead of starting a second computation.
//!
//! Entries live for the lifetime of the cache. Nothing expires on its own;
//! callers drop entries explicitly with [`ResultCache::invalidate`] or
//! [`ResultCache::clear`].

use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// How entries leave the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Entries are kept until explicitly invalidated or the process exits
    #[default]
    Never,
}

#[derive(Debug)]
pub struct ResultCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Arc<OnceCell<V>>>,
    policy: EvictionPolicy,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_policy(EvictionPolicy::default())
    }

    pub fn with_policy(policy: EvictionPolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// Return the cached value for `key`, computing it on first use
    ///
    /// `compute` runs at most once per key. If the computing caller is
    /// cancelled before finishing, the next caller takes over.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        // Clone the cell out so the map shard is not locked across the await
        let cell = {
            let entry = self
                .entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()));
            Arc::clone(entry.value())
        };

        cell.get_or_init(compute).await.clone()
    }

    /// Cached value for `key`, if it has been computed
    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .get(key)
            .and_then(|entry| entry.value().get().cloned())
    }

    /// Drop the entry for `key`; returns whether anything was removed
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of computed entries
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for ResultCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_computes_once_per_key() {
        let cache: ResultCache<String, usize> = ResultCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute("IL2RA".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    42
                })
                .await;
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"IL2RA".to_string()), Some(42));
    }

    #[tokio::test]
    async fn test_distinct_keys_compute_separately() {
        let cache: ResultCache<(String, String), String> = ResultCache::new();

        let a = cache
            .get_or_compute(("GSE1133".into(), "3559".into()), || async { "a".to_string() })
            .await;
        let b = cache
            .get_or_compute(("BDS_00001".into(), "3559".into()), || async { "b".to_string() })
            .await;

        assert_eq!(a, "a");
        assert_eq!(b, "b");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_computation() {
        let cache: Arc<ResultCache<String, usize>> = Arc::new(ResultCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_compute("IL2RA".to_string(), || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(50)).await;
                            7
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let cache: ResultCache<String, usize> = ResultCache::new();
        let key = "IL2RA".to_string();

        cache.get_or_compute(key.clone(), || async { 1 }).await;
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        assert!(cache.get(&key).is_none());

        let value = cache.get_or_compute(key.clone(), || async { 2 }).await;
        assert_eq!(value, 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_policy_never_evicts() {
        let cache: ResultCache<String, usize> = ResultCache::default();
        assert_eq!(cache.policy(), EvictionPolicy::Never);
    }
}
