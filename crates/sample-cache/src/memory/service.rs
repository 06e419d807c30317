//! Key-tracking cache service over a [`CacheProvider`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use tracing::{debug, error, warn};

use sample_core::config::CacheConfig;
use sample_core::error::AppError;
use sample_core::result::AppResult;
use sample_core::traits::cache::{CacheProvider, CacheService, EntryOptions, ensure_key};

use crate::keys::{mask, matches_pattern};

/// Cache service that tracks every key it writes so entries can be removed
/// by pattern. Provider failures are logged and absorbed.
///
/// A key is tracked before its value reaches the provider and stays tracked
/// until it is removed, so pattern removal never misses a written entry.
/// Keys the provider has already expired stay tracked as well, which makes
/// [`CacheService::key_count`] an upper bound.
#[derive(Debug)]
pub struct MemoryCacheService {
    provider: Arc<dyn CacheProvider>,
    keys: DashSet<String>,
    default_expiration: Duration,
    sliding_expiration: Duration,
}

impl MemoryCacheService {
    /// Create a service over `provider` with the expirations from `config`.
    pub fn new(provider: Arc<dyn CacheProvider>, config: &CacheConfig) -> Self {
        Self {
            provider,
            keys: DashSet::new(),
            default_expiration: config.default_expiration(),
            sliding_expiration: config.sliding_expiration(),
        }
    }

    /// Untrack first: a write racing the provider removal re-tracks its key
    /// after it lands, so an entry is never left in the provider untracked.
    async fn evict(&self, key: &str) {
        self.keys.remove(key);
        if let Err(e) = self.provider.remove(key).await {
            error!(key = %mask(key), error = %e, "Error removing from cache");
        }
    }
}

#[async_trait]
impl CacheService for MemoryCacheService {
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        ensure_key(key)?;

        match self.provider.get(key).await {
            Ok(Some(json)) => {
                debug!(key = %mask(key), "Cache hit");
                Ok(Some(json))
            }
            Ok(None) => {
                debug!(key = %mask(key), "Cache miss");
                Ok(None)
            }
            Err(e) => {
                error!(key = %mask(key), error = %e, "Error retrieving from cache");
                Ok(None)
            }
        }
    }

    async fn set_raw(&self, key: &str, json: String, expiration: Option<Duration>) -> AppResult<()> {
        ensure_key(key)?;
        if json.trim() == "null" {
            return Err(AppError::validation("Cache value must not be null"));
        }

        let absolute = expiration.unwrap_or(self.default_expiration);
        let options = EntryOptions::new(absolute, self.sliding_expiration);
        self.keys.insert(key.to_string());
        match self.provider.set(key, json, options).await {
            Ok(()) => {
                // A pattern removal may have run while the write was in flight.
                self.keys.insert(key.to_string());
                debug!(key = %mask(key), expiration = ?absolute, "Cache set");
            }
            Err(e) => error!(key = %mask(key), error = %e, "Error setting cache"),
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        ensure_key(key)?;
        self.evict(key).await;
        debug!(key = %mask(key), "Cache removed");
        Ok(())
    }

    async fn remove_by_pattern(&self, pattern: &str) -> AppResult<u64> {
        if pattern.trim().is_empty() {
            return Err(AppError::validation("Cache pattern must not be empty"));
        }

        let matched: Vec<String> = self
            .keys
            .iter()
            .filter(|key| matches_pattern(key.as_str(), pattern))
            .map(|key| key.key().clone())
            .collect();

        for key in &matched {
            self.evict(key).await;
        }

        debug!(pattern, count = matched.len(), "Pattern-based cache removal completed");
        Ok(matched.len() as u64)
    }

    async fn clear_all(&self) -> AppResult<()> {
        let count = self.keys.len();
        if let Err(e) = self.provider.flush().await {
            error!(error = %e, "Error flushing cache");
        }
        self.keys.clear();

        warn!(count, "All cache entries cleared");
        Ok(())
    }

    fn key_count(&self) -> usize {
        self.keys.len()
    }

    async fn health_check(&self) -> bool {
        match self.provider.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                error!(error = %e, "Cache health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_core::error::ErrorKind;
    use serde::{Deserialize, Serialize};
    use tokio::sync::Notify;
    use tokio::task::JoinSet;

    use crate::memory::MemoryCacheProvider;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: u32,
        name: String,
    }

    /// Provider whose every operation fails.
    #[derive(Debug)]
    struct BrokenProvider;

    #[async_trait]
    impl CacheProvider for BrokenProvider {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("connection refused"))
        }
        async fn set(&self, _key: &str, _value: String, _options: EntryOptions) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn remove(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Err(AppError::cache("connection refused"))
        }
        async fn flush(&self) -> AppResult<()> {
            Err(AppError::cache("connection refused"))
        }
    }

    fn service() -> MemoryCacheService {
        MemoryCacheService::new(Arc::new(MemoryCacheProvider::new(100)), &CacheConfig::default())
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = service();
        let widget = Widget {
            id: 1,
            name: "Test".into(),
        };
        cache.set("widget_1", &widget, None).await.unwrap();
        let found: Option<Widget> = cache.get("widget_1").await.unwrap();
        assert_eq!(found, Some(widget));
        assert_eq!(cache.key_count(), 1);
    }

    #[tokio::test]
    async fn test_miss_returns_none() {
        let cache = service();
        let found: Option<String> = cache.get("missing").await.unwrap();
        assert!(found.is_none());
        assert_eq!(cache.key_count(), 0);
    }

    #[tokio::test]
    async fn test_contract_violations() {
        let cache = service();
        let err = cache.set("  ", &1_u32, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        let err = cache.set("k", &None::<u32>, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(cache.get::<u32>("").await.is_err());
        assert!(cache.remove("").await.is_err());
        assert!(cache.remove_by_pattern(" ").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let cache = service();
        cache.set("k", &"v", None).await.unwrap();
        cache.remove("k").await.unwrap();
        cache.remove("k").await.unwrap();
        assert_eq!(cache.get::<String>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_by_pattern() {
        let cache = service();
        cache.set("repo_Sample_1", &"value1", None).await.unwrap();
        cache.set("repo_Sample_2", &"value2", None).await.unwrap();
        cache.set("other_key", &"value3", None).await.unwrap();

        let removed = cache.remove_by_pattern("repo_sample_*").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(cache.get::<String>("repo_Sample_1").await.unwrap(), None);
        assert_eq!(cache.get::<String>("repo_Sample_2").await.unwrap(), None);
        assert_eq!(
            cache.get::<String>("other_key").await.unwrap(),
            Some("value3".to_string())
        );

        assert_eq!(cache.remove_by_pattern("*").await.unwrap(), 1);
        assert_eq!(cache.key_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let cache = service();
        cache.set("a", &1_u32, None).await.unwrap();
        cache.set("b", &2_u32, Some(Duration::from_secs(5))).await.unwrap();
        cache.clear_all().await.unwrap();
        assert_eq!(cache.key_count(), 0);
        assert_eq!(cache.get::<u32>("a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_undecodable_value_is_a_miss() {
        let cache = service();
        cache.set("k", &"text", None).await.unwrap();
        assert_eq!(cache.get::<u32>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_provider_failures_are_absorbed() {
        let cache = MemoryCacheService::new(Arc::new(BrokenProvider), &CacheConfig::default());
        cache.set("k", &1_u32, None).await.unwrap();
        assert_eq!(cache.get::<u32>("k").await.unwrap(), None);
        cache.remove("k").await.unwrap();
        cache.clear_all().await.unwrap();
        assert!(!cache.health_check().await);
        assert_eq!(cache.key_count(), 0);
    }

    /// Provider whose reads pause after fetching until released.
    #[derive(Debug)]
    struct StallingProvider {
        inner: MemoryCacheProvider,
        reached: Notify,
        release: Notify,
    }

    impl StallingProvider {
        fn new() -> Self {
            Self {
                inner: MemoryCacheProvider::new(100),
                reached: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl CacheProvider for StallingProvider {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            let value = self.inner.get(key).await?;
            self.reached.notify_one();
            self.release.notified().await;
            Ok(value)
        }
        async fn set(&self, key: &str, value: String, options: EntryOptions) -> AppResult<()> {
            self.inner.set(key, value, options).await
        }
        async fn remove(&self, key: &str) -> AppResult<()> {
            self.inner.remove(key).await
        }
        async fn health_check(&self) -> AppResult<bool> {
            self.inner.health_check().await
        }
        async fn flush(&self) -> AppResult<()> {
            self.inner.flush().await
        }
    }

    #[tokio::test]
    async fn test_stale_miss_does_not_untrack_concurrent_write() {
        let provider = Arc::new(StallingProvider::new());
        let cache = Arc::new(MemoryCacheService::new(provider.clone(), &CacheConfig::default()));

        let reader = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get_raw("repo_Sample_1").await })
        };
        provider.reached.notified().await;
        cache.set_raw("repo_Sample_1", "1".to_string(), None).await.unwrap();
        provider.release.notify_one();
        assert_eq!(reader.await.unwrap().unwrap(), None);

        assert_eq!(cache.remove_by_pattern("repo_Sample_*").await.unwrap(), 1);
        assert_eq!(provider.inner.get("repo_Sample_1").await.unwrap(), None);
        assert_eq!(cache.key_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_are_all_tracked() {
        let cache = Arc::new(service());

        let mut writers = JoinSet::new();
        for task in 0..8 {
            let cache = Arc::clone(&cache);
            writers.spawn(async move {
                for i in 0..25 {
                    cache.set(&format!("repo_Sample_{task}_{i}"), &i, None).await.unwrap();
                }
                cache.set(&format!("other_{task}"), &task, None).await.unwrap();
            });
        }
        while let Some(joined) = writers.join_next().await {
            joined.unwrap();
        }
        assert_eq!(cache.key_count(), 8 * 25 + 8);

        assert_eq!(cache.remove_by_pattern("repo_Sample_*").await.unwrap(), 200);
        assert_eq!(cache.key_count(), 8);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pattern_removal_racing_writers_leaves_nothing_behind() {
        let cache = Arc::new(service());

        let mut tasks = JoinSet::new();
        for task in 0..4 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move {
                for i in 0..25 {
                    cache.set(&format!("repo_Sample_{task}_{i}"), &i, None).await.unwrap();
                }
            });
        }
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            tasks.spawn(async move {
                for _ in 0..10 {
                    cache.remove_by_pattern("repo_Sample_*").await.unwrap();
                    tokio::task::yield_now().await;
                }
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        // Whatever survived the race is still reachable by pattern.
        cache.remove_by_pattern("repo_Sample_*").await.unwrap();
        assert_eq!(cache.key_count(), 0);
        for task in 0..4 {
            for i in 0..25 {
                let key = format!("repo_Sample_{task}_{i}");
                assert_eq!(cache.get::<i32>(&key).await.unwrap(), None, "{key}");
            }
        }
    }
}
