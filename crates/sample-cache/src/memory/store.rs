//! In-memory cache provider using the moka crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use sample_core::result::AppResult;
use sample_core::traits::cache::{CacheProvider, EntryOptions};

/// A cached JSON value with its expiration policy.
#[derive(Debug, Clone)]
struct CachedValue {
    json: String,
    options: EntryOptions,
}

/// Per-entry expiry combining an absolute deadline with a sliding window.
///
/// moka passes `last_modified_at` on every read, which is the insertion
/// time for entries that are never overwritten in place.
#[derive(Debug, Clone, Copy, Default)]
struct AbsoluteAndSliding;

impl AbsoluteAndSliding {
    fn initial(options: &EntryOptions) -> Duration {
        match options.sliding {
            Some(sliding) => sliding.min(options.absolute),
            None => options.absolute,
        }
    }
}

impl Expiry<String, CachedValue> for AbsoluteAndSliding {
    fn expire_after_create(&self, _key: &String, value: &CachedValue, _created_at: Instant) -> Option<Duration> {
        Some(Self::initial(&value.options))
    }

    fn expire_after_read(
        &self,
        _key: &String,
        value: &CachedValue,
        read_at: Instant,
        duration_until_expiry: Option<Duration>,
        last_modified_at: Instant,
    ) -> Option<Duration> {
        let Some(sliding) = value.options.sliding else {
            return duration_until_expiry;
        };
        let age = read_at.saturating_duration_since(last_modified_at);
        let absolute_left = value.options.absolute.saturating_sub(age);
        Some(sliding.min(absolute_left))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Self::initial(&value.options))
    }
}

/// In-memory cache provider using moka.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, CachedValue>,
}

impl MemoryCacheProvider {
    /// Create a provider holding at most `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(AbsoluteAndSliding)
            .build();

        Self { cache }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|value| value.json))
    }

    async fn set(&self, key: &str, value: String, options: EntryOptions) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), CachedValue { json: value, options })
            .await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(1000)
    }

    fn minutes(absolute: u64, sliding: u64) -> EntryOptions {
        EntryOptions::new(
            Duration::from_secs(absolute * 60),
            Duration::from_secs(sliding * 60),
        )
    }

    #[tokio::test]
    async fn test_set_get() {
        let provider = make_provider();
        provider
            .set("key1", "\"value1\"".to_string(), minutes(60, 5))
            .await
            .unwrap();
        let val = provider.get("key1").await.unwrap();
        assert_eq!(val, Some("\"value1\"".to_string()));
    }

    #[tokio::test]
    async fn test_remove() {
        let provider = make_provider();
        provider
            .set("key2", "2".to_string(), minutes(60, 5))
            .await
            .unwrap();
        provider.remove("key2").await.unwrap();
        assert_eq!(provider.get("key2").await.unwrap(), None);
        provider.remove("key2").await.unwrap();
    }

    #[tokio::test]
    async fn test_absolute_expiry_caps_sliding() {
        let provider = make_provider();
        let options = EntryOptions::new(Duration::from_millis(150), Duration::from_secs(60));
        provider.set("short", "1".to_string(), options).await.unwrap();
        assert!(provider.get("short").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(provider.get("short").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sliding_expiry_resets_on_read() {
        let provider = make_provider();
        let options = EntryOptions::new(Duration::from_secs(60), Duration::from_millis(300));
        provider.set("idle", "1".to_string(), options).await.unwrap();

        for _ in 0..4 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(provider.get("idle").await.unwrap().is_some());
        }

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(provider.get("idle").await.unwrap(), None);
    }

    #[test]
    fn test_expiry_policy() {
        let value = CachedValue {
            json: "1".into(),
            options: EntryOptions::new(Duration::from_secs(10), Duration::from_secs(4)),
        };
        let now = Instant::now();
        let policy = AbsoluteAndSliding;
        assert_eq!(
            policy.expire_after_create(&"k".to_string(), &value, now),
            Some(Duration::from_secs(4))
        );
        let later = now + Duration::from_secs(8);
        assert_eq!(
            policy.expire_after_read(&"k".to_string(), &value, later, None, now),
            Some(Duration::from_secs(2))
        );
    }

    #[tokio::test]
    async fn test_flush_and_health_check() {
        let provider = make_provider();
        provider.set("a", "1".to_string(), minutes(1, 1)).await.unwrap();
        provider.flush().await.unwrap();
        assert_eq!(provider.get("a").await.unwrap(), None);
        assert!(provider.health_check().await.unwrap());
    }
}
