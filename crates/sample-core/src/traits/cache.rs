//! Cache traits: a raw storage backend and the key-tracking service built on it.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;
use crate::result::AppResult;

/// Expiration policy for a single cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryOptions {
    /// Maximum lifetime measured from insertion.
    pub absolute: Duration,
    /// Idle lifetime, reset on every read. Never extends past `absolute`.
    pub sliding: Option<Duration>,
}

impl EntryOptions {
    /// Entry with both an absolute and a sliding expiration.
    pub fn new(absolute: Duration, sliding: Duration) -> Self {
        Self {
            absolute,
            sliding: Some(sliding),
        }
    }
}

/// Trait for cache storage backends.
///
/// All values are serialized as strings (JSON). The provider is responsible
/// for expiration; it knows nothing about key tracking or patterns.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store a value with the given expiration policy.
    async fn set(&self, key: &str, value: String, options: EntryOptions) -> AppResult<()>;

    /// Delete a key. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Check that the backend is usable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Drop every entry.
    async fn flush(&self) -> AppResult<()>;
}

/// Application-facing cache with key tracking and pattern removal.
///
/// Backend failures are absorbed: reads degrade to a miss and writes to a
/// no-op. Only caller contract violations surface as errors: a blank key or
/// pattern, or a null value.
#[async_trait]
pub trait CacheService: Send + Sync + std::fmt::Debug + 'static {
    /// Raw JSON value for `key`, or `None` on miss or backend failure.
    async fn get_raw(&self, key: &str) -> AppResult<Option<String>>;

    /// Store raw JSON under `key`. `expiration` overrides the default
    /// absolute lifetime.
    async fn set_raw(&self, key: &str, json: String, expiration: Option<Duration>) -> AppResult<()>;

    /// Remove `key`. Idempotent.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Remove every tracked key matching a `*` glob. Returns how many were removed.
    async fn remove_by_pattern(&self, pattern: &str) -> AppResult<u64>;

    /// Remove every tracked key.
    async fn clear_all(&self) -> AppResult<()>;

    /// Number of tracked keys. Best-effort: expired entries are pruned lazily.
    fn key_count(&self) -> usize;

    /// Whether the backend is usable.
    async fn health_check(&self) -> bool;

    /// Get a typed value by deserializing from JSON. Undecodable values are
    /// reported as a miss.
    async fn get<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        let Some(json) = self.get_raw(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to deserialize cached value");
                Ok(None)
            }
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        expiration: Option<Duration>,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        if json == "null" {
            return Err(AppError::validation("Cache value must not be null"));
        }
        self.set_raw(key, json, expiration).await
    }
}

/// Reject blank cache keys.
pub fn ensure_key(key: &str) -> AppResult<()> {
    if key.trim().is_empty() {
        return Err(AppError::validation("Cache key must not be empty"));
    }
    Ok(())
}
