//! Cache manager that builds the configured cache service.

use std::sync::Arc;

use tracing::info;

use sample_core::config::CacheConfig;
use sample_core::result::AppResult;
use sample_core::traits::cache::CacheProvider;

use crate::memory::{MemoryCacheProvider, MemoryCacheService};

/// Owns the cache service and the configuration it was built from.
///
/// The service is created once in the composition root and shared through
/// `Arc`; its key tracker is therefore per manager, never global.
#[derive(Debug, Clone)]
pub struct CacheManager {
    service: Arc<MemoryCacheService>,
    config: CacheConfig,
}

impl CacheManager {
    /// Create a cache manager backed by the moka provider.
    pub fn new(config: &CacheConfig) -> AppResult<Self> {
        config.ensure_valid()?;
        info!(
            max_capacity = config.max_capacity,
            default_expiration_minutes = config.default_expiration_minutes,
            sliding_expiration_minutes = config.sliding_expiration_minutes,
            enabled = config.is_enabled,
            "Initializing in-memory cache provider"
        );
        let provider = Arc::new(MemoryCacheProvider::new(config.max_capacity));
        Self::from_provider(provider, config)
    }

    /// Create a cache manager over an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CacheProvider>, config: &CacheConfig) -> AppResult<Self> {
        config.ensure_valid()?;
        Ok(Self {
            service: Arc::new(MemoryCacheService::new(provider, config)),
            config: config.clone(),
        })
    }

    /// The shared cache service.
    pub fn service(&self) -> Arc<MemoryCacheService> {
        Arc::clone(&self.service)
    }

    /// The configuration the service was built from.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sample_core::error::ErrorKind;
    use sample_core::traits::cache::CacheService;

    #[tokio::test]
    async fn test_builds_working_service() {
        let manager = CacheManager::new(&CacheConfig::default()).unwrap();
        let service = manager.service();
        service.set("k", &42_u32, None).await.unwrap();
        assert_eq!(service.get::<u32>("k").await.unwrap(), Some(42));
        assert!(service.health_check().await);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = CacheConfig {
            max_capacity: 0,
            ..CacheConfig::default()
        };
        let err = CacheManager::new(&config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
