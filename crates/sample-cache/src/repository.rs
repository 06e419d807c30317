//! Cache-aside decorator for repositories.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use sample_core::config::CacheConfig;
use sample_core::result::AppResult;
use sample_core::traits::cache::CacheService;
use sample_core::traits::entity::Entity;
use sample_core::traits::repository::{ReadOnlyRepository, Repository};
use sample_core::types::expression::Predicate;
use sample_core::types::pagination::{PaginationQuery, PaginationResult};

use crate::keys::{repository_key, repository_pattern};

/// Repository decorator caching single-entity reads by id.
///
/// Lists and predicate queries always go to the inner repository. Every
/// mutation removes or refreshes the entity's key before returning, and a
/// key is only written after the inner repository has confirmed the change,
/// so dropping a call midway never leaves a stale entry behind.
pub struct CachedRepository<T, R, C> {
    inner: Arc<R>,
    cache: Arc<C>,
    enabled: bool,
    expiration: Duration,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity, R, C> CachedRepository<T, R, C> {
    /// Wrap `inner`. Fails when `config` is out of range.
    pub fn new(inner: Arc<R>, cache: Arc<C>, config: &CacheConfig) -> AppResult<Self> {
        config.ensure_valid()?;
        debug!(
            entity = T::NAME,
            enabled = config.is_enabled,
            expiration_minutes = config.repository_expiration_minutes,
            "Cached repository created"
        );
        Ok(Self {
            inner,
            cache,
            enabled: config.is_enabled,
            expiration: config.repository_expiration(),
            _entity: PhantomData,
        })
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &Arc<R> {
        &self.inner
    }
}

impl<T, R, C> Clone for CachedRepository<T, R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cache: Arc::clone(&self.cache),
            enabled: self.enabled,
            expiration: self.expiration,
            _entity: PhantomData,
        }
    }
}

impl<T: Entity, R: std::fmt::Debug, C: std::fmt::Debug> std::fmt::Debug for CachedRepository<T, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRepository")
            .field("entity", &T::NAME)
            .field("enabled", &self.enabled)
            .field("expiration", &self.expiration)
            .field("inner", &self.inner)
            .finish()
    }
}

#[async_trait]
impl<T, R, C> ReadOnlyRepository<T> for CachedRepository<T, R, C>
where
    T: Entity,
    R: ReadOnlyRepository<T>,
    C: CacheService,
{
    async fn get_by_id(&self, id: Uuid, includes: &[&str]) -> AppResult<T> {
        // Entries hold the bare entity; eager-loaded graphs are never cached.
        if !self.enabled || !includes.is_empty() {
            return self.inner.get_by_id(id, includes).await;
        }

        let key = repository_key::<T>(id);
        if let Some(cached) = self.cache.get::<T>(&key).await? {
            debug!(entity = T::NAME, %id, "Cache hit");
            return Ok(cached);
        }

        debug!(entity = T::NAME, %id, "Cache miss");
        let entity = self.inner.get_by_id(id, includes).await?;
        self.cache.set(&key, &entity, Some(self.expiration)).await?;
        Ok(entity)
    }

    async fn get_by_parameters(&self, predicate: &Predicate<T>, includes: &[&str]) -> AppResult<T> {
        self.inner.get_by_parameters(predicate, includes).await
    }

    async fn get_all(&self, query: &PaginationQuery, includes: &[&str]) -> AppResult<PaginationResult<T>> {
        self.inner.get_all(query, includes).await
    }

    async fn get_all_by_parameters_paginated(
        &self,
        query: &PaginationQuery,
        predicate: &Predicate<T>,
        includes: &[&str],
    ) -> AppResult<PaginationResult<T>> {
        self.inner
            .get_all_by_parameters_paginated(query, predicate, includes)
            .await
    }

    async fn get_all_by_parameters(&self, predicate: &Predicate<T>, includes: &[&str]) -> AppResult<Vec<T>> {
        self.inner.get_all_by_parameters(predicate, includes).await
    }

    async fn count(&self, predicate: &Predicate<T>) -> AppResult<u64> {
        self.inner.count(predicate).await
    }
}

#[async_trait]
impl<T, R, C> Repository<T> for CachedRepository<T, R, C>
where
    T: Entity,
    R: Repository<T>,
    C: CacheService,
{
    async fn add(&self, entity: T) -> AppResult<T> {
        let added = self.inner.add(entity).await?;
        if self.enabled {
            let key = repository_key::<T>(added.id());
            self.cache.set(&key, &added, Some(self.expiration)).await?;
            debug!(entity = T::NAME, id = %added.id(), "Added and cached");
        }
        Ok(added)
    }

    async fn update(&self, entity: T) -> AppResult<T> {
        if !self.enabled {
            return self.inner.update(entity).await;
        }

        let key = repository_key::<T>(entity.id());
        self.cache.remove(&key).await?;
        let updated = self.inner.update(entity).await?;
        self.cache.set(&key, &updated, Some(self.expiration)).await?;

        debug!(entity = T::NAME, id = %updated.id(), "Updated and refreshed cache");
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<T> {
        if !self.enabled {
            return self.inner.delete(id).await;
        }

        let key = repository_key::<T>(id);
        self.cache.remove(&key).await?;
        let deleted = self.inner.delete(id).await?;
        // A concurrent miss may have repopulated the key meanwhile.
        self.cache.remove(&key).await?;

        debug!(entity = T::NAME, %id, "Soft deleted and invalidated cache");
        Ok(deleted)
    }

    async fn delete_hard(&self, predicate: &Predicate<T>) -> AppResult<u64> {
        let removed = self.inner.delete_hard(predicate).await?;
        if self.enabled {
            let evicted = self.cache.remove_by_pattern(&repository_pattern::<T>()).await?;
            debug!(entity = T::NAME, removed, evicted, "Hard deleted and invalidated all entries");
        }
        Ok(removed)
    }
}
