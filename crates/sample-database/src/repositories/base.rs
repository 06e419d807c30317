//! Soft-delete aware repository over any [`EntityStore`].

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use sample_core::error::AppError;
use sample_core::result::AppResult;
use sample_core::traits::entity::{Entity, ID};
use sample_core::traits::repository::{ReadOnlyRepository, Repository};
use sample_core::traits::store::{EntityStore, StoreQuery};
use sample_core::types::expression::{Predicate, SortKey};
use sample_core::types::pagination::{PaginationQuery, PaginationResult};
use sample_core::types::timestamp::now_unix;

/// Generic repository enforcing soft-delete semantics.
///
/// Every read is conjoined with the live-row predicate. Deletion stamps
/// `deleted_at`; only [`Repository::delete_hard`] removes rows.
pub struct BaseRepository<T, S> {
    store: Arc<S>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, S> BaseRepository<T, S> {
    /// Create a new repository on `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }
}

impl<T, S> Clone for BaseRepository<T, S> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.store))
    }
}

impl<T: Entity, S: std::fmt::Debug> std::fmt::Debug for BaseRepository<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseRepository")
            .field("entity", &T::NAME)
            .field("store", &self.store)
            .finish()
    }
}

impl<T: Entity, S: EntityStore<T>> BaseRepository<T, S> {
    fn live(predicate: &Predicate<T>) -> Predicate<T> {
        Predicate::live().and(predicate.clone())
    }

    fn by_id(id: Uuid) -> AppResult<Predicate<T>> {
        Predicate::equals(ID, id)
    }

    async fn first(&self, filter: Predicate<T>, includes: &[&str]) -> AppResult<Option<T>> {
        let query = StoreQuery::new(filter)
            .with_window(Some((0, 1)))
            .with_includes(includes)?;
        Ok(self.store.find(&query).await?.into_iter().next())
    }

    async fn find_live(&self, id: Uuid, includes: &[&str]) -> AppResult<T> {
        self.first(Self::live(&Self::by_id(id)?), includes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} {id} not found", T::NAME)))
    }
}

#[async_trait]
impl<T: Entity, S: EntityStore<T>> ReadOnlyRepository<T> for BaseRepository<T, S> {
    async fn get_by_id(&self, id: Uuid, includes: &[&str]) -> AppResult<T> {
        self.find_live(id, includes).await
    }

    async fn get_by_parameters(&self, predicate: &Predicate<T>, includes: &[&str]) -> AppResult<T> {
        self.first(Self::live(predicate), includes)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No {} matches the given parameters", T::NAME)))
    }

    async fn get_all(&self, query: &PaginationQuery, includes: &[&str]) -> AppResult<PaginationResult<T>> {
        self.get_all_by_parameters_paginated(query, &Predicate::always(), includes)
            .await
    }

    async fn get_all_by_parameters_paginated(
        &self,
        query: &PaginationQuery,
        predicate: &Predicate<T>,
        includes: &[&str],
    ) -> AppResult<PaginationResult<T>> {
        let query = query.normalized();
        let filter = Self::live(predicate);

        let mut store_query = StoreQuery::new(filter.clone())
            .with_window(query.window())
            .with_includes(includes)?;
        if let Some(sort) = &query.sort {
            store_query = store_query.with_sort(SortKey::new(&sort.field)?, sort.direction);
        }

        let total = self.store.count(&filter).await?;
        let items = self.store.find(&store_query).await?;

        debug!(
            entity = T::NAME,
            page = query.page,
            limit = query.limit,
            paginate = query.paginate,
            total,
            returned = items.len(),
            "Fetched page"
        );
        Ok(PaginationResult::new(items, &query, total))
    }

    async fn get_all_by_parameters(&self, predicate: &Predicate<T>, includes: &[&str]) -> AppResult<Vec<T>> {
        let query = StoreQuery::new(Self::live(predicate)).with_includes(includes)?;
        self.store.find(&query).await
    }

    async fn count(&self, predicate: &Predicate<T>) -> AppResult<u64> {
        self.store.count(&Self::live(predicate)).await
    }
}

#[async_trait]
impl<T: Entity, S: EntityStore<T>> Repository<T> for BaseRepository<T, S> {
    async fn add(&self, mut entity: T) -> AppResult<T> {
        if entity.id().is_nil() {
            entity.set_id(Uuid::new_v4());
        }
        if entity.created_at() == 0 {
            entity.set_created_at(now_unix());
        }
        entity.set_deleted_at(None);

        self.store.insert(&entity).await?;

        info!(entity = T::NAME, id = %entity.id(), "Entity created");
        Ok(entity)
    }

    async fn update(&self, entity: T) -> AppResult<T> {
        let mut stored = self.find_live(entity.id(), &[]).await?;
        let changed = stored.merge_from(&entity);
        stored.set_updated_at(Some(now_unix()));

        self.store.save(&stored).await?;

        info!(entity = T::NAME, id = %stored.id(), changed = ?changed, "Entity updated");
        Ok(stored)
    }

    async fn delete(&self, id: Uuid) -> AppResult<T> {
        let mut stored = self.find_live(id, &[]).await?;
        stored.set_deleted_at(Some(now_unix()));

        self.store.save(&stored).await?;

        info!(entity = T::NAME, id = %id, "Entity soft-deleted");
        Ok(stored)
    }

    async fn delete_hard(&self, predicate: &Predicate<T>) -> AppResult<u64> {
        let removed = self.store.delete_where(predicate).await?;

        info!(entity = T::NAME, removed, "Entities permanently deleted");
        Ok(removed)
    }
}
