//! Repository traits shared by the soft-delete repository and its cached decorator.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::traits::entity::Entity;
use crate::types::expression::Predicate;
use crate::types::pagination::{PaginationQuery, PaginationResult};

/// Read side of a repository. Every method only sees live rows.
///
/// `includes` names relations to eager-load; an empty slice loads none.
#[async_trait]
pub trait ReadOnlyRepository<T: Entity>: Send + Sync + std::fmt::Debug + 'static {
    /// Find a live entity by id.
    async fn get_by_id(&self, id: Uuid, includes: &[&str]) -> AppResult<T>;

    /// First live entity matching `predicate`.
    async fn get_by_parameters(&self, predicate: &Predicate<T>, includes: &[&str]) -> AppResult<T>;

    /// A page of live entities.
    async fn get_all(&self, query: &PaginationQuery, includes: &[&str]) -> AppResult<PaginationResult<T>>;

    /// A page of live entities matching `predicate`.
    async fn get_all_by_parameters_paginated(
        &self,
        query: &PaginationQuery,
        predicate: &Predicate<T>,
        includes: &[&str],
    ) -> AppResult<PaginationResult<T>>;

    /// Every live entity matching `predicate`.
    async fn get_all_by_parameters(&self, predicate: &Predicate<T>, includes: &[&str]) -> AppResult<Vec<T>>;

    /// Number of live entities matching `predicate`.
    async fn count(&self, predicate: &Predicate<T>) -> AppResult<u64>;
}

/// Read/write repository with soft-delete semantics.
#[async_trait]
pub trait Repository<T: Entity>: ReadOnlyRepository<T> {
    /// Persist a new entity and return it as stored.
    async fn add(&self, entity: T) -> AppResult<T>;

    /// Merge the non-null fields of `entity` into the stored row with the same id.
    async fn update(&self, entity: T) -> AppResult<T>;

    /// Soft-delete by id and return the deleted entity.
    async fn delete(&self, id: Uuid) -> AppResult<T>;

    /// Permanently remove every matching row, including soft-deleted ones.
    async fn delete_hard(&self, predicate: &Predicate<T>) -> AppResult<u64>;
}
