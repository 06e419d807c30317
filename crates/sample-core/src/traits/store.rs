//! Persistence provider abstraction consumed by the base repository.

use async_trait::async_trait;

use crate::error::AppError;
use crate::result::AppResult;
use crate::traits::entity::Entity;
use crate::types::expression::{Predicate, SortKey};
use crate::types::sorting::SortDirection;

/// A query handed to an [`EntityStore`]. The store applies it verbatim;
/// soft-delete filtering is the caller's job.
#[derive(Debug, Clone)]
pub struct StoreQuery<T> {
    /// Row filter.
    pub filter: Predicate<T>,
    /// Ordering. `None` means insertion order.
    pub sort: Option<(SortKey<T>, SortDirection)>,
    /// `(offset, limit)` window.
    pub window: Option<(u64, u64)>,
    /// Validated relation names to eager-load.
    pub includes: Vec<&'static str>,
}

impl<T: Entity> StoreQuery<T> {
    /// Query for every row matching `filter`.
    pub fn new(filter: Predicate<T>) -> Self {
        Self {
            filter,
            sort: None,
            window: None,
            includes: Vec::new(),
        }
    }

    /// Order by `key`.
    pub fn with_sort(mut self, key: SortKey<T>, direction: SortDirection) -> Self {
        self.sort = Some((key, direction));
        self
    }

    /// Restrict to `limit` rows after skipping `offset`.
    pub fn with_window(mut self, window: Option<(u64, u64)>) -> Self {
        self.window = window;
        self
    }

    /// Request eager loading of `includes`. Fails on undeclared relations.
    pub fn with_includes(mut self, includes: &[&str]) -> AppResult<Self> {
        self.includes = validate_includes::<T>(includes)?;
        Ok(self)
    }
}

/// Resolve relation names against `T::RELATIONS`.
pub fn validate_includes<T: Entity>(includes: &[&str]) -> AppResult<Vec<&'static str>> {
    includes
        .iter()
        .map(|name| {
            T::RELATIONS
                .iter()
                .copied()
                .find(|r| r == name)
                .ok_or_else(|| {
                    AppError::validation(format!("{} has no relation '{name}'", T::NAME))
                })
        })
        .collect()
}

/// Storage for one entity type.
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync + std::fmt::Debug + 'static {
    /// Rows matching the query.
    async fn find(&self, query: &StoreQuery<T>) -> AppResult<Vec<T>>;

    /// Number of rows matching `filter`.
    async fn count(&self, filter: &Predicate<T>) -> AppResult<u64>;

    /// Insert a new row.
    async fn insert(&self, entity: &T) -> AppResult<()>;

    /// Overwrite the row with `entity.id()`. Fails with `NotFound` when absent.
    async fn save(&self, entity: &T) -> AppResult<()>;

    /// Physically delete every row matching `filter`. Returns the number removed.
    async fn delete_where(&self, filter: &Predicate<T>) -> AppResult<u64>;
}
