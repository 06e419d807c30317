//! In-process entity store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use sample_core::error::AppError;
use sample_core::result::AppResult;
use sample_core::traits::entity::Entity;
use sample_core::traits::store::{EntityStore, StoreQuery};
use sample_core::types::expression::Predicate;
use sample_core::types::sorting::SortDirection;

/// Entity store holding rows in insertion order behind a lock.
///
/// Predicates are evaluated in memory, so results match [`SqliteStore`]
/// for the same query.
///
/// [`SqliteStore`]: super::SqliteStore
#[derive(Debug)]
pub struct MemoryStore<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore<T> {
    async fn find(&self, query: &StoreQuery<T>) -> AppResult<Vec<T>> {
        let rows = self.rows.read().await;
        let mut matched: Vec<T> = rows
            .iter()
            .filter(|row| query.filter.evaluate(row))
            .cloned()
            .collect();
        drop(rows);

        if let Some((key, direction)) = &query.sort {
            match direction {
                SortDirection::Asc => matched.sort_by(|a, b| key.compare(a, b)),
                SortDirection::Desc => matched.sort_by(|a, b| key.compare(b, a)),
            }
        }

        Ok(match query.window {
            Some((offset, limit)) => matched
                .into_iter()
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => matched,
        })
    }

    async fn count(&self, filter: &Predicate<T>) -> AppResult<u64> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|row| filter.evaluate(row)).count() as u64)
    }

    async fn insert(&self, entity: &T) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == entity.id()) {
            return Err(AppError::database(format!(
                "{} {} already exists",
                T::NAME,
                entity.id()
            )));
        }
        rows.push(entity.clone());
        Ok(())
    }

    async fn save(&self, entity: &T) -> AppResult<()> {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id() == entity.id()) {
            Some(row) => {
                *row = entity.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!(
                "{} {} not found",
                T::NAME,
                entity.id()
            ))),
        }
    }

    async fn delete_where(&self, filter: &Predicate<T>) -> AppResult<u64> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !filter.evaluate(row));
        Ok((before - rows.len()) as u64)
    }
}
