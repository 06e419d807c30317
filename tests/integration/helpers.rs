//! Shared test helpers for integration tests.

use std::sync::Arc;

use sample_cache::memory::MemoryCacheService;
use sample_cache::{CacheManager, CachedRepository};
use sample_core::config::{CacheConfig, DatabaseConfig};
use sample_database::migration::run_migrations;
use sample_database::{BaseRepository, DatabasePool, SqliteStore};
use sample_entity::sample::Sample;

/// Soft-delete repository over SQLite.
pub type SqliteRepository = BaseRepository<Sample, SqliteStore<Sample>>;

/// Test application context: the full repository stack on a private
/// in-memory database.
pub struct TestApp {
    /// Cache decorator, the entry point for most tests
    pub repository: CachedRepository<Sample, SqliteRepository, MemoryCacheService>,
    /// Undecorated repository sharing the same database
    pub base: Arc<SqliteRepository>,
    /// Cache manager backing the decorator
    pub cache: CacheManager,
    /// Database pool for direct queries
    pub db: DatabasePool,
}

impl TestApp {
    /// Create a new test application with the default cache settings
    pub async fn new() -> Self {
        Self::with_cache_config(CacheConfig::default()).await
    }

    /// Create a new test application with custom cache settings
    pub async fn with_cache_config(cache_config: CacheConfig) -> Self {
        let db = DatabasePool::connect(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to open test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let cache = CacheManager::new(&cache_config).expect("Failed to init cache");
        let store = Arc::new(SqliteStore::<Sample>::new(db.pool().clone()));
        let base = Arc::new(BaseRepository::new(store));
        let repository = CachedRepository::new(Arc::clone(&base), cache.service(), &cache_config)
            .expect("Failed to build cached repository");

        Self {
            repository,
            base,
            cache,
            db,
        }
    }

    /// Number of rows in the table, soft-deleted ones included
    pub async fn raw_row_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM samples")
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count rows")
    }
}
