//! CLI command definitions, dispatch and stack wiring.

pub mod health;
pub mod sample;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::output::OutputFormat;
use sample_cache::{CacheManager, CachedRepository};
use sample_cache::memory::MemoryCacheService;
use sample_core::config::AppConfig;
use sample_core::error::AppError;
use sample_database::migration::run_migrations;
use sample_database::{BaseRepository, DatabasePool, SqliteStore};
use sample_entity::sample::Sample;

/// Repository stack used by every command: cache decorator over the
/// soft-delete repository over SQLite.
pub type SampleRepository =
    CachedRepository<Sample, BaseRepository<Sample, SqliteStore<Sample>>, MemoryCacheService>;

/// Clean Sample: soft-delete repository with a cache-aside decorator
#[derive(Debug, Parser)]
#[command(name = "sample", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}.toml`
    #[arg(short, long, env = "SAMPLE_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a sample
    Create(sample::CreateArgs),
    /// Show a sample by id
    Get(sample::GetArgs),
    /// List samples
    List(sample::ListArgs),
    /// Update a sample
    Update(sample::UpdateArgs),
    /// Soft-delete a sample
    Delete(sample::GetArgs),
    /// Permanently remove samples
    Purge(sample::PurgeArgs),
    /// Check database and cache connectivity
    Health,
}

/// Everything a command needs, built once per invocation.
#[derive(Debug)]
pub struct Context {
    /// The decorated repository.
    pub repository: SampleRepository,
    /// Database pool, kept for health checks and shutdown.
    pub db: DatabasePool,
    /// Cache manager owning the shared cache service.
    pub cache: CacheManager,
}

impl Context {
    /// Wire config → pool → migrations → store → repository → cache decorator.
    pub async fn build(config: &AppConfig) -> Result<Self, AppError> {
        let db = DatabasePool::connect(&config.database).await?;
        run_migrations(db.pool()).await?;

        let cache = CacheManager::new(&config.cache)?;
        let store = Arc::new(SqliteStore::<Sample>::new(db.pool().clone()));
        let base = Arc::new(BaseRepository::new(store));
        let repository = CachedRepository::new(base, cache.service(), &config.cache)?;

        info!(cache_enabled = config.cache.is_enabled, "Repository stack ready");
        Ok(Self {
            repository,
            db,
            cache,
        })
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let ctx = Context::build(config).await?;
        let result = match &self.command {
            Commands::Create(args) => sample::create(&ctx, args, self.format).await,
            Commands::Get(args) => sample::get(&ctx, args, self.format).await,
            Commands::List(args) => sample::list(&ctx, args, self.format).await,
            Commands::Update(args) => sample::update(&ctx, args, self.format).await,
            Commands::Delete(args) => sample::delete(&ctx, args, self.format).await,
            Commands::Purge(args) => sample::purge(&ctx, args).await,
            Commands::Health => health::execute(&ctx).await,
        };
        ctx.db.close().await;
        result
    }
}
