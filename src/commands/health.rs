//! Connectivity check command.

use super::Context;
use crate::output;
use sample_core::error::AppError;
use sample_core::traits::cache::CacheService;

/// Report database and cache health. Fails when either is unhealthy.
pub async fn execute(ctx: &Context) -> Result<(), AppError> {
    let database = ctx.db.health_check().await.unwrap_or(false);
    let cache_service = ctx.cache.service();
    let cache = cache_service.health_check().await;

    output::print_kv("database", if database { "ok" } else { "unavailable" });
    output::print_kv("cache", if cache { "ok" } else { "unavailable" });
    output::print_kv("cache enabled", &ctx.cache.config().is_enabled.to_string());
    output::print_kv("tracked keys", &cache_service.key_count().to_string());

    if database && cache {
        output::print_success("All systems healthy");
        Ok(())
    } else {
        Err(AppError::internal("Health check failed"))
    }
}
