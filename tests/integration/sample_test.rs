//! Integration tests for the cached sample repository over SQLite.

mod helpers;

use sample_cache::keys::repository_key;
use sample_core::config::CacheConfig;
use sample_core::error::ErrorKind;
use sample_core::traits::cache::CacheService;
use sample_core::traits::repository::{ReadOnlyRepository, Repository};
use sample_core::types::expression::{Predicate, build_equals};
use sample_core::types::pagination::PaginationQuery;
use sample_core::types::sorting::SortField;
use sample_entity::sample::{Sample, UpdateSample};

#[tokio::test]
async fn test_add_get_delete_lifecycle() {
    let app = helpers::TestApp::new().await;

    let created = app
        .repository
        .add(Sample::new("bracket").with_description("steel"))
        .await
        .unwrap();
    assert!(!created.id.is_nil());
    assert!(created.created_at > 0);
    assert!(created.deleted_at.is_none());

    let fetched = app.repository.get_by_id(created.id, &[]).await.unwrap();
    assert_eq!(fetched, created);

    let deleted = app.repository.delete(created.id).await.unwrap();
    assert!(deleted.deleted_at.is_some());

    let err = app.repository.get_by_id(created.id, &[]).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    // Soft delete keeps the row
    assert_eq!(app.raw_row_count().await, 1);
}

#[tokio::test]
async fn test_add_populates_cache() {
    let app = helpers::TestApp::new().await;
    let created = app.repository.add(Sample::new("hinge")).await.unwrap();

    let cached: Option<Sample> = app
        .cache
        .service()
        .get(&repository_key::<Sample>(created.id))
        .await
        .unwrap();
    assert_eq!(cached, Some(created));
}

#[tokio::test]
async fn test_update_is_visible_through_cache() {
    let app = helpers::TestApp::new().await;
    let created = app.repository.add(Sample::new("old")).await.unwrap();
    app.repository.get_by_id(created.id, &[]).await.unwrap();

    let update = UpdateSample {
        id: created.id,
        name: Some("new".to_string()),
        description: None,
    };
    let updated = app.repository.update(update.into()).await.unwrap();
    assert_eq!(updated.name.as_deref(), Some("new"));
    assert!(updated.updated_at.is_some());

    let fetched = app.repository.get_by_id(created.id, &[]).await.unwrap();
    assert_eq!(fetched.name.as_deref(), Some("new"));
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn test_cached_entry_survives_direct_row_removal() {
    let app = helpers::TestApp::new().await;
    let created = app.repository.add(Sample::new("ghost")).await.unwrap();

    // Bypass the decorator; the cache still holds the entry
    let id_filter = build_equals::<Sample>("id", created.id).unwrap();
    app.base.delete_hard(&id_filter).await.unwrap();

    let cached = app.repository.get_by_id(created.id, &[]).await.unwrap();
    assert_eq!(cached.id, created.id);
}

#[tokio::test]
async fn test_hard_delete_invalidates_every_entry() {
    let app = helpers::TestApp::new().await;
    let a = app.repository.add(Sample::new("a")).await.unwrap();
    let b = app.repository.add(Sample::new("b")).await.unwrap();
    assert_eq!(app.cache.service().key_count(), 2);

    let filter = build_equals::<Sample>("name", "a").unwrap();
    let removed = app.repository.delete_hard(&filter).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(app.cache.service().key_count(), 0);

    let err = app.repository.get_by_id(a.id, &[]).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(app.repository.get_by_id(b.id, &[]).await.unwrap().id, b.id);
    assert_eq!(app.raw_row_count().await, 1);
}

#[tokio::test]
async fn test_purge_soft_deleted_rows() {
    let app = helpers::TestApp::new().await;
    let keep = app.repository.add(Sample::new("keep")).await.unwrap();
    let gone = app.repository.add(Sample::new("gone")).await.unwrap();
    app.repository.delete(gone.id).await.unwrap();

    let removed = app
        .repository
        .delete_hard(&Predicate::<Sample>::live().not())
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(app.raw_row_count().await, 1);
    assert_eq!(app.repository.get_by_id(keep.id, &[]).await.unwrap().id, keep.id);
}

#[tokio::test]
async fn test_pagination_and_filters() {
    let app = helpers::TestApp::new().await;
    for i in 1..=12 {
        let name = if i % 3 == 0 { "fizz".to_string() } else { format!("item-{i:02}") };
        app.repository.add(Sample::new(name)).await.unwrap();
    }

    let page = app
        .repository
        .get_all(&PaginationQuery::new(3, 5), &[])
        .await
        .unwrap();
    assert_eq!(page.total_items, 12);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert!(!page.has_next());

    let fizz = build_equals::<Sample>("name", "fizz").unwrap();
    assert_eq!(app.repository.count(&fizz).await.unwrap(), 4);

    let query = PaginationQuery::new(1, 2).with_sort(SortField::desc("name"));
    let page = app
        .repository
        .get_all_by_parameters_paginated(&query, &fizz.clone().not(), &[])
        .await
        .unwrap();
    assert_eq!(page.total_items, 8);
    let names: Vec<_> = page.items.iter().filter_map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["item-11", "item-10"]);
}

#[tokio::test]
async fn test_get_all_excludes_soft_deleted() {
    let app = helpers::TestApp::new().await;
    let a = app.repository.add(Sample::new("a")).await.unwrap();
    app.repository.add(Sample::new("b")).await.unwrap();
    app.repository.delete(a.id).await.unwrap();

    let all = app
        .repository
        .get_all(&PaginationQuery::unpaginated(), &[])
        .await
        .unwrap();
    assert_eq!(all.total_items, 1);
    assert_eq!(all.total_pages, 1);
    assert_eq!(all.items[0].name.as_deref(), Some("b"));
}

#[tokio::test]
async fn test_disabled_cache_reads_through() {
    let config = CacheConfig {
        is_enabled: false,
        ..CacheConfig::default()
    };
    let app = helpers::TestApp::with_cache_config(config).await;
    let created = app.repository.add(Sample::new("plain")).await.unwrap();
    assert_eq!(app.cache.service().key_count(), 0);

    let id_filter = build_equals::<Sample>("id", created.id).unwrap();
    app.base.delete_hard(&id_filter).await.unwrap();
    let err = app.repository.get_by_id(created.id, &[]).await.unwrap_err();
    assert!(err.is_not_found());
}
