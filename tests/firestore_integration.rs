// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running.
//! Run with FIRESTORE_EMULATOR_HOST pointing at a running emulator.
//!
//! The emulator provides a clean state for each test run.

use mimesis_gallery::db::{user_doc, DocumentStore, FieldTransform, Fields};
use mimesis_gallery::error::AppError;
use mimesis_gallery::models::{CollectionName, MemberKind};
use mimesis_gallery::services::{
    CatalogService, CatalogSource, CollectionService, MemoryBlobStore, ProfileService,
};
use serde_json::{json, Value};
use std::sync::Arc;

mod common;
use common::{test_db, test_identity};

/// Generate a unique uid for test isolation.
fn unique_uid() -> String {
    format!("test-{}", uuid::Uuid::new_v4().simple())
}

fn fields(value: Value) -> Fields {
    value.as_object().cloned().unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// DOCUMENT STORE PRIMITIVES
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_create_refuses_existing_document() {
    require_emulator!();

    let db = test_db().await;
    let path = user_doc(&unique_uid());

    db.create(&path, fields(json!({"bio": "first"}))).await.unwrap();
    let err = db
        .create(&path, fields(json!({"bio": "second"})))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);

    let stored = db.get(&path).await.unwrap().unwrap();
    assert_eq!(stored["bio"], "first");

    println!("✓ create-if-absent verified: {}", path);
}

#[tokio::test]
async fn test_update_requires_existing_document() {
    require_emulator!();

    let db = test_db().await;
    let path = user_doc(&unique_uid());

    let err = db
        .update(&path, fields(json!({"bio": "x"})), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {:?}", err);
    assert!(db.get(&path).await.unwrap().is_none());
}

#[tokio::test]
async fn test_update_merges_and_transforms() {
    require_emulator!();

    let db = test_db().await;
    let path = user_doc(&unique_uid());

    db.set(&path, fields(json!({"bio": "old", "email": "a@example.com", "favorites": ["x"]})))
        .await
        .unwrap();

    db.update(
        &path,
        fields(json!({"bio": "new"})),
        vec![
            FieldTransform::array_union("favorites", "y"),
            FieldTransform::array_union("favorites", "x"),
        ],
    )
    .await
    .unwrap();

    let stored = db.get(&path).await.unwrap().unwrap();
    assert_eq!(stored["bio"], "new");
    assert_eq!(stored["email"], "a@example.com");
    assert_eq!(stored["favorites"], json!(["x", "y"]));

    db.update(&path, Fields::new(), vec![FieldTransform::array_remove("favorites", "x")])
        .await
        .unwrap();
    let stored = db.get(&path).await.unwrap().unwrap();
    assert_eq!(stored["favorites"], json!(["y"]));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    require_emulator!();

    let db = test_db().await;
    let path = user_doc(&unique_uid());

    db.set(&path, fields(json!({"bio": "x"}))).await.unwrap();
    db.delete(&path).await.unwrap();
    db.delete(&path).await.unwrap();
    assert!(db.get(&path).await.unwrap().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// SERVICES
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_profile_lifecycle() {
    require_emulator!();

    let store = Arc::new(test_db().await);
    let profiles = ProfileService::new(store, Arc::new(MemoryBlobStore::new()));
    let uid = unique_uid();

    let created = profiles.ensure_profile(&test_identity(&uid)).await.unwrap();
    let again = profiles.ensure_profile(&test_identity(&uid)).await.unwrap();
    assert_eq!(created.created_at, again.created_at);

    let favorites = profiles
        .toggle_favorite(&uid, "guernica-1937")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(favorites, vec!["guernica-1937"]);

    let favorites = profiles
        .toggle_favorite(&uid, "guernica-1937")
        .await
        .unwrap()
        .unwrap();
    assert!(favorites.is_empty());

    let stored = profiles.get_profile(&uid).await.unwrap().unwrap();
    assert!(stored.favorites.is_empty());

    println!("✓ Profile lifecycle verified: uid={}", uid);
}

#[tokio::test]
async fn test_collection_lifecycle() {
    require_emulator!();

    let store = Arc::new(test_db().await);
    let collections = CollectionService::new(store);
    let uid = unique_uid();

    let name = CollectionName::parse("Protest Art").unwrap();
    let c = collections.create_collection(&uid, &name).await.unwrap();

    assert!(collections.add_member(&uid, &c.id, "guernica-1937", MemberKind::Artwork).await);
    assert!(collections.add_member(&uid, &c.id, "guernica-1937", MemberKind::Artwork).await);
    assert!(collections.add_member(&uid, &c.id, "unknown-artist", MemberKind::Artist).await);

    let listed = collections.list_collections(&uid).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].artwork_ids, vec!["guernica-1937"]);
    assert_eq!(listed[0].artist_ids, vec!["unknown-artist"]);

    assert!(collections.delete_collection(&uid, &c.id).await);
    assert!(collections.delete_collection(&uid, &c.id).await);
    assert!(!collections.add_member(&uid, &c.id, "x", MemberKind::Artwork).await);
    assert!(collections.list_collections(&uid).await.unwrap().is_empty());

    println!("✓ Collection lifecycle verified: uid={}", uid);
}

#[tokio::test]
async fn test_catalog_seed_and_read() {
    require_emulator!();

    let catalog = CatalogService::new(Arc::new(test_db().await));
    let result = catalog.seed().await;
    assert_eq!(result.failed, 0);

    let listing = catalog.load_artworks().await;
    assert_eq!(listing.source, CatalogSource::Store);
    assert!(listing.items.iter().any(|a| a.id == "guernica-1937"));
}
