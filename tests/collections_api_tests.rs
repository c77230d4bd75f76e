// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection endpoint tests.
//!
//! Mutations must answer with the re-fetched collection list, joined
//! against the catalog.

use axum::http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;
use common::{authed, body_json, create_test_app, create_test_app_offline, TestApp};

async fn call(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(authed(method, uri, "u1", body))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_protest_art_scenario() {
    let app = create_test_app();

    let (status, body) = call(&app, "POST", "/api/collections", Some(json!({"name": "Protest Art"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let id = body["collectionId"].as_str().unwrap().to_string();
    assert_eq!(body["collections"].as_array().unwrap().len(), 1);
    assert_eq!(body["collections"][0]["name"], "Protest Art");
    assert_eq!(body["collections"][0]["artworkIds"], json!([]));

    let (_, body) = call(&app, "PUT", &format!("/api/collections/{id}/artworks/guernica-1937"), None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["collections"][0]["artworkIds"], json!(["guernica-1937"]));
    assert_eq!(body["collections"][0]["artworks"][0]["title"], "Guernica");

    let (_, body) = call(&app, "PUT", &format!("/api/collections/{id}/artists/unknown-artist"), None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["collections"][0]["artistIds"], json!(["unknown-artist"]));
    assert_eq!(body["collections"][0]["artists"], json!([]));

    let (_, body) = call(&app, "DELETE", &format!("/api/collections/{id}"), None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["collections"], json!([]));
}

#[tokio::test]
async fn test_add_twice_and_remove_absent() {
    let app = create_test_app();
    let (_, body) = call(&app, "POST", "/api/collections", Some(json!({"name": "Goya"}))).await;
    let id = body["collectionId"].as_str().unwrap().to_string();
    let uri = format!("/api/collections/{id}/artworks/third-of-may-1814");

    call(&app, "PUT", &uri, None).await;
    let (_, body) = call(&app, "PUT", &uri, None).await;
    assert_eq!(body["collections"][0]["artworkIds"], json!(["third-of-may-1814"]));

    let (_, body) = call(&app, "DELETE", &format!("/api/collections/{id}/artworks/guernica-1937"), None).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["collections"][0]["artworkIds"], json!(["third-of-may-1814"]));

    let (_, body) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(body["collections"][0]["artworkIds"], json!([]));
}

#[tokio::test]
async fn test_empty_name_rejected_before_store() {
    let app = create_test_app();
    let before = app.db.operation_count();

    let (status, body) = call(&app, "POST", "/api/collections", Some(json!({"name": "   "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
    assert_eq!(app.db.operation_count(), before);
}

#[tokio::test]
async fn test_member_mutation_on_missing_collection() {
    let app = create_test_app();

    let (status, body) = call(&app, "PUT", "/api/collections/missing/artworks/guernica-1937", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["collections"], json!([]));
    assert!(app.db.is_empty());
}

#[tokio::test]
async fn test_unknown_member_kind_is_404() {
    let app = create_test_app();
    let (status, _) = call(&app, "PUT", "/api/collections/c1/sculptures/x", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_and_rename_collection() {
    let app = create_test_app();
    let (_, body) = call(&app, "POST", "/api/collections", Some(json!({"name": "Draft"}))).await;
    let id = body["collectionId"].as_str().unwrap().to_string();

    let (_, body) = call(&app, "PATCH", &format!("/api/collections/{id}"), Some(json!({"name": "Final"}))).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["collections"][0]["name"], "Final");

    let (status, body) = call(&app, "GET", &format!("/api/collections/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Final");
    assert_eq!(body["artworks"], json!([]));

    let (status, _) = call(&app, "GET", "/api/collections/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_twice_succeeds() {
    let app = create_test_app();
    let (_, body) = call(&app, "POST", "/api/collections", Some(json!({"name": "Temp"}))).await;
    let uri = format!("/api/collections/{}", body["collectionId"].as_str().unwrap());

    let (_, first) = call(&app, "DELETE", &uri, None).await;
    let (_, second) = call(&app, "DELETE", &uri, None).await;
    assert_eq!(first["success"], true);
    assert_eq!(second["success"], true);
}

#[tokio::test]
async fn test_collections_listed_oldest_first() {
    let app = create_test_app();
    for name in ["First", "Second", "Third"] {
        call(&app, "POST", "/api/collections", Some(json!({"name": name}))).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let (status, body) = call(&app, "GET", "/api/collections", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["collections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_users_cannot_see_each_others_collections() {
    let app = create_test_app();
    call(&app, "POST", "/api/collections", Some(json!({"name": "Private"}))).await;

    let response = app
        .router
        .clone()
        .oneshot(authed("GET", "/api/collections", "u2", None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["collections"], json!([]));
}

#[tokio::test]
async fn test_create_with_store_down_reports_failure() {
    let (router, _) = create_test_app_offline();

    let response = router
        .oneshot(authed("POST", "/api/collections", "u1", Some(json!({"name": "Offline"}))))
        .await
        .unwrap();

    // The create fails softly, then the re-fetch hits the same outage.
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "database_error");
}
