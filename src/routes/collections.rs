// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection routes.
//!
//! Every mutation answers with the user's full, freshly fetched collection
//! list joined against the catalog, so clients never patch local state.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CollectionName, CollectionWithDetails, MemberKind};
use crate::routes::doc_id;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/collections",
            get(list_collections).post(create_collection),
        )
        .route(
            "/api/collections/{id}",
            get(get_collection)
                .patch(rename_collection)
                .delete(delete_collection),
        )
        .route(
            "/api/collections/{id}/{kind}/{member_id}",
            put(add_member).delete(remove_member),
        )
}

#[derive(Debug, Deserialize)]
pub struct CollectionNameRequest {
    pub name: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollectionsResponse {
    pub collections: Vec<CollectionWithDetails>,
}

/// Outcome of a collection mutation.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MutationResponse {
    pub success: bool,
    pub message: String,
    /// Id of the collection a create produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    pub collections: Vec<CollectionWithDetails>,
}

/// Re-read the user's collections for display, oldest first.
async fn fetch_collections(state: &AppState, uid: &str) -> Result<Vec<CollectionWithDetails>> {
    let catalog = state.catalog.snapshot().await;
    let mut collections = state
        .collections
        .list_collections_with_details(uid, &catalog)
        .await?;

    collections.sort_by(|a, b| {
        a.collection
            .created_at
            .cmp(&b.collection.created_at)
            .then_with(|| a.collection.id.cmp(&b.collection.id))
    });
    Ok(collections)
}

async fn respond(
    state: &AppState,
    uid: &str,
    success: bool,
    message: &str,
    collection_id: Option<String>,
) -> Result<Json<MutationResponse>> {
    Ok(Json(MutationResponse {
        success,
        message: message.to_string(),
        collection_id,
        collections: fetch_collections(state, uid).await?,
    }))
}

async fn list_collections(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CollectionsResponse>> {
    Ok(Json(CollectionsResponse {
        collections: fetch_collections(&state, &user.uid).await?,
    }))
}

async fn create_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CollectionNameRequest>,
) -> Result<Json<MutationResponse>> {
    let name = CollectionName::parse(&req.name)?;

    match state.collections.create_collection(&user.uid, &name).await {
        Some(collection) => {
            respond(&state, &user.uid, true, "Collection created", Some(collection.id)).await
        }
        None => respond(&state, &user.uid, false, "Failed to create collection", None).await,
    }
}

async fn get_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CollectionWithDetails>> {
    let id = doc_id(&id)?;
    let collection = state
        .collections
        .get_collection(&user.uid, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Collection {} not found", id)))?;

    let catalog = state.catalog.snapshot().await;
    Ok(Json(catalog.join(collection)))
}

async fn rename_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<CollectionNameRequest>,
) -> Result<Json<MutationResponse>> {
    let id = doc_id(&id)?;
    let name = CollectionName::parse(&req.name)?;

    let renamed = state
        .collections
        .rename_collection(&user.uid, id, &name)
        .await;
    let message = if renamed {
        "Collection renamed"
    } else {
        "Failed to rename collection"
    };
    respond(&state, &user.uid, renamed, message, None).await
}

async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>> {
    let id = doc_id(&id)?;

    let deleted = state.collections.delete_collection(&user.uid, id).await;
    let message = if deleted {
        "Collection deleted"
    } else {
        "Failed to delete collection"
    };
    respond(&state, &user.uid, deleted, message, None).await
}

fn member_path(kind: &str, id: &str, member_id: &str) -> Result<(MemberKind, String, String)> {
    let kind = MemberKind::from_segment(kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown member kind {}", kind)))?;
    Ok((kind, doc_id(id)?.to_string(), doc_id(member_id)?.to_string()))
}

async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, kind, member_id)): Path<(String, String, String)>,
) -> Result<Json<MutationResponse>> {
    let (kind, id, member_id) = member_path(&kind, &id, &member_id)?;

    let added = state
        .collections
        .add_member(&user.uid, &id, &member_id, kind)
        .await;
    let message = if added {
        format!("Added {} to collection", kind)
    } else {
        format!("Failed to add {} to collection", kind)
    };
    respond(&state, &user.uid, added, &message, None).await
}

async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((id, kind, member_id)): Path<(String, String, String)>,
) -> Result<Json<MutationResponse>> {
    let (kind, id, member_id) = member_path(&kind, &id, &member_id)?;

    let removed = state
        .collections
        .remove_member(&user.uid, &id, &member_id, kind)
        .await;
    let message = if removed {
        format!("Removed {} from collection", kind)
    } else {
        format!("Failed to remove {} from collection", kind)
    };
    respond(&state, &user.uid, removed, &message, None).await
}
