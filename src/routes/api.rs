// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profile and favorites.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Artwork, ProfileUpdate, UserProfile};
use crate::routes::doc_id;
use crate::services::catalog::require_artwork;
use crate::services::profile::MAX_AVATAR_BYTES;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).patch(update_me))
        .route(
            "/api/me/avatar",
            put(upload_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES)),
        )
        .route("/api/favorites", get(get_favorites))
        .route("/api/favorites/{artwork_id}", post(toggle_favorite))
}

// ─── User Profile ────────────────────────────────────────────

async fn load_profile(state: &AppState, uid: &str) -> Result<UserProfile> {
    state
        .profiles
        .get_profile(uid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", uid)))
}

/// Get current user profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    Ok(Json(load_profile(&state, &user.uid).await?))
}

/// Merge the supplied fields into the profile and return the result.
async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    update
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if update.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    state.profiles.update_profile(&user.uid, &update).await?;
    Ok(Json(load_profile(&state, &user.uid).await?))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AvatarResponse {
    #[serde(rename = "photoURL")]
    pub photo_url: String,
}

/// Replace the avatar with the raw image in the request body.
async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AvatarResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Content-Type is required".to_string()))?;

    // Ignore parameters such as `; charset=`.
    let content_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let photo_url = state
        .profiles
        .upload_avatar(&user.uid, body.to_vec(), &content_type)
        .await?;

    Ok(Json(AvatarResponse { photo_url }))
}

// ─── Favorites ───────────────────────────────────────────────

/// Favorite artwork ids with the matching catalog entries.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
    pub artworks: Vec<Artwork>,
}

async fn get_favorites(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<FavoritesResponse>> {
    let profile = load_profile(&state, &user.uid).await?;
    let catalog = state.catalog.snapshot().await;

    Ok(Json(FavoritesResponse {
        artworks: catalog.resolve_artworks(&profile.favorites),
        favorites: profile.favorites,
    }))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToggleFavoriteResponse {
    /// Whether the artwork is a favorite after the toggle.
    pub favorite: bool,
    pub favorites: Vec<String>,
    pub artworks: Vec<Artwork>,
}

async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(artwork_id): Path<String>,
) -> Result<Json<ToggleFavoriteResponse>> {
    let artwork_id = doc_id(&artwork_id)?;
    let catalog = state.catalog.snapshot().await;

    // Removals skip the catalog check.
    if !load_profile(&state, &user.uid).await?.is_favorite(artwork_id) {
        require_artwork(&catalog, artwork_id)?;
    }

    let favorites = state
        .profiles
        .toggle_favorite(&user.uid, artwork_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", user.uid)))?;

    Ok(Json(ToggleFavoriteResponse {
        favorite: favorites.iter().any(|id| id == artwork_id),
        artworks: catalog.resolve_artworks(&favorites),
        favorites,
    }))
}
