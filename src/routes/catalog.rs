// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public catalog routes.

use crate::models::{Artist, Artwork};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/catalog/artworks", get(list_artworks))
        .route("/api/catalog/artists", get(list_artists))
}

/// All artworks. Never fails: the bundled catalog stands in for the store.
async fn list_artworks(State(state): State<Arc<AppState>>) -> Json<Vec<Artwork>> {
    Json(state.catalog.artworks().await)
}

async fn list_artists(State(state): State<Arc<AppState>>) -> Json<Vec<Artist>> {
    Json(state.catalog.artists().await)
}
