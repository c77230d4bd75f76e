// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mimesis Gallery: backend for a protest-art gallery
//!
//! This crate provides the API behind the gallery frontend: user profiles
//! with favorites and avatars, user-curated collections of artworks and
//! artists, and the read-only catalog they refer to.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{BlobStore, CatalogService, CollectionService, IdentityClient, ProfileService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub profiles: ProfileService,
    pub collections: CollectionService,
    pub catalog: CatalogService,
    pub identity: IdentityClient,
}

impl AppState {
    /// Wire services over the given document and blob stores.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            identity: IdentityClient::new(&config),
            profiles: ProfileService::new(store.clone(), blobs),
            collections: CollectionService::new(store.clone()),
            catalog: CatalogService::new(store),
            config,
        }
    }
}
