// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Mimesis Gallery API Server
//!
//! Serves user profiles, favorites, collections and the artwork catalog
//! for the gallery frontend.

use mimesis_gallery::{
    config::{Config, StoreBackend},
    db::{DocumentStore, FirestoreDb, MemoryDb},
    services::{BlobStore, CloudStorage, MemoryBlobStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Mimesis Gallery API"
    );

    let (store, blobs): (Arc<dyn DocumentStore>, Arc<dyn BlobStore>) = match config.store_backend
    {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id)
                .await
                .expect("Failed to connect to Firestore");
            let storage = CloudStorage::new(&config)
                .await
                .expect("Failed to initialize Cloud Storage");
            (Arc::new(db), Arc::new(storage))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (Arc::new(MemoryDb::new()), Arc::new(MemoryBlobStore::new()))
        }
    };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), store, blobs));

    if config.seed_catalog {
        state.catalog.seed().await;
    }

    // Build router
    let app = mimesis_gallery::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mimesis_gallery=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
