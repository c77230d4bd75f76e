// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only artwork/artist catalog.
//!
//! The catalog lives in the `artworks` and `artists` collections. A copy is
//! compiled into the binary and served whenever the store is unreachable or
//! has not been seeded, so catalog reads always return content.

use crate::db::{collections, CollectionPath, DocumentStore, DocumentStoreExt};
use crate::error::AppError;
use crate::models::{Artist, Artwork, CollectionWithDetails, UserCollection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

const BUNDLED_ARTWORKS: &str = include_str!("../../data/artworks.json");
const BUNDLED_ARTISTS: &str = include_str!("../../data/artists.json");

/// Where a catalog listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Store,
    Fallback,
}

/// A catalog listing and its origin.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub source: CatalogSource,
}

/// Outcome of copying the bundled catalog into the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedResult {
    pub written: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All artworks, falling back to the bundled set.
    pub async fn artworks(&self) -> Vec<Artwork> {
        self.load_artworks().await.items
    }

    /// All artists, falling back to the bundled set.
    pub async fn artists(&self) -> Vec<Artist> {
        self.load_artists().await.items
    }

    pub async fn load_artworks(&self) -> Listing<Artwork> {
        self.load(collections::ARTWORKS, bundled_artworks).await
    }

    pub async fn load_artists(&self) -> Listing<Artist> {
        self.load(collections::ARTISTS, bundled_artists).await
    }

    /// Both lists, indexed by id.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        let (artworks, artists) = tokio::join!(self.artworks(), self.artists());
        CatalogSnapshot::new(artworks, artists)
    }

    /// Write the bundled catalog into the store, one document per item.
    pub async fn seed(&self) -> SeedResult {
        let mut result = SeedResult::default();

        for artwork in bundled_artworks() {
            let path = CollectionPath::root(collections::ARTWORKS).doc(&artwork.id);
            match self.store.set_obj(&path, &artwork).await {
                Ok(()) => result.written += 1,
                Err(e) => {
                    tracing::warn!(id = %artwork.id, error = %e, "Failed to seed artwork");
                    result.failed += 1;
                }
            }
        }

        for artist in bundled_artists() {
            let path = CollectionPath::root(collections::ARTISTS).doc(&artist.id);
            match self.store.set_obj(&path, &artist).await {
                Ok(()) => result.written += 1,
                Err(e) => {
                    tracing::warn!(id = %artist.id, error = %e, "Failed to seed artist");
                    result.failed += 1;
                }
            }
        }

        tracing::info!(written = result.written, failed = result.failed, "Seeded catalog");
        result
    }

    async fn load<T>(&self, collection: &str, fallback: fn() -> Vec<T>) -> Listing<T>
    where
        T: DeserializeOwned + Send,
    {
        let listed: Result<Vec<T>, AppError> =
            self.store.list_obj(&CollectionPath::root(collection)).await;
        match listed {
            Ok(items) if !items.is_empty() => Listing {
                items,
                source: CatalogSource::Store,
            },
            Ok(_) => {
                tracing::warn!(collection, "Catalog collection is empty, using bundled data");
                Listing {
                    items: fallback(),
                    source: CatalogSource::Fallback,
                }
            }
            Err(e) => {
                tracing::warn!(collection, error = %e, "Catalog unavailable, using bundled data");
                Listing {
                    items: fallback(),
                    source: CatalogSource::Fallback,
                }
            }
        }
    }
}

fn bundled_artworks() -> Vec<Artwork> {
    parse_bundled(collections::ARTWORKS, BUNDLED_ARTWORKS)
}

fn bundled_artists() -> Vec<Artist> {
    parse_bundled(collections::ARTISTS, BUNDLED_ARTISTS)
}

fn parse_bundled<T: DeserializeOwned>(name: &str, json: &str) -> Vec<T> {
    serde_json::from_str(json).unwrap_or_else(|e: serde_json::Error| {
        tracing::error!(name, error = %e, "Bundled catalog is malformed");
        Vec::new()
    })
}

/// The catalog at one point in time, indexed for joins.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    artworks: Vec<Artwork>,
    artists: Vec<Artist>,
    artwork_index: HashMap<String, usize>,
    artist_index: HashMap<String, usize>,
}

impl CatalogSnapshot {
    pub fn new(artworks: Vec<Artwork>, artists: Vec<Artist>) -> Self {
        let artwork_index = artworks
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
        let artist_index = artists
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id.clone(), i))
            .collect();
        Self {
            artworks,
            artists,
            artwork_index,
            artist_index,
        }
    }

    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn artwork(&self, id: &str) -> Option<&Artwork> {
        self.artwork_index.get(id).map(|&i| &self.artworks[i])
    }

    pub fn artist(&self, id: &str) -> Option<&Artist> {
        self.artist_index.get(id).map(|&i| &self.artists[i])
    }

    /// Artworks for `ids`, in order. Unknown ids are skipped.
    pub fn resolve_artworks(&self, ids: &[String]) -> Vec<Artwork> {
        ids.iter().filter_map(|id| self.artwork(id)).cloned().collect()
    }

    /// Artists for `ids`, in order. Unknown ids are skipped.
    pub fn resolve_artists(&self, ids: &[String]) -> Vec<Artist> {
        ids.iter().filter_map(|id| self.artist(id)).cloned().collect()
    }

    pub fn join(&self, collection: UserCollection) -> CollectionWithDetails {
        let artworks = self.resolve_artworks(&collection.artwork_ids);
        let artists = self.resolve_artists(&collection.artist_ids);
        CollectionWithDetails {
            collection,
            artworks,
            artists,
        }
    }
}

/// Look up a single artwork, treating an unknown id as not found.
pub fn require_artwork<'a>(snapshot: &'a CatalogSnapshot, id: &str) -> Result<&'a Artwork, AppError> {
    snapshot
        .artwork(id)
        .ok_or_else(|| AppError::NotFound(format!("Artwork {}", id)))
}
