// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod catalog;
pub mod collections;
pub mod identity;
pub mod profile;
pub mod storage;

pub use catalog::{CatalogService, CatalogSnapshot, CatalogSource, SeedResult};
pub use collections::CollectionService;
pub use identity::IdentityClient;
pub use profile::ProfileService;
pub use storage::{BlobStore, CloudStorage, MemoryBlobStore};
