// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store.
//!
//! Mirrors Firestore semantics closely enough for tests and local runs:
//! updates require an existing document, creates require an absent one,
//! and each update (merge + transforms) happens under the document's
//! entry lock so concurrent set-add/set-remove calls converge.

use super::{CollectionPath, DocPath, DocumentStore, FieldTransform, Fields};
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Memory-backed [`DocumentStore`], keyed by full document path.
#[derive(Clone, Default)]
pub struct MemoryDb {
    docs: Arc<DashMap<String, Fields>>,
    operations: Arc<AtomicU64>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations served so far.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::SeqCst)
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryDb {
    async fn get(&self, path: &DocPath) -> Result<Option<Fields>, AppError> {
        self.record();
        Ok(self.docs.get(&path.to_string()).map(|doc| doc.value().clone()))
    }

    async fn set(&self, path: &DocPath, doc: Fields) -> Result<(), AppError> {
        self.record();
        self.docs.insert(path.to_string(), doc);
        Ok(())
    }

    async fn create(&self, path: &DocPath, doc: Fields) -> Result<(), AppError> {
        self.record();
        match self.docs.entry(path.to_string()) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("Document {} exists", path))),
            Entry::Vacant(slot) => {
                slot.insert(doc);
                Ok(())
            }
        }
    }

    async fn update(
        &self,
        path: &DocPath,
        fields: Fields,
        transforms: Vec<FieldTransform>,
    ) -> Result<(), AppError> {
        self.record();
        let mut doc = self
            .docs
            .get_mut(&path.to_string())
            .ok_or_else(|| AppError::NotFound(format!("Document {} not found", path)))?;

        for (key, value) in fields {
            doc.insert(key, value);
        }
        for transform in &transforms {
            transform.apply(&mut doc);
        }
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), AppError> {
        self.record();
        self.docs.remove(&path.to_string());
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Fields)>, AppError> {
        self.record();
        let prefix = format!("{}/", collection);
        Ok(self
            .docs
            .iter()
            .filter_map(|entry| {
                let id = entry.key().strip_prefix(&prefix)?;
                // Documents of nested sub-collections are not direct children.
                if id.contains('/') {
                    return None;
                }
                Some((id.to_string(), entry.value().clone()))
            })
            .collect())
    }
}
