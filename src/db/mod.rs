// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store layer.
//!
//! Services talk to a [`DocumentStore`]: a hierarchical, schemaless store
//! addressed by slash-separated paths (`users/{uid}/collections/{id}`).
//! Two backends exist:
//! - [`FirestoreDb`] for Cloud Firestore (and its emulator)
//! - [`MemoryDb`] for tests and local development

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Sub-collection under `users/{uid}`
    pub const USER_COLLECTIONS: &str = "collections";
    pub const ARTWORKS: &str = "artworks";
    pub const ARTISTS: &str = "artists";
}

/// JSON object holding a document's fields.
pub type Fields = Map<String, Value>;

/// Path to a collection: an odd number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath {
    segments: Vec<String>,
}

/// Path to a document: an even number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

impl CollectionPath {
    /// A top-level collection.
    pub fn root(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    /// The document `id` inside this collection.
    pub fn doc(&self, id: &str) -> DocPath {
        let mut segments = self.segments.clone();
        segments.push(id.to_string());
        DocPath { segments }
    }

    /// Parent document segments followed by the collection name.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the collection (last segment).
    pub fn name(&self) -> &str {
        // Constructors guarantee at least one segment.
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Segments of the parent document (empty for a root collection).
    pub fn parent_segments(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl DocPath {
    /// A sub-collection under this document.
    pub fn collection(&self, name: &str) -> CollectionPath {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        CollectionPath { segments }
    }

    /// The collection holding this document.
    pub fn parent(&self) -> CollectionPath {
        CollectionPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        }
    }

    /// Document ID (last segment).
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// `users/{uid}`
pub fn user_doc(uid: &str) -> DocPath {
    CollectionPath::root(collections::USERS).doc(uid)
}

/// `users/{uid}/collections`
pub fn user_collections(uid: &str) -> CollectionPath {
    user_doc(uid).collection(collections::USER_COLLECTIONS)
}

/// `users/{uid}/collections/{collection_id}`
pub fn user_collection_doc(uid: &str, collection_id: &str) -> DocPath {
    user_collections(uid).doc(collection_id)
}

/// Server-side array mutation applied atomically with a field merge.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldTransform {
    /// Append each value not already present (set-add).
    ArrayUnion { field: String, values: Vec<Value> },
    /// Remove every occurrence of each value (set-remove).
    ArrayRemove { field: String, values: Vec<Value> },
}

impl FieldTransform {
    pub fn array_union(field: &str, value: impl Into<Value>) -> Self {
        FieldTransform::ArrayUnion {
            field: field.to_string(),
            values: vec![value.into()],
        }
    }

    pub fn array_remove(field: &str, value: impl Into<Value>) -> Self {
        FieldTransform::ArrayRemove {
            field: field.to_string(),
            values: vec![value.into()],
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldTransform::ArrayUnion { field, .. } | FieldTransform::ArrayRemove { field, .. } => {
                field
            }
        }
    }

    /// Apply this transform to a document's fields in place.
    ///
    /// A missing or non-array field is treated as an empty array.
    pub fn apply(&self, fields: &mut Fields) {
        let entry = fields
            .entry(self.field().to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        let Value::Array(current) = entry else {
            return;
        };

        match self {
            FieldTransform::ArrayUnion { values, .. } => {
                for value in values {
                    if !current.contains(value) {
                        current.push(value.clone());
                    }
                }
            }
            FieldTransform::ArrayRemove { values, .. } => {
                current.retain(|item| !values.contains(item));
            }
        }
    }
}

/// Primitive operations of a hierarchical document store.
///
/// Every method is a single round trip. Errors are `AppError::Database`
/// for transport/backend failures, `AppError::NotFound` when a write
/// requires an existing document and `AppError::Conflict` when a create
/// finds one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if absent.
    async fn get(&self, path: &DocPath) -> Result<Option<Fields>, AppError>;

    /// Write a whole document, replacing any existing one.
    async fn set(&self, path: &DocPath, doc: Fields) -> Result<(), AppError>;

    /// Write a document only if none exists at `path`.
    async fn create(&self, path: &DocPath, doc: Fields) -> Result<(), AppError>;

    /// Merge `fields` into an existing document and apply `transforms`,
    /// all in one atomic write.
    async fn update(
        &self,
        path: &DocPath,
        fields: Fields,
        transforms: Vec<FieldTransform>,
    ) -> Result<(), AppError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete(&self, path: &DocPath) -> Result<(), AppError>;

    /// List all documents directly under a collection, as `(id, fields)`.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Fields)>, AppError>;
}

/// Typed helpers over [`DocumentStore`].
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    async fn get_obj<T>(&self, path: &DocPath) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get(path)
            .await?
            .map(|fields| from_fields(path, fields))
            .transpose()
    }

    async fn set_obj<T>(&self, path: &DocPath, obj: &T) -> Result<(), AppError>
    where
        T: Serialize + Sync,
    {
        self.set(path, to_fields(obj)?).await
    }

    async fn create_obj<T>(&self, path: &DocPath, obj: &T) -> Result<(), AppError>
    where
        T: Serialize + Sync,
    {
        self.create(path, to_fields(obj)?).await
    }

    async fn list_obj<T>(&self, collection: &CollectionPath) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.list(collection)
            .await?
            .into_iter()
            .map(|(id, fields)| from_fields(&collection.doc(&id), fields))
            .collect()
    }
}

impl<S: DocumentStore + ?Sized> DocumentStoreExt for S {}

/// Serialize a value into document fields. Non-object values are rejected.
pub fn to_fields<T: Serialize + ?Sized>(obj: &T) -> Result<Fields, AppError> {
    match serde_json::to_value(obj) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(AppError::Internal(anyhow::anyhow!(
            "document must serialize to an object, got {}",
            other
        ))),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

fn from_fields<T: DeserializeOwned>(path: &DocPath, fields: Fields) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Database(format!("Malformed document {}: {}", path, e)))
}
