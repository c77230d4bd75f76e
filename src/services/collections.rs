// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User collections stored under `users/{uid}/collections/{id}`.
//!
//! Mutations report success as a `bool` (or `Option` for create) instead of
//! an error: store failures are logged here and the HTTP layer turns them
//! into a `success: false` response.

use crate::db::{
    user_collection_doc, user_collections, DocumentStore, DocumentStoreExt, FieldTransform, Fields,
};
use crate::error::AppError;
use crate::models::{CollectionName, CollectionWithDetails, MemberKind, UserCollection};
use crate::services::catalog::CatalogSnapshot;
use crate::time_utils::now_rfc3339;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn DocumentStore>,
}

impl CollectionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All of a user's collections, in no particular order.
    pub async fn list_collections(&self, uid: &str) -> Result<Vec<UserCollection>, AppError> {
        self.store.list_obj(&user_collections(uid)).await
    }

    /// All of a user's collections joined against the catalog.
    pub async fn list_collections_with_details(
        &self,
        uid: &str,
        catalog: &CatalogSnapshot,
    ) -> Result<Vec<CollectionWithDetails>, AppError> {
        let collections = self.list_collections(uid).await?;
        Ok(collections.into_iter().map(|c| catalog.join(c)).collect())
    }

    /// Create an empty collection. Returns `None` if the write failed.
    pub async fn create_collection(
        &self,
        uid: &str,
        name: &CollectionName,
    ) -> Option<UserCollection> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let collection = UserCollection::new(id, name, &now_rfc3339());

        match self
            .store
            .create_obj(&user_collection_doc(uid, &collection.id), &collection)
            .await
        {
            Ok(()) => {
                tracing::info!(uid, collection_id = %collection.id, name = %collection.name, "Created collection");
                Some(collection)
            }
            Err(e) => {
                tracing::error!(uid, error = %e, "Failed to create collection");
                None
            }
        }
    }

    /// Get a single collection, `None` if it does not exist.
    pub async fn get_collection(
        &self,
        uid: &str,
        collection_id: &str,
    ) -> Result<Option<UserCollection>, AppError> {
        self.store
            .get_obj(&user_collection_doc(uid, collection_id))
            .await
    }

    /// Delete a collection. Deleting a missing collection succeeds.
    pub async fn delete_collection(&self, uid: &str, collection_id: &str) -> bool {
        match self
            .store
            .delete(&user_collection_doc(uid, collection_id))
            .await
        {
            Ok(()) => {
                tracing::info!(uid, collection_id, "Deleted collection");
                true
            }
            Err(e) => {
                tracing::error!(uid, collection_id, error = %e, "Failed to delete collection");
                false
            }
        }
    }

    /// Add an artwork or artist to a collection. Adding an existing member
    /// leaves the set unchanged.
    pub async fn add_member(
        &self,
        uid: &str,
        collection_id: &str,
        member_id: &str,
        kind: MemberKind,
    ) -> bool {
        let transform = FieldTransform::array_union(kind.field(), member_id);
        self.mutate_members(uid, collection_id, member_id, kind, transform, "add")
            .await
    }

    /// Remove an artwork or artist from a collection. Removing a member
    /// that is not present succeeds.
    pub async fn remove_member(
        &self,
        uid: &str,
        collection_id: &str,
        member_id: &str,
        kind: MemberKind,
    ) -> bool {
        let transform = FieldTransform::array_remove(kind.field(), member_id);
        self.mutate_members(uid, collection_id, member_id, kind, transform, "remove")
            .await
    }

    /// Change a collection's name.
    pub async fn rename_collection(
        &self,
        uid: &str,
        collection_id: &str,
        name: &CollectionName,
    ) -> bool {
        let mut fields = stamped_fields();
        fields.insert("name".to_string(), Value::String(name.as_str().to_string()));

        match self
            .store
            .update(&user_collection_doc(uid, collection_id), fields, vec![])
            .await
        {
            Ok(()) => {
                tracing::info!(uid, collection_id, name = %name.as_str(), "Renamed collection");
                true
            }
            Err(AppError::NotFound(_)) => {
                tracing::warn!(uid, collection_id, "Rename of missing collection");
                false
            }
            Err(e) => {
                tracing::error!(uid, collection_id, error = %e, "Failed to rename collection");
                false
            }
        }
    }

    async fn mutate_members(
        &self,
        uid: &str,
        collection_id: &str,
        member_id: &str,
        kind: MemberKind,
        transform: FieldTransform,
        action: &'static str,
    ) -> bool {
        let result = self
            .store
            .update(
                &user_collection_doc(uid, collection_id),
                stamped_fields(),
                vec![transform],
            )
            .await;

        match result {
            Ok(()) => {
                tracing::info!(uid, collection_id, member_id, %kind, action, "Updated collection members");
                true
            }
            // Collection deleted concurrently or never existed.
            Err(AppError::NotFound(_)) => {
                tracing::warn!(uid, collection_id, member_id, %kind, action, "Collection not found");
                false
            }
            Err(e) => {
                tracing::error!(uid, collection_id, member_id, %kind, action, error = %e, "Failed to update collection members");
                false
            }
        }
    }
}

fn stamped_fields() -> Fields {
    let mut fields = Fields::new();
    fields.insert("updatedAt".to_string(), Value::String(now_rfc3339()));
    fields
}
