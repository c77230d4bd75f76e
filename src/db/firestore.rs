// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of [`DocumentStore`].
//!
//! Paths map directly onto Firestore's hierarchy: the parent of
//! `users/{uid}/collections/{id}` is the document `users/{uid}`, addressed
//! with the `.parent()` builder of the fluent API.
//!
//! Guarded updates set the precondition right after `in_col`, before the
//! document is named:
//!
//! ```no_run
//! # async fn guarded(db: &firestore::FirestoreDb) -> firestore::FirestoreResult<()> {
//! use firestore::FirestoreWritePrecondition;
//!
//! let bio = serde_json::json!({"bio": "Printmaker"});
//! let mut transaction = db.begin_transaction().await?;
//! db.fluent()
//!     .update()
//!     .fields(["bio"])
//!     .in_col("users")
//!     .precondition(FirestoreWritePrecondition::Exists(true))
//!     .document_id("u1")
//!     .object(&bio)
//!     .add_to_transaction(&mut transaction)?;
//! db.fluent()
//!     .update()
//!     .in_col("users")
//!     .precondition(FirestoreWritePrecondition::Exists(true))
//!     .document_id("u1")
//!     .transforms(|t| {
//!         t.fields([t
//!             .field("favorites")
//!             .append_missing_elements(["guernica-1937"])])
//!     })
//!     .only_transform()
//!     .add_to_transaction(&mut transaction)?;
//! transaction.commit().await?;
//! # Ok(())
//! # }
//! ```

use super::{CollectionPath, DocPath, DocumentStore, FieldTransform, Fields};
use crate::error::AppError;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;

/// Metadata keys injected by the Firestore deserializer.
const FIRESTORE_META_PREFIX: &str = "_firestore_";
const FIRESTORE_ID_FIELD: &str = "_firestore_id";

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a disconnected client (offline mode).
    ///
    /// All database operations return an error, which is how tests
    /// simulate a store outage.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Full resource name of the parent document of `collection`.
    fn parent_of(&self, collection: &CollectionPath) -> Result<String, AppError> {
        let client = self.get_client()?;
        Ok(parent_resource_path(
            client.get_documents_path(),
            collection.parent_segments(),
        ))
    }
}

/// Join the database documents path with a parent document's segments.
fn parent_resource_path(documents_path: &str, parent_segments: &[String]) -> String {
    if parent_segments.is_empty() {
        documents_path.to_string()
    } else {
        format!("{}/{}", documents_path, parent_segments.join("/"))
    }
}

/// Map a Firestore error to an application error for the given path.
fn map_error(path: &dyn std::fmt::Display, e: FirestoreError) -> AppError {
    match e {
        FirestoreError::DataNotFoundError(_) => {
            AppError::NotFound(format!("Document {} not found", path))
        }
        FirestoreError::DataConflictError(_) => {
            AppError::Conflict(format!("Document {} exists", path))
        }
        other => AppError::Database(other.to_string()),
    }
}

/// Remove deserializer metadata, returning the document ID if present.
fn strip_metadata(fields: &mut Fields) -> Option<String> {
    let id = fields
        .get(FIRESTORE_ID_FIELD)
        .and_then(|v| v.as_str())
        .map(str::to_string);
    fields.retain(|key, _| !key.starts_with(FIRESTORE_META_PREFIX));
    id
}

#[async_trait]
impl DocumentStore for FirestoreDb {
    async fn get(&self, path: &DocPath) -> Result<Option<Fields>, AppError> {
        let collection = path.parent();
        let parent = self.parent_of(&collection)?;

        let doc: Option<Fields> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collection.name())
            .parent(&parent)
            .obj()
            .one(path.id())
            .await
            .map_err(|e| map_error(path, e))?;

        Ok(doc.map(|mut fields| {
            strip_metadata(&mut fields);
            fields
        }))
    }

    async fn set(&self, path: &DocPath, doc: Fields) -> Result<(), AppError> {
        let collection = path.parent();
        let parent = self.parent_of(&collection)?;

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection.name())
            .document_id(path.id())
            .parent(&parent)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| map_error(path, e))?;
        Ok(())
    }

    async fn create(&self, path: &DocPath, doc: Fields) -> Result<(), AppError> {
        let collection = path.parent();
        let parent = self.parent_of(&collection)?;

        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection.name())
            .document_id(path.id())
            .parent(&parent)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| map_error(path, e))?;
        Ok(())
    }

    /// Field merge and array transforms go into one transaction, each write
    /// guarded by an `exists` precondition, so either all apply or none do.
    async fn update(
        &self,
        path: &DocPath,
        fields: Fields,
        transforms: Vec<FieldTransform>,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let collection = path.parent();
        let parent = self.parent_of(&collection)?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        if !fields.is_empty() {
            let mask: Vec<String> = fields.keys().cloned().collect();
            client
                .fluent()
                .update()
                .fields(mask)
                .in_col(collection.name())
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(path.id())
                .parent(&parent)
                .object(&fields)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add merge to transaction: {}", e))
                })?;
        }

        if !transforms.is_empty() {
            client
                .fluent()
                .update()
                .in_col(collection.name())
                .precondition(FirestoreWritePrecondition::Exists(true))
                .document_id(path.id())
                .parent(&parent)
                .transforms(|t| {
                    t.fields(transforms.iter().map(|transform| match transform {
                        FieldTransform::ArrayUnion { field, values } => t
                            .field(field.as_str())
                            .append_missing_elements(values.clone()),
                        FieldTransform::ArrayRemove { field, values } => t
                            .field(field.as_str())
                            .remove_all_from_array(values.clone()),
                    }))
                })
                .only_transform()
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add transform to transaction: {}", e))
                })?;
        }

        transaction.commit().await.map_err(|e| map_error(path, e))?;
        Ok(())
    }

    async fn delete(&self, path: &DocPath) -> Result<(), AppError> {
        let collection = path.parent();
        let parent = self.parent_of(&collection)?;

        self.get_client()?
            .fluent()
            .delete()
            .from(collection.name())
            .parent(&parent)
            .document_id(path.id())
            .execute()
            .await
            .map_err(|e| map_error(path, e))?;
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Fields)>, AppError> {
        let parent = self.parent_of(collection)?;

        let docs: Vec<Fields> = self
            .get_client()?
            .fluent()
            .select()
            .from(collection.name())
            .parent(&parent)
            .obj()
            .query()
            .await
            .map_err(|e| map_error(collection, e))?;

        Ok(docs
            .into_iter()
            .filter_map(|mut fields| {
                let id = strip_metadata(&mut fields).or_else(|| {
                    fields
                        .get("id")
                        .and_then(|v| v.as_str())
                        .map(str::to_string)
                });
                match id {
                    Some(id) => Some((id, fields)),
                    None => {
                        tracing::warn!(collection = %collection, "Skipping document without an ID");
                        None
                    }
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{user_collections, user_doc};
    use serde_json::json;

    #[test]
    fn test_parent_resource_path() {
        let base = "projects/p/databases/(default)/documents";
        assert_eq!(
            parent_resource_path(base, user_collections("u1").parent_segments()),
            "projects/p/databases/(default)/documents/users/u1"
        );
        assert_eq!(
            parent_resource_path(base, user_doc("u1").parent().parent_segments()),
            base
        );
    }

    #[test]
    fn test_strip_metadata() {
        let mut fields = json!({
            "_firestore_id": "abc",
            "_firestore_created": "2026-01-01T00:00:00Z",
            "name": "Protest Art"
        })
        .as_object()
        .cloned()
        .unwrap();

        assert_eq!(strip_metadata(&mut fields), Some("abc".to_string()));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], "Protest Art");
    }

    #[tokio::test]
    async fn test_offline_mode_fails_every_operation() {
        let db = FirestoreDb::new_mock();
        let err = db.get(&user_doc("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db.list(&user_collections("u1")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
