// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile service: profile lifecycle, favorites and avatars.

use crate::db::{to_fields, user_doc, DocumentStore, DocumentStoreExt, FieldTransform, Fields};
use crate::error::AppError;
use crate::models::{Identity, ProfileUpdate, UserProfile};
use crate::services::storage::{avatar_key, BlobStore};
use crate::time_utils::now_rfc3339;
use serde_json::Value;
use std::sync::Arc;

/// Largest accepted avatar upload.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const FAVORITES_FIELD: &str = "favorites";
const UPDATED_AT_FIELD: &str = "updatedAt";

/// Owns the `users/{uid}` document.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { store, blobs }
    }

    /// Get a user's profile.
    pub async fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.store.get_obj(&user_doc(uid)).await
    }

    /// Create the initial profile for `identity`.
    ///
    /// The write only succeeds if no document exists; if one does, the
    /// stored profile is returned untouched.
    pub async fn create_profile(&self, identity: &Identity) -> Result<UserProfile, AppError> {
        let path = user_doc(&identity.uid);
        let profile = UserProfile::new(identity, &now_rfc3339());

        match self.store.create_obj(&path, &profile).await {
            Ok(()) => {
                tracing::info!(uid = %identity.uid, "Created user profile");
                Ok(profile)
            }
            Err(AppError::Conflict(_)) => {
                tracing::debug!(uid = %identity.uid, "Profile already exists, keeping it");
                self.get_profile(&identity.uid).await?.ok_or_else(|| {
                    AppError::Database(format!("Profile {} vanished during create", identity.uid))
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Load the profile for a freshly signed-in user, creating it on first
    /// sign-in.
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<UserProfile, AppError> {
        if let Some(profile) = self.get_profile(&identity.uid).await? {
            return Ok(profile);
        }
        self.create_profile(identity).await
    }

    /// Merge the provided fields into the profile and stamp `updatedAt`.
    pub async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), AppError> {
        let mut fields = to_fields(update)?;
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(now_rfc3339()));

        self.store.update(&user_doc(uid), fields, vec![]).await?;

        tracing::info!(
            uid,
            display_name = update.display_name.is_some(),
            photo_url = update.photo_url.is_some(),
            bio = update.bio.is_some(),
            preferences = update.preferences.is_some(),
            "Updated user profile"
        );
        Ok(())
    }

    /// Flip membership of `artwork_id` in the user's favorites.
    ///
    /// The flip is written as an array-remove or array-union rather than a
    /// replacement array, so concurrent toggles of other artworks survive.
    /// Returns the new favorite set, or `None` if the user has no profile.
    pub async fn toggle_favorite(
        &self,
        uid: &str,
        artwork_id: &str,
    ) -> Result<Option<Vec<String>>, AppError> {
        let Some(profile) = self.get_profile(uid).await? else {
            return Ok(None);
        };

        let was_favorite = profile.is_favorite(artwork_id);
        let transform = if was_favorite {
            FieldTransform::array_remove(FAVORITES_FIELD, artwork_id)
        } else {
            FieldTransform::array_union(FAVORITES_FIELD, artwork_id)
        };

        let mut fields = Fields::new();
        fields.insert(UPDATED_AT_FIELD.to_string(), Value::String(now_rfc3339()));
        self.store
            .update(&user_doc(uid), fields, vec![transform])
            .await?;

        let mut favorites = profile.favorites;
        if was_favorite {
            favorites.retain(|id| id != artwork_id);
        } else {
            favorites.push(artwork_id.to_string());
        }

        tracing::info!(uid, artwork_id, favorite = !was_favorite, "Toggled favorite");
        Ok(Some(favorites))
    }

    /// Store a new avatar at `profile-pictures/{uid}` and point `photoURL`
    /// at it.
    pub async fn upload_avatar(
        &self,
        uid: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        if !content_type.starts_with("image/") {
            return Err(AppError::BadRequest(format!(
                "Avatar must be an image, got {}",
                content_type
            )));
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Avatar is empty".to_string()));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(AppError::BadRequest(format!(
                "Avatar exceeds {} bytes",
                MAX_AVATAR_BYTES
            )));
        }

        let size = bytes.len();
        let url = self
            .blobs
            .upload(&avatar_key(uid), bytes, content_type)
            .await?;

        self.update_profile(
            uid,
            &ProfileUpdate {
                photo_url: Some(url.clone()),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(uid, size, "Uploaded avatar");
        Ok(url)
    }
}
