// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blob storage for profile pictures.
//!
//! Production uploads go to Cloud Storage through the JSON API as a
//! `multipart/related` upload carrying a Firebase download token in the
//! object metadata. The returned URL is the Firebase download URL for that
//! token, which works on buckets without public access. When
//! `FIREBASE_STORAGE_EMULATOR_HOST` is set the same calls go to the emulator
//! without credentials.

use crate::config::Config;
use crate::error::AppError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const GCS_API_URL: &str = "https://storage.googleapis.com";
const FIREBASE_DOWNLOAD_URL: &str = "https://firebasestorage.googleapis.com";
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const MULTIPART_BOUNDARY: &str = "mimesis_gallery_upload_boundary";

/// Key under which a user's avatar is stored.
pub fn avatar_key(uid: &str) -> String {
    format!("profile-pictures/{}", uid)
}

/// Keyed blob storage returning durable fetch URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` at `key`, replacing any previous object, and return a
    /// URL the object can be fetched from.
    async fn upload(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, AppError>;
}

/// Cloud Storage client.
pub struct CloudStorage {
    http: reqwest::Client,
    bucket: String,
    api_url: String,
    download_url: String,
    auth: Option<gcloud_sdk::GoogleAuthTokenGenerator>,
}

/// Subset of the object resource returned by an upload.
#[derive(Debug, Deserialize)]
struct UploadedObject {
    #[serde(default)]
    generation: Option<String>,
}

impl CloudStorage {
    /// Create a client using application default credentials, or the
    /// emulator if configured.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        if let Some(host) = &config.storage_emulator_host {
            tracing::info!(host = %host, "Using Firebase Storage emulator");
            let base = format!("http://{}", host);
            return Ok(Self::with_urls(&base, &base, &config.storage_bucket, None));
        }

        let auth = gcloud_sdk::GoogleAuthTokenGenerator::new(
            gcloud_sdk::TokenSourceType::Default,
            vec![STORAGE_SCOPE.to_string()],
        )
        .await
        .map_err(|e| AppError::Storage(format!("Failed to initialize credentials: {}", e)))?;

        tracing::info!(bucket = %config.storage_bucket, "Cloud Storage client initialized");

        Ok(Self::with_urls(
            GCS_API_URL,
            FIREBASE_DOWNLOAD_URL,
            &config.storage_bucket,
            Some(auth),
        ))
    }

    fn with_urls(
        api_url: &str,
        download_url: &str,
        bucket: &str,
        auth: Option<gcloud_sdk::GoogleAuthTokenGenerator>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            bucket: bucket.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            download_url: download_url.trim_end_matches('/').to_string(),
            auth,
        }
    }

    /// Firebase download URL for an object and one of its download tokens.
    fn object_url(&self, key: &str, token: &str) -> String {
        format!(
            "{}/v0/b/{}/o/{}?alt=media&token={}",
            self.download_url,
            self.bucket,
            urlencoding::encode(key),
            token
        )
    }
}

/// Build a `multipart/related` body: JSON object metadata, then the media.
fn multipart_body(metadata: &serde_json::Value, bytes: &[u8], content_type: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {ct}\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            m = metadata,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
    body
}

#[async_trait]
impl BlobStore for CloudStorage {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=multipart",
            self.api_url, self.bucket
        );

        // A fresh token per upload also busts caches of the previous avatar.
        let token = uuid::Uuid::new_v4().to_string();
        let metadata = serde_json::json!({
            "name": key,
            "contentType": content_type,
            "metadata": { "firebaseStorageDownloadTokens": token },
        });

        let mut request = self
            .http
            .post(&url)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .body(multipart_body(&metadata, &bytes, content_type));

        if let Some(auth) = &self.auth {
            let token = auth
                .create_token()
                .await
                .map_err(|e| AppError::Storage(format!("Failed to obtain token: {}", e)))?;
            request = request.header(reqwest::header::AUTHORIZATION, token.header_value());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Upload of {} failed ({}): {}",
                key, status, body
            )));
        }

        let object: UploadedObject = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Invalid upload response: {}", e)))?;

        tracing::debug!(key, generation = ?object.generation, "Object uploaded");
        Ok(self.object_url(key, &token))
    }
}

/// A stored object in [`MemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Process-local blob store for tests and local development.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<DashMap<String, StoredBlob>>,
    generation: Arc<AtomicU64>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<StoredBlob> {
        self.objects.get(key).map(|blob| blob.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.objects.insert(
            key.to_string(),
            StoredBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("memory://blobs/{}?v={}", key, generation))
    }
}
