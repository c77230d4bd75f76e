// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User collections: named sets of catalog references.

use super::catalog::{Artist, Artwork};
use crate::error::AppError;
use crate::time_utils::deserialize_timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest accepted collection name, in characters.
pub const MAX_COLLECTION_NAME_LEN: usize = 100;

/// A collection stored at `users/{uid}/collections/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserCollection {
    pub id: String,
    pub name: String,
    /// Artwork IDs (set semantics)
    #[serde(default)]
    pub artwork_ids: Vec<String>,
    /// Artist IDs (set semantics)
    #[serde(default)]
    pub artist_ids: Vec<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: String,
}

impl UserCollection {
    /// A new, empty collection.
    pub fn new(id: String, name: &CollectionName, now: &str) -> Self {
        Self {
            id,
            name: name.as_str().to_string(),
            artwork_ids: Vec::new(),
            artist_ids: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    /// Member IDs of the given kind.
    pub fn members(&self, kind: MemberKind) -> &[String] {
        match kind {
            MemberKind::Artwork => &self.artwork_ids,
            MemberKind::Artist => &self.artist_ids,
        }
    }

    pub fn contains(&self, kind: MemberKind, member_id: &str) -> bool {
        self.members(kind).iter().any(|id| id == member_id)
    }
}

/// What a collection member refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Artwork,
    Artist,
}

impl MemberKind {
    /// Document field holding members of this kind.
    pub fn field(self) -> &'static str {
        match self {
            MemberKind::Artwork => "artworkIds",
            MemberKind::Artist => "artistIds",
        }
    }

    /// Parse the plural path segment used in routes (`artworks`, `artists`).
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "artworks" => Some(MemberKind::Artwork),
            "artists" => Some(MemberKind::Artist),
            _ => None,
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Artwork => f.write_str("artwork"),
            MemberKind::Artist => f.write_str("artist"),
        }
    }
}

/// A validated, non-empty collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionName(String);

impl CollectionName {
    /// Trim and validate a user-supplied name.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest(
                "Collection name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_COLLECTION_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "Collection name must be at most {} characters",
                MAX_COLLECTION_NAME_LEN
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A collection joined against the catalog for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollectionWithDetails {
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub collection: UserCollection,
    pub artworks: Vec<Artwork>,
    pub artists: Vec<Artist>,
}
