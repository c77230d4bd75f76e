//! User profile model for storage and API.

use crate::time_utils::deserialize_timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identity as reported by the identity provider after sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable user ID (also used as document ID)
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Free-form display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Preferences {
    #[validate(length(min = 1, max = 32))]
    pub theme: String,
    #[validate(length(min = 2, max = 16))]
    pub language: String,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            language: "en".to_string(),
            notifications: true,
        }
    }
}

/// User profile stored in Firestore at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub preferences: Preferences,
    /// Artwork IDs, kept free of duplicates.
    #[serde(default)]
    pub favorites: Vec<String>,
    /// When the profile was created (RFC 3339)
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: String,
    /// Last profile write (RFC 3339)
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: String,
}

impl UserProfile {
    /// Build the initial profile for a first sign-in.
    pub fn new(identity: &Identity, now: &str) -> Self {
        Self {
            uid: identity.uid.clone(),
            email: identity.email.clone().unwrap_or_default(),
            display_name: identity.display_name.clone().unwrap_or_default(),
            photo_url: identity.photo_url.clone().unwrap_or_default(),
            bio: String::new(),
            preferences: Preferences::default(),
            favorites: Vec::new(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }

    pub fn is_favorite(&self, artwork_id: &str) -> bool {
        self.favorites.iter().any(|id| id == artwork_id)
    }
}

/// Partial profile update; only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "photoURL")]
    #[validate(url)]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub preferences: Option<Preferences>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.photo_url.is_none()
            && self.bio.is_none()
            && self.preferences.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> Identity {
        Identity {
            uid: "u1".to_string(),
            email: Some("ada@example.com".to_string()),
            display_name: None,
            photo_url: None,
        }
    }

    #[test]
    fn test_new_profile_defaults() {
        let profile = UserProfile::new(&identity(), "2026-01-01T00:00:00Z");

        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.display_name, "");
        assert_eq!(profile.preferences, Preferences::default());
        assert_eq!(profile.preferences.theme, "light");
        assert_eq!(profile.preferences.language, "en");
        assert!(profile.preferences.notifications);
        assert!(profile.favorites.is_empty());
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn test_profile_wire_names() {
        let profile = UserProfile::new(&identity(), "2026-01-01T00:00:00Z");
        let value = serde_json::to_value(&profile).unwrap();

        assert!(value.get("photoURL").is_some());
        assert!(value.get("displayName").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("collections").is_none());
    }

    #[test]
    fn test_legacy_profile_with_embedded_collections_loads() {
        let value = json!({
            "uid": "u1",
            "email": "ada@example.com",
            "createdAt": 1_717_000_000_000_i64,
            "updatedAt": {"seconds": 1_717_000_060, "nanos": 0},
            "collections": [{"id": "stale"}]
        });
        let profile: UserProfile = serde_json::from_value(value).unwrap();
        assert_eq!(profile.created_at, "2024-05-29T16:26:40.000Z");
        assert_eq!(profile.updated_at, "2024-05-29T16:27:40.000Z");
        assert!(profile.favorites.is_empty());
        assert_eq!(profile.preferences, Preferences::default());
    }

    #[test]
    fn test_profile_update_serializes_only_present_fields() {
        let update = ProfileUpdate {
            bio: Some("Printmaker".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"bio": "Printmaker"}));
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_profile_update_validation() {
        let update = ProfileUpdate {
            bio: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let update = ProfileUpdate {
            photo_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
