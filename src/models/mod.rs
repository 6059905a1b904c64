use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MediatorError;

/// Property the user is searching videos for
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyDetails {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub mls_number: String,
}

impl PropertyDetails {
    /// Check that every field is filled in.
    ///
    /// Missing fields are reported together, in form order.
    pub fn validate(&self) -> Result<(), MediatorError> {
        let fields = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("mls_number", &self.mls_number),
        ];
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MediatorError::MissingFields(missing))
        }
    }

    pub fn display_address(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street.trim(),
            self.city.trim(),
            self.state.trim(),
            self.zip.trim()
        )
    }
}

/// Photo attached to a search request
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    /// Base64 text encoding of `bytes`, as sent inline to the model
    pub encoded: String,
    pub mime_type: String,
}

impl ImageFile {
    pub fn from_bytes(bytes: Vec<u8>, mime_type: impl Into<String>) -> Result<Self, MediatorError> {
        let mime_type = mime_type.into();
        if bytes.is_empty() {
            return Err(MediatorError::InvalidImage("image payload is empty".to_string()));
        }
        if !mime_type.starts_with("image/") {
            return Err(MediatorError::InvalidImage(format!(
                "unsupported media type {mime_type}"
            )));
        }
        let encoded = STANDARD.encode(&bytes);
        Ok(Self {
            bytes,
            encoded,
            mime_type,
        })
    }

    /// Load an image from disk, guessing the media type from its extension
    pub async fn load(path: &Path) -> Result<Self, MediatorError> {
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .ok_or_else(|| {
                MediatorError::InvalidImage(format!("unknown media type for {}", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            MediatorError::InvalidImage(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_bytes(bytes, mime_type)
    }
}

/// A single link returned by a search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoSearchResult {
    pub title: String,
    pub url: String,
    /// Hostname without a leading `www.`
    pub source: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub summary: String,
    pub videos: Vec<VideoSearchResult>,
    pub found: bool,
}

impl SearchResponse {
    pub fn new(summary: String, videos: Vec<VideoSearchResult>) -> Self {
        let found = !videos.is_empty();
        Self {
            summary,
            videos,
            found,
        }
    }
}

/// A search the user chose to keep, optionally shared with other users
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedSearch {
    pub id: Uuid,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub details: PropertyDetails,
    pub response: SearchResponse,
    #[serde(default)]
    pub shared_with: Vec<String>,
}

impl SavedSearch {
    pub fn is_owned_by(&self, user: &str) -> bool {
        same_identity(&self.owner, user)
    }

    pub fn is_visible_to(&self, user: &str) -> bool {
        self.is_owned_by(user)
            || self
                .shared_with
                .iter()
                .any(|viewer| same_identity(viewer, user))
    }
}

/// Canonical form of a user identity: trimmed and lowercased
pub fn normalize_identity(user: &str) -> String {
    user.trim().to_lowercase()
}

fn same_identity(a: &str, b: &str) -> bool {
    normalize_identity(a) == normalize_identity(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maple_drive() -> PropertyDetails {
        PropertyDetails {
            street: "123 Maple Dr".to_string(),
            city: "Beverly Hills".to_string(),
            state: "CA".to_string(),
            zip: "90210".to_string(),
            mls_number: "MLS123".to_string(),
        }
    }

    #[test]
    fn complete_details_validate() {
        assert!(maple_drive().validate().is_ok());
    }

    #[test]
    fn blank_fields_are_reported_in_form_order() {
        let details = PropertyDetails {
            city: "   ".to_string(),
            mls_number: String::new(),
            ..maple_drive()
        };
        match details.validate() {
            Err(MediatorError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["city", "mls_number"]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn display_address_joins_fields() {
        assert_eq!(
            maple_drive().display_address(),
            "123 Maple Dr, Beverly Hills, CA 90210"
        );
    }

    #[test]
    fn image_requires_image_media_type() {
        assert!(ImageFile::from_bytes(vec![1, 2, 3], "application/pdf").is_err());
        assert!(ImageFile::from_bytes(Vec::new(), "image/png").is_err());

        let image = ImageFile::from_bytes(b"abc".to_vec(), "image/jpeg").unwrap();
        assert_eq!(image.encoded, "YWJj");
    }

    #[test]
    fn identities_ignore_case_and_padding() {
        let saved = SavedSearch {
            id: Uuid::new_v4(),
            owner: "Alice".to_string(),
            created_at: Utc::now(),
            title: "Maple".to_string(),
            details: maple_drive(),
            response: SearchResponse::default(),
            shared_with: vec!["bob@example.com".to_string()],
        };
        assert!(saved.is_owned_by(" alice "));
        assert!(!saved.is_owned_by("bob@example.com"));
        assert!(saved.is_visible_to("Bob@Example.com"));
        assert!(!saved.is_visible_to("carol"));
    }

    #[test]
    fn found_follows_videos() {
        assert!(!SearchResponse::new("nothing".to_string(), Vec::new()).found);
        let video = VideoSearchResult {
            title: "Tour".to_string(),
            url: "https://youtube.com/watch?v=xyz".to_string(),
            source: "youtube.com".to_string(),
        };
        assert!(SearchResponse::new("one".to_string(), vec![video]).found);
    }
}
