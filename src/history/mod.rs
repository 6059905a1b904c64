use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::MediatorError;
use crate::models::{normalize_identity, PropertyDetails, SavedSearch, SearchResponse};

/// Storage for saved searches.
///
/// Reads are allowed for the owner and for users the search was shared with;
/// every mutation is restricted to the owner.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn save(
        &self,
        owner: &str,
        title: Option<&str>,
        details: &PropertyDetails,
        response: &SearchResponse,
    ) -> Result<SavedSearch, MediatorError>;

    /// Searches owned by or shared with `user`, newest first
    async fn list(&self, user: &str) -> Result<Vec<SavedSearch>, MediatorError>;

    async fn get(&self, id: Uuid, user: &str) -> Result<SavedSearch, MediatorError>;

    async fn rename(&self, id: Uuid, user: &str, title: &str) -> Result<SavedSearch, MediatorError>;

    async fn share(&self, id: Uuid, user: &str, viewers: &[String]) -> Result<SavedSearch, MediatorError>;

    async fn delete(&self, id: Uuid, user: &str) -> Result<(), MediatorError>;
}

/// One pretty-printed JSON file per saved search
pub struct JsonFileHistory {
    dir: PathBuf,
}

impl JsonFileHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn write(&self, search: &SavedSearch) -> Result<(), MediatorError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))
            .map_err(MediatorError::Persistence)?;
        let json = serde_json::to_string_pretty(search)
            .context("Failed to encode saved search")
            .map_err(MediatorError::Persistence)?;
        let path = self.path_for(search.id);
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
            .map_err(MediatorError::Persistence)?;
        debug!(path = %path.display(), "saved search written");
        Ok(())
    }

    async fn read(&self, id: Uuid) -> Result<SavedSearch, MediatorError> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(MediatorError::NotFound(id));
            }
            Err(err) => {
                return Err(MediatorError::Persistence(
                    anyhow::Error::new(err).context(format!("Failed to read {}", path.display())),
                ));
            }
        };
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to decode {}", path.display()))
            .map_err(MediatorError::Persistence)
    }

    async fn read_owned(&self, id: Uuid, user: &str) -> Result<SavedSearch, MediatorError> {
        let search = self.read(id).await?;
        if search.is_owned_by(user) {
            Ok(search)
        } else if search.is_visible_to(user) {
            Err(MediatorError::NotOwner(id))
        } else {
            Err(MediatorError::NotFound(id))
        }
    }

    async fn read_all(&self) -> Result<Vec<SavedSearch>, MediatorError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(MediatorError::Persistence(
                    anyhow::Error::new(err).context(format!("Failed to list {}", self.dir.display())),
                ));
            }
        };

        let mut searches = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to list saved searches")
            .map_err(MediatorError::Persistence)?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_search_file(&path).await {
                Ok(search) => searches.push(search),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping unreadable saved search"),
            }
        }
        Ok(searches)
    }
}

async fn read_search_file(path: &Path) -> anyhow::Result<SavedSearch> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Trim, lowercase and dedupe viewer identities, never listing the owner
pub fn normalize_viewers(owner: &str, viewers: &[String]) -> Vec<String> {
    let owner = normalize_identity(owner);
    let mut normalized: Vec<String> = Vec::new();
    for viewer in viewers {
        let viewer = normalize_identity(viewer);
        if viewer.is_empty() || viewer == owner || normalized.contains(&viewer) {
            continue;
        }
        normalized.push(viewer);
    }
    normalized
}

fn default_title(details: &PropertyDetails) -> String {
    format!("{}, {}", details.street.trim(), details.city.trim())
}

#[async_trait]
impl HistoryStore for JsonFileHistory {
    async fn save(
        &self,
        owner: &str,
        title: Option<&str>,
        details: &PropertyDetails,
        response: &SearchResponse,
    ) -> Result<SavedSearch, MediatorError> {
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_title(details));
        let search = SavedSearch {
            id: Uuid::new_v4(),
            owner: normalize_identity(owner),
            created_at: Utc::now(),
            title,
            details: details.clone(),
            response: response.clone(),
            shared_with: Vec::new(),
        };
        self.write(&search).await?;
        info!(id = %search.id, owner = %search.owner, "search saved");
        Ok(search)
    }

    async fn list(&self, user: &str) -> Result<Vec<SavedSearch>, MediatorError> {
        let mut visible: Vec<SavedSearch> = self
            .read_all()
            .await?
            .into_iter()
            .filter(|search| search.is_visible_to(user))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible)
    }

    async fn get(&self, id: Uuid, user: &str) -> Result<SavedSearch, MediatorError> {
        let search = self.read(id).await?;
        if search.is_visible_to(user) {
            Ok(search)
        } else {
            Err(MediatorError::NotFound(id))
        }
    }

    async fn rename(&self, id: Uuid, user: &str, title: &str) -> Result<SavedSearch, MediatorError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(MediatorError::InvalidTitle("title cannot be empty".to_string()));
        }
        let mut search = self.read_owned(id, user).await?;
        search.title = title.to_string();
        self.write(&search).await?;
        info!(%id, "saved search renamed");
        Ok(search)
    }

    async fn share(&self, id: Uuid, user: &str, viewers: &[String]) -> Result<SavedSearch, MediatorError> {
        let mut search = self.read_owned(id, user).await?;
        search.shared_with = normalize_viewers(&search.owner, viewers);
        self.write(&search).await?;
        info!(%id, viewers = search.shared_with.len(), "saved search sharing updated");
        Ok(search)
    }

    async fn delete(&self, id: Uuid, user: &str) -> Result<(), MediatorError> {
        self.read_owned(id, user).await?;
        let path = self.path_for(id);
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))
            .map_err(MediatorError::Persistence)?;
        info!(%id, "saved search deleted");
        Ok(())
    }
}
