//! JSON file room catalog
//!
//! The file is a JSON array of `{"id", "name", "password"}` objects. It is
//! re-read on every lookup so edits take effect without a restart.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    domain::{RepositoryError, RoomCatalogRepository, RoomDefinition, RoomId},
    infrastructure::dto::catalog::RoomEntry,
};

use super::fallback_rooms;

pub struct JsonFileRoomCatalog {
    path: PathBuf,
}

impl JsonFileRoomCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Vec<RoomDefinition>, RepositoryError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    "Could not read room catalog {}: {}; serving the fallback lobby",
                    self.path.display(),
                    e
                );
                return Ok(fallback_rooms());
            }
        };

        let entries: Vec<RoomEntry> = serde_json::from_str(&raw)
            .map_err(|e| RepositoryError::Malformed(format!("{}: {}", self.path.display(), e)))?;

        let rooms = entries
            .into_iter()
            .filter_map(|entry| {
                let id = entry.id.clone();
                match RoomDefinition::try_from(entry) {
                    Ok(room) => Some(room),
                    Err(e) => {
                        tracing::warn!("Skipping catalog entry '{}': {}", id, e);
                        None
                    }
                }
            })
            .collect();
        Ok(rooms)
    }
}

#[async_trait]
impl RoomCatalogRepository for JsonFileRoomCatalog {
    async fn find_room(&self, id: &RoomId) -> Result<Option<RoomDefinition>, RepositoryError> {
        let rooms = self.load().await?;
        Ok(rooms.into_iter().find(|room| &room.id == id))
    }

    async fn list_rooms(&self) -> Result<Vec<RoomDefinition>, RepositoryError> {
        self.load().await
    }
}
