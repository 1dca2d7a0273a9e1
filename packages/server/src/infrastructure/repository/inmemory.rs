//! InMemory room catalog
//!
//! Fixed list of rooms held in memory. Used in tests and when no catalog
//! file is configured.

use async_trait::async_trait;

use crate::domain::{RepositoryError, RoomCatalogRepository, RoomDefinition, RoomId};

use super::fallback_rooms;

pub struct InMemoryRoomCatalog {
    rooms: Vec<RoomDefinition>,
}

impl InMemoryRoomCatalog {
    pub fn new(rooms: Vec<RoomDefinition>) -> Self {
        Self { rooms }
    }

    /// Catalog with the single open `lobby` room.
    pub fn with_lobby() -> Self {
        Self::new(fallback_rooms())
    }
}

#[async_trait]
impl RoomCatalogRepository for InMemoryRoomCatalog {
    async fn find_room(&self, id: &RoomId) -> Result<Option<RoomDefinition>, RepositoryError> {
        Ok(self.rooms.iter().find(|room| &room.id == id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<RoomDefinition>, RepositoryError> {
        Ok(self.rooms.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_id(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_find_room() {
        // テスト項目: 登録済みの部屋は見つかり、未登録の部屋は None になる
        // given (前提条件):
        let catalog = InMemoryRoomCatalog::new(vec![
            RoomDefinition::new(room_id("lobby"), "Lobby", None),
            RoomDefinition::new(room_id("vault"), "Vault", Some("s3cret".to_string())),
        ]);

        // when (操作):
        let found = catalog.find_room(&room_id("vault")).await.unwrap();
        let missing = catalog.find_room(&room_id("attic")).await.unwrap();

        // then (期待する結果):
        assert_eq!(found.map(|room| room.name), Some("Vault".to_string()));
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_with_lobby_lists_single_open_room() {
        let catalog = InMemoryRoomCatalog::with_lobby();

        let rooms = catalog.list_rooms().await.unwrap();

        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].id.as_str(), "lobby");
        assert!(!rooms[0].is_locked());
    }
}
