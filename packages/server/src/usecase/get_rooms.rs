//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{RoomCatalogRepository, RoomDefinition};

use super::error::GetRoomsError;

pub struct GetRoomsUseCase {
    catalog: Arc<dyn RoomCatalogRepository>,
}

impl GetRoomsUseCase {
    pub fn new(catalog: Arc<dyn RoomCatalogRepository>) -> Self {
        Self { catalog }
    }

    /// Rooms in catalog order.
    pub async fn execute(&self) -> Result<Vec<RoomDefinition>, GetRoomsError> {
        Ok(self.catalog.list_rooms().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::RoomId, infrastructure::repository::InMemoryRoomCatalog};

    #[tokio::test]
    async fn test_get_rooms_returns_catalog() {
        // テスト項目: カタログの部屋一覧がそのまま返される
        // given (前提条件):
        let catalog = Arc::new(InMemoryRoomCatalog::new(vec![
            RoomDefinition::new(RoomId::new("a".to_string()).unwrap(), "A", None),
            RoomDefinition::new(RoomId::new("b".to_string()).unwrap(), "B", None),
        ]));
        let usecase = GetRoomsUseCase::new(catalog);

        // when (操作):
        let rooms = usecase.execute().await.unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|room| room.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
