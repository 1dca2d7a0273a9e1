//! Repository trait for the room catalog.
//!
//! The catalog (room id, name, password) is owned by an external source;
//! the coordinator only reads it.

use async_trait::async_trait;

use super::{RepositoryError, RoomDefinition, RoomId};

#[async_trait]
pub trait RoomCatalogRepository: Send + Sync {
    /// Look up one room by id.
    async fn find_room(&self, id: &RoomId) -> Result<Option<RoomDefinition>, RepositoryError>;

    /// All rooms, in catalog order.
    async fn list_rooms(&self) -> Result<Vec<RoomDefinition>, RepositoryError>;
}
