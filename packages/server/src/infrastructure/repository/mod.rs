//! Room catalog repository implementations.

mod inmemory;
mod json_file;

pub use inmemory::InMemoryRoomCatalog;
pub use json_file::JsonFileRoomCatalog;

use crate::domain::{RoomDefinition, RoomId};

/// Id of the open room served when no catalog is available.
pub const FALLBACK_ROOM_ID: &str = "lobby";

/// Single open room used when no catalog is configured or it can't be read.
pub fn fallback_rooms() -> Vec<RoomDefinition> {
    match RoomId::new(FALLBACK_ROOM_ID.to_string()) {
        Ok(id) => vec![RoomDefinition::new(id, "Lobby", None)],
        Err(_) => Vec::new(),
    }
}
