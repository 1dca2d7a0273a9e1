//! Room catalog file entries.

use serde::Deserialize;

/// One room of the catalog file: `{"id": "...", "name": "...", "password": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomEntry {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}
