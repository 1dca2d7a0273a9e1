//! Domain entities.

use std::collections::BTreeMap;

use super::value_object::{DisplayName, PeerId, RoomId, Timestamp};

/// A room as published by the room catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomDefinition {
    pub id: RoomId,
    pub name: String,
    /// Shared room password; `None` (or empty) means open join
    pub password: Option<String>,
}

impl RoomDefinition {
    pub fn new(id: RoomId, name: impl Into<String>, password: Option<String>) -> Self {
        Self {
            id,
            name: name.into(),
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.password.is_some()
    }

    /// Exact-match password check.
    pub fn admits(&self, supplied: Option<&str>) -> bool {
        match &self.password {
            None => true,
            Some(expected) => supplied == Some(expected.as_str()),
        }
    }
}

/// Live state of one occupied room, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOverview {
    pub room: RoomId,
    pub members: BTreeMap<PeerId, DisplayName>,
    pub share_holder: Option<PeerId>,
    pub vote: Option<VoteOverview>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOverview {
    pub target: PeerId,
    pub yes: u32,
    pub no: u32,
    pub started_at: Timestamp,
}
