//! Conversion logic between DTOs and domain types.

use roomkeeper_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    Notification, RoomDefinition, RoomId, RoomOverview, ValueObjectError,
};
use crate::infrastructure::dto::{
    catalog::RoomEntry,
    http::{MemberDto, RoomStateDto, RoomSummaryDto, VoteStateDto},
    websocket::ServerMessage,
};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<RoomEntry> for RoomDefinition {
    type Error = ValueObjectError;

    /// A missing name falls back to the room id.
    fn try_from(entry: RoomEntry) -> Result<Self, Self::Error> {
        let name = entry.name.unwrap_or_else(|| entry.id.clone());
        let id = RoomId::new(entry.id)?;
        Ok(RoomDefinition::new(id, name, entry.password))
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<Notification> for ServerMessage {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::Error { message } => Self::Error { message },
            Notification::ExistingUsers { users } => Self::ExistingUsers {
                users: users
                    .into_iter()
                    .map(|(peer, name)| (peer.into_string(), name.into_string()))
                    .collect(),
            },
            Notification::UserConnected { peer, name } => Self::UserConnected {
                peer_id: peer.into_string(),
                nickname: name.into_string(),
            },
            Notification::JoinedRoom { room, name } => Self::JoinedRoom {
                room_id: room.into_string(),
                nickname: name.into_string(),
            },
            Notification::ShareStarted { peer } => Self::ShareStarted {
                peer_id: peer.into_string(),
            },
            Notification::ShareApproved => Self::ShareApproved,
            Notification::ShareDenied => Self::ShareDenied,
            Notification::ShareEnded => Self::ShareEnded,
            Notification::VoteStarted {
                target_name,
                target,
            } => Self::VoteStarted {
                target_name: target_name.into_string(),
                target_id: target.into_string(),
            },
            Notification::VoteEnded => Self::VoteEnded,
            Notification::RemoveUser { peer } => Self::RemoveUser {
                peer_id: peer.into_string(),
            },
            Notification::Chat {
                speaker,
                text,
                time,
            } => Self::ChatMessage {
                user: speaker.into_string(),
                text,
                time,
            },
            Notification::UserDisconnected { peer } => Self::UserDisconnected {
                peer_id: peer.into_string(),
            },
        }
    }
}

impl From<&RoomDefinition> for RoomSummaryDto {
    fn from(room: &RoomDefinition) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            name: room.name.clone(),
            is_locked: room.is_locked(),
        }
    }
}

impl RoomStateDto {
    pub fn from_overview(overview: RoomOverview, utc_offset_hours: i32) -> Self {
        Self {
            id: overview.room.into_string(),
            members: overview
                .members
                .into_iter()
                .map(|(peer, name)| MemberDto {
                    peer_id: peer.into_string(),
                    nickname: name.into_string(),
                })
                .collect(),
            share_holder: overview.share_holder.map(|peer| peer.into_string()),
            vote: overview.vote.map(|vote| VoteStateDto {
                target_id: vote.target.into_string(),
                yes: vote.yes,
                no: vote.no,
                started_at: timestamp_to_rfc3339(vote.started_at.value(), utc_offset_hours),
            }),
        }
    }
}
