//! HTTP API response DTOs.

use serde::Serialize;

/// One entry of `GET /api/rooms`.
///
/// The password itself is never exposed, only whether one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub name: String,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub id: String,
    pub members: Vec<MemberDto>,
    pub share_holder: Option<String>,
    pub vote: Option<VoteStateDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    pub peer_id: String,
    pub nickname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStateDto {
    pub target_id: String,
    pub yes: u32,
    pub no: u32,
    /// RFC 3339
    pub started_at: String,
}
