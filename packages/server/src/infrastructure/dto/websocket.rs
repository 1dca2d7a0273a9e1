//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object tagged by `type` in kebab-case, with
//! camelCase fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Frame sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinRoom {
        room_id: String,
        peer_id: String,
        nickname: String,
        #[serde(default)]
        password: Option<String>,
    },
    ChatMessage {
        text: String,
    },
    RequestShare,
    StopShare,
    StartVote {
        target_id: String,
    },
    SubmitVote {
        vote: bool,
    },
}

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Error {
        message: String,
    },
    /// peer id -> display name, the joiner included
    ExistingUsers {
        users: BTreeMap<String, String>,
    },
    UserConnected {
        peer_id: String,
        nickname: String,
    },
    JoinedRoom {
        room_id: String,
        nickname: String,
    },
    ShareStarted {
        peer_id: String,
    },
    ShareApproved,
    ShareDenied,
    ShareEnded,
    VoteStarted {
        target_name: String,
        target_id: String,
    },
    VoteEnded,
    RemoveUser {
        peer_id: String,
    },
    ChatMessage {
        user: String,
        text: String,
        time: String,
    },
    UserDisconnected {
        peer_id: String,
    },
}
