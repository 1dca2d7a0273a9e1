//! Outbound effects produced by the room registry.
//!
//! The registry never performs I/O; every reaction to an event is returned
//! as a list of [`Outbound`] effects for the caller to carry out in order.

use std::{collections::BTreeMap, time::Duration};

use super::{
    value_object::{ConnectionId, DisplayName, PeerId, RoomId},
    vote_kick::BallotTag,
};

/// Message delivered to one or more connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Error {
        message: String,
    },
    ExistingUsers {
        users: BTreeMap<PeerId, DisplayName>,
    },
    UserConnected {
        peer: PeerId,
        name: DisplayName,
    },
    JoinedRoom {
        room: RoomId,
        name: DisplayName,
    },
    ShareStarted {
        peer: PeerId,
    },
    ShareApproved,
    ShareDenied,
    ShareEnded,
    VoteStarted {
        target_name: DisplayName,
        target: PeerId,
    },
    VoteEnded,
    RemoveUser {
        peer: PeerId,
    },
    Chat {
        speaker: DisplayName,
        text: String,
        time: String,
    },
    UserDisconnected {
        peer: PeerId,
    },
}

impl Notification {
    pub fn error(message: impl ToString) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
}

/// One side effect requested by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Push {
        to: ConnectionId,
        notification: Notification,
    },
    Broadcast {
        targets: Vec<ConnectionId>,
        notification: Notification,
    },
    /// Close the connection once `after` has elapsed
    Disconnect {
        connection: ConnectionId,
        after: Duration,
    },
    /// Resolve ballot `tag` of `room` once `after` has elapsed
    ScheduleResolution {
        room: RoomId,
        tag: BallotTag,
        after: Duration,
    },
}
