//! Domain layer: room coordination state and the seams it depends on.

mod ban;
mod connection;
mod cooldown;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod notification;
pub mod policy;
mod presence;
pub mod registry;
pub mod repository;
mod screen_share;
pub mod value_object;
mod vote_kick;

pub use entity::{RoomDefinition, RoomOverview, VoteOverview};
pub use error::{
    CoordinationError, MessagePushError, PolicyError, RepositoryError, ValidationError,
    ValueObjectError,
};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::{Notification, Outbound};
pub use policy::ModerationPolicy;
pub use registry::{JoinRequest, RoomRegistry};
pub use repository::RoomCatalogRepository;
pub use value_object::{ConnectionId, DisplayName, EventTime, PeerId, RoomId, Timestamp};
pub use vote_kick::BallotTag;

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
