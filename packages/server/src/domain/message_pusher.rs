//! MessagePusher trait
//!
//! Delivery of notifications to connected clients. The concrete transport
//! lives in the infrastructure layer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, Notification};

/// Channel feeding one client's writer loop with serialized frames.
///
/// Dropping every sender ends the writer loop, which closes the socket.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    /// Forget the client's channel; its socket closes once the writer drains.
    async fn unregister_client(&self, connection: &ConnectionId);

    async fn push_to(
        &self,
        connection: &ConnectionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// Deliver to every target; individual failures are logged, not returned.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;
}
