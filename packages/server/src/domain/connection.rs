//! Connection registry: the only source of truth for "which room and
//! identity does this connection stand for".
//!
//! Alongside the connection → membership map it keeps the reverse
//! identity → connection index so a ballot target can be located without
//! scanning every live connection.

use std::{
    collections::{BTreeMap, HashMap},
    net::IpAddr,
};

use super::value_object::{ConnectionId, PeerId, RoomId};

/// Room and identity a connection joined as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room: RoomId,
    pub peer: PeerId,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    /// Remote address of every open transport connection
    addresses: HashMap<ConnectionId, IpAddr>,
    /// Entry exists iff the connection completed `join` and is still open
    memberships: HashMap<ConnectionId, Membership>,
    /// Reverse index: room → peer → connection
    by_identity: HashMap<RoomId, BTreeMap<PeerId, ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly opened transport connection.
    pub fn open(&mut self, connection: ConnectionId, address: IpAddr) {
        self.addresses.insert(connection, address);
    }

    pub fn remote_address(&self, connection: &ConnectionId) -> Option<IpAddr> {
        self.addresses.get(connection).copied()
    }

    /// Record that `connection` joined `room` as `peer`.
    ///
    /// Any stale membership of the same connection is overwritten and
    /// returned.
    pub fn register(
        &mut self,
        connection: ConnectionId,
        room: RoomId,
        peer: PeerId,
    ) -> Option<Membership> {
        let stale = self.remove(&connection);

        self.by_identity
            .entry(room.clone())
            .or_default()
            .insert(peer.clone(), connection.clone());
        self.memberships
            .insert(connection, Membership { room, peer });

        stale
    }

    pub fn lookup(&self, connection: &ConnectionId) -> Option<&Membership> {
        self.memberships.get(connection)
    }

    /// Drop the membership of `connection`, keeping the transport open.
    pub fn remove(&mut self, connection: &ConnectionId) -> Option<Membership> {
        let membership = self.memberships.remove(connection)?;

        if let Some(peers) = self.by_identity.get_mut(&membership.room) {
            if peers.get(&membership.peer) == Some(connection) {
                peers.remove(&membership.peer);
            }
            if peers.is_empty() {
                self.by_identity.remove(&membership.room);
            }
        }

        Some(membership)
    }

    /// Forget `connection` entirely (transport disconnect).
    pub fn close(&mut self, connection: &ConnectionId) -> Option<Membership> {
        self.addresses.remove(connection);
        self.remove(connection)
    }

    pub fn find_by_identity(&self, room: &RoomId, peer: &PeerId) -> Option<&ConnectionId> {
        self.by_identity.get(room).and_then(|peers| peers.get(peer))
    }

    /// Connections currently joined to `room`, ordered by peer id.
    pub fn room_connections(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.by_identity
            .get(room)
            .map(|peers| peers.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn open_count(&self) -> usize {
        self.addresses.len()
    }
}
