//! Per-room exclusive screen-share lock.

use std::collections::HashMap;

use super::value_object::{PeerId, RoomId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareDecision {
    Approved,
    Denied,
}

#[derive(Debug, Default)]
pub struct ScreenShareLock {
    holders: HashMap<RoomId, PeerId>,
}

impl ScreenShareLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant the lock when it is free or already held by `peer`.
    pub fn request(&mut self, room: &RoomId, peer: &PeerId) -> ShareDecision {
        match self.holders.get(room) {
            Some(holder) if holder != peer => ShareDecision::Denied,
            _ => {
                self.holders.insert(room.clone(), peer.clone());
                ShareDecision::Approved
            }
        }
    }

    /// Release the lock if `peer` holds it. Returns whether it was released.
    pub fn stop(&mut self, room: &RoomId, peer: &PeerId) -> bool {
        if self.holders.get(room) == Some(peer) {
            self.holders.remove(room);
            true
        } else {
            false
        }
    }

    pub fn holder(&self, room: &RoomId) -> Option<&PeerId> {
        self.holders.get(room)
    }
}
