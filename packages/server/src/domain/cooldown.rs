//! Per-room vote cooldown.

use std::{collections::HashMap, time::Duration};

use super::value_object::{RoomId, Timestamp};

/// Next instant at which a room may start a new vote.
#[derive(Debug, Default)]
pub struct CooldownRegistry {
    next_allowed: HashMap<RoomId, Timestamp>,
}

impl CooldownRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `room` may vote again, `None` when eligible.
    pub fn remaining(&self, room: &RoomId, now: Timestamp) -> Option<Duration> {
        self.next_allowed
            .get(room)
            .and_then(|deadline| now.until(*deadline))
    }

    pub fn start(&mut self, room: RoomId, now: Timestamp, cooldown: Duration) {
        self.next_allowed.insert(room, now.plus(cooldown));
    }
}
