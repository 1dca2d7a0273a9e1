//! Room presence table with display-name de-duplication.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use super::{
    error::ValidationError,
    value_object::{DisplayName, PeerId, RoomId},
};

/// Random suffixes are drawn from `0..SUFFIX_RANGE`.
const SUFFIX_RANGE: u32 = 1000;
/// Random draws before falling back to a sequential scan.
const RANDOM_ATTEMPTS: usize = 64;

/// Per-room `peer → display name` table.
///
/// Display names are pairwise distinct inside a room.
#[derive(Debug, Default)]
pub struct PresenceTable {
    rooms: HashMap<RoomId, BTreeMap<PeerId, DisplayName>>,
}

impl PresenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `peer` to `room`, returning the display name it was assigned.
    ///
    /// If `desired` is taken, a random `_<n>` suffix is appended until the
    /// name is unique in the room. The server's own speaker name counts as taken.
    pub fn join<R: Rng + ?Sized>(
        &mut self,
        room: &RoomId,
        peer: PeerId,
        desired: DisplayName,
        rng: &mut R,
    ) -> Result<DisplayName, ValidationError> {
        let members = self.rooms.entry(room.clone()).or_default();
        if members.contains_key(&peer) {
            return Err(ValidationError::PeerAlreadyPresent(peer.into_string()));
        }

        let assigned = unique_name(members, desired, rng);
        members.insert(peer, assigned.clone());
        Ok(assigned)
    }

    pub fn leave(&mut self, room: &RoomId, peer: &PeerId) -> Option<DisplayName> {
        let members = self.rooms.get_mut(room)?;
        let name = members.remove(peer);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        name
    }

    /// Current roster of `room`.
    pub fn snapshot(&self, room: &RoomId) -> BTreeMap<PeerId, DisplayName> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    pub fn display_name(&self, room: &RoomId, peer: &PeerId) -> Option<&DisplayName> {
        self.rooms.get(room).and_then(|members| members.get(peer))
    }

    /// Rooms with at least one member.
    pub fn occupied_rooms(&self) -> impl Iterator<Item = &RoomId> {
        self.rooms.keys()
    }
}

fn unique_name<R: Rng + ?Sized>(
    members: &BTreeMap<PeerId, DisplayName>,
    desired: DisplayName,
    rng: &mut R,
) -> DisplayName {
    let system = DisplayName::system();
    let taken = |candidate: &DisplayName| {
        *candidate == system || members.values().any(|name| name == candidate)
    };

    if !taken(&desired) {
        return desired;
    }

    for _ in 0..RANDOM_ATTEMPTS {
        let candidate = desired.with_suffix(rng.gen_range(0..SUFFIX_RANGE));
        if !taken(&candidate) {
            return candidate;
        }
    }

    // The room holds finitely many names, so this terminates.
    let mut suffix = SUFFIX_RANGE;
    loop {
        let candidate = desired.with_suffix(suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
