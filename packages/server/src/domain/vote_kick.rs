//! Vote-kick ballots: one optional live ballot per room.
//!
//! Each room is either idle (no entry) or voting (one [`Ballot`]). Every
//! ballot carries a [`BallotTag`] so a resolution timer can tell whether the
//! ballot it was scheduled for is still the live one.

use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};

use super::{
    cooldown::CooldownRegistry,
    error::PolicyError,
    value_object::{DisplayName, PeerId, RoomId, Timestamp, ceil_units},
};

/// Generation tag identifying one ballot instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallotTag(u64);

impl BallotTag {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    pub tag: BallotTag,
    pub target: PeerId,
    /// Target name at the time the vote started
    pub target_name: DisplayName,
    pub yes: u32,
    /// Starts at 1: the target's automatic vote against its own removal
    pub no: u32,
    pub voters: BTreeSet<PeerId>,
    pub created_at: Timestamp,
}

/// What happened to a submitted vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteReceipt {
    Recorded,
    NoActiveBallot,
}

/// Final counts of a resolved ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub room: RoomId,
    pub target: PeerId,
    pub target_name: DisplayName,
    pub yes: u32,
    pub no: u32,
}

impl Verdict {
    /// Strict majority: a tie keeps the target.
    pub fn kicked(&self) -> bool {
        self.yes > self.no
    }
}

#[derive(Debug, Default)]
pub struct VoteKickController {
    ballots: HashMap<RoomId, Ballot>,
    last_tag: u64,
}

impl VoteKickController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a ballot against `target` in `room`.
    ///
    /// Fails while the room is cooling down or already voting.
    pub fn start(
        &mut self,
        cooldowns: &CooldownRegistry,
        room: &RoomId,
        target: PeerId,
        target_name: DisplayName,
        now: Timestamp,
    ) -> Result<&Ballot, PolicyError> {
        if let Some(remaining) = cooldowns.remaining(room, now) {
            return Err(PolicyError::CooldownActive {
                remaining_secs: ceil_units(remaining, Duration::from_secs(1)),
            });
        }
        if self.ballots.contains_key(room) {
            return Err(PolicyError::BallotInProgress);
        }

        self.last_tag += 1;
        let ballot = Ballot {
            tag: BallotTag(self.last_tag),
            target,
            target_name,
            yes: 0,
            no: 1,
            voters: BTreeSet::new(),
            created_at: now,
        };

        Ok(self.ballots.entry(room.clone()).or_insert(ballot))
    }

    /// Count one vote from `voter`. The target and repeat voters are refused.
    pub fn submit(
        &mut self,
        room: &RoomId,
        voter: &PeerId,
        in_favor: bool,
    ) -> Result<VoteReceipt, PolicyError> {
        let Some(ballot) = self.ballots.get_mut(room) else {
            return Ok(VoteReceipt::NoActiveBallot);
        };
        if &ballot.target == voter {
            return Err(PolicyError::TargetCannotVote);
        }
        if !ballot.voters.insert(voter.clone()) {
            return Err(PolicyError::AlreadyVoted);
        }

        if in_favor {
            ballot.yes += 1;
        } else {
            ballot.no += 1;
        }
        Ok(VoteReceipt::Recorded)
    }

    /// Close the ballot tagged `tag` and start the room's cooldown.
    ///
    /// Returns `None` without touching anything when the room has no ballot
    /// or its ballot is a different instance than `tag`.
    pub fn resolve(
        &mut self,
        cooldowns: &mut CooldownRegistry,
        room: &RoomId,
        tag: BallotTag,
        now: Timestamp,
        cooldown: Duration,
    ) -> Option<Verdict> {
        if self.ballots.get(room).map(|ballot| ballot.tag) != Some(tag) {
            return None;
        }
        let ballot = self.ballots.remove(room)?;
        cooldowns.start(room.clone(), now, cooldown);

        Some(Verdict {
            room: room.clone(),
            target: ballot.target,
            target_name: ballot.target_name,
            yes: ballot.yes,
            no: ballot.no,
        })
    }

    pub fn active(&self, room: &RoomId) -> Option<&Ballot> {
        self.ballots.get(room)
    }
}
