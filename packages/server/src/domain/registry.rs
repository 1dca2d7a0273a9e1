//! The room registry aggregate.
//!
//! Owns every coordination table (connections, presence, screen-share lock,
//! ballots, cooldowns and bans) and exposes one method per inbound event.
//! Each method runs to completion synchronously and returns the effects the
//! caller has to perform. Keeping the aggregate behind a single owner gives
//! the serializability the tables rely on.

use std::{net::IpAddr, time::Duration};

use rand::{SeedableRng, rngs::StdRng};

use super::{
    ban::BanRegistry,
    connection::{ConnectionRegistry, Membership},
    cooldown::CooldownRegistry,
    entity::{RoomDefinition, RoomOverview, VoteOverview},
    error::{CoordinationError, PolicyError, ValidationError},
    notification::{Notification, Outbound},
    policy::ModerationPolicy,
    presence::PresenceTable,
    screen_share::{ScreenShareLock, ShareDecision},
    value_object::{ConnectionId, DisplayName, EventTime, PeerId, RoomId, ceil_units},
    vote_kick::{BallotTag, VoteKickController, VoteReceipt},
};

/// A `join` as received from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room: RoomId,
    pub peer: PeerId,
    pub desired_name: DisplayName,
    pub password: Option<String>,
}

pub struct RoomRegistry {
    policy: ModerationPolicy,
    connections: ConnectionRegistry,
    presence: PresenceTable,
    screen_share: ScreenShareLock,
    votes: VoteKickController,
    cooldowns: CooldownRegistry,
    bans: BanRegistry,
    /// Source of display-name suffixes
    rng: StdRng,
}

impl RoomRegistry {
    pub fn new(policy: ModerationPolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    pub fn with_rng(policy: ModerationPolicy, rng: StdRng) -> Self {
        Self {
            policy,
            connections: ConnectionRegistry::new(),
            presence: PresenceTable::new(),
            screen_share: ScreenShareLock::new(),
            votes: VoteKickController::new(),
            cooldowns: CooldownRegistry::new(),
            bans: BanRegistry::new(),
            rng,
        }
    }

    /// A transport connection opened from `address`.
    pub fn connect(
        &mut self,
        connection: ConnectionId,
        address: IpAddr,
        now: &EventTime,
    ) -> Vec<Outbound> {
        self.connections.open(connection.clone(), address);
        tracing::info!(
            "New connection '{}' from {} ({} open)",
            connection,
            address,
            self.connections.open_count()
        );

        self.reject_if_banned(&connection, address, now)
            .unwrap_or_default()
    }

    /// `room` is the catalog entry for `request.room`, if the catalog knows it.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        request: JoinRequest,
        room: Option<RoomDefinition>,
        now: &EventTime,
    ) -> Vec<Outbound> {
        let Some(address) = self.connections.remote_address(&connection) else {
            tracing::warn!("Join from unknown connection '{}' ignored", connection);
            return Vec::new();
        };
        if let Some(rejection) = self.reject_if_banned(&connection, address, now) {
            return rejection;
        }

        if let Err(e) = self.validate_join(&connection, &request, room.as_ref()) {
            return vec![push_error(connection, e)];
        }

        let mut outbound = Vec::new();
        if let Some(previous) = self.connections.remove(&connection) {
            outbound.extend(self.leave(&previous));
        }

        let JoinRequest {
            room,
            peer,
            desired_name,
            ..
        } = request;
        let assigned = match self
            .presence
            .join(&room, peer.clone(), desired_name, &mut self.rng)
        {
            Ok(name) => name,
            Err(e) => {
                outbound.push(push_error(connection, e));
                return outbound;
            }
        };
        let others = self.connections.room_connections(&room);
        self.connections
            .register(connection.clone(), room.clone(), peer.clone());
        tracing::info!(
            "Peer '{}' joined room '{}' as '{}'",
            peer,
            room,
            assigned
        );

        outbound.push(Outbound::Push {
            to: connection.clone(),
            notification: Notification::ExistingUsers {
                users: self.presence.snapshot(&room),
            },
        });
        outbound.push(Outbound::Broadcast {
            targets: others,
            notification: Notification::UserConnected {
                peer,
                name: assigned.clone(),
            },
        });
        outbound.push(Outbound::Push {
            to: connection.clone(),
            notification: Notification::JoinedRoom {
                room: room.clone(),
                name: assigned,
            },
        });
        if let Some(holder) = self.screen_share.holder(&room) {
            outbound.push(Outbound::Push {
                to: connection,
                notification: Notification::ShareStarted {
                    peer: holder.clone(),
                },
            });
        }

        outbound
    }

    pub fn chat(&mut self, connection: &ConnectionId, text: &str, now: &EventTime) -> Vec<Outbound> {
        let Some(Membership { room, peer }) = self.membership(connection, "chat-message") else {
            return Vec::new();
        };
        let Some(speaker) = self.presence.display_name(&room, &peer).cloned() else {
            tracing::warn!("Peer '{}' has no display name in room '{}'", peer, room);
            return Vec::new();
        };

        vec![self.broadcast(
            &room,
            Notification::Chat {
                speaker,
                text: escape_html(text),
                time: now.label.clone(),
            },
        )]
    }

    pub fn request_share(&mut self, connection: &ConnectionId) -> Vec<Outbound> {
        let Some(Membership { room, peer }) = self.membership(connection, "request-share") else {
            return Vec::new();
        };

        match self.screen_share.request(&room, &peer) {
            ShareDecision::Approved => vec![
                Outbound::Push {
                    to: connection.clone(),
                    notification: Notification::ShareApproved,
                },
                self.broadcast(&room, Notification::ShareStarted { peer }),
            ],
            ShareDecision::Denied => vec![Outbound::Push {
                to: connection.clone(),
                notification: Notification::ShareDenied,
            }],
        }
    }

    pub fn stop_share(&mut self, connection: &ConnectionId) -> Vec<Outbound> {
        let Some(Membership { room, peer }) = self.membership(connection, "stop-share") else {
            return Vec::new();
        };

        if self.screen_share.stop(&room, &peer) {
            vec![self.broadcast(&room, Notification::ShareEnded)]
        } else {
            Vec::new()
        }
    }

    pub fn start_vote(
        &mut self,
        connection: &ConnectionId,
        target: PeerId,
        now: &EventTime,
    ) -> Vec<Outbound> {
        let Some(Membership { room, peer }) = self.membership(connection, "start-vote") else {
            return Vec::new();
        };
        if target == peer {
            return vec![push_error(connection.clone(), PolicyError::SelfTarget)];
        }
        let Some(target_name) = self.presence.display_name(&room, &target).cloned() else {
            return vec![push_error(
                connection.clone(),
                ValidationError::UnknownPeer(target.into_string()),
            )];
        };

        let tag = match self
            .votes
            .start(&self.cooldowns, &room, target.clone(), target_name.clone(), now.at)
        {
            Ok(ballot) => ballot.tag,
            Err(e) => return vec![push_error(connection.clone(), e)],
        };
        tracing::info!(
            "Peer '{}' started a vote against '{}' in room '{}'",
            peer,
            target,
            room
        );

        vec![
            self.broadcast(
                &room,
                Notification::VoteStarted {
                    target_name,
                    target,
                },
            ),
            Outbound::ScheduleResolution {
                room,
                tag,
                after: self.policy.vote_duration,
            },
        ]
    }

    pub fn submit_vote(&mut self, connection: &ConnectionId, in_favor: bool) -> Vec<Outbound> {
        let Some(Membership { room, peer }) = self.membership(connection, "submit-vote") else {
            return Vec::new();
        };

        match self.votes.submit(&room, &peer, in_favor) {
            Ok(VoteReceipt::Recorded) => {
                tracing::debug!("Vote from '{}' recorded in room '{}'", peer, room);
                Vec::new()
            }
            Ok(VoteReceipt::NoActiveBallot) => Vec::new(),
            Err(e) => vec![push_error(connection.clone(), e)],
        }
    }

    /// Fired by the resolution timer of ballot `tag`.
    pub fn resolve_vote(&mut self, room: &RoomId, tag: BallotTag, now: &EventTime) -> Vec<Outbound> {
        let Some(verdict) = self.votes.resolve(
            &mut self.cooldowns,
            room,
            tag,
            now.at,
            self.policy.cooldown,
        ) else {
            tracing::debug!(
                "Ignoring stale resolution of ballot {} in room '{}'",
                tag.value(),
                room
            );
            return Vec::new();
        };
        tracing::info!(
            "Vote result for room '{}': yes {} no {}",
            room,
            verdict.yes,
            verdict.no
        );

        let mut outbound = vec![self.broadcast(room, Notification::VoteEnded)];

        if !verdict.kicked() {
            outbound.push(self.broadcast(
                room,
                system_chat(
                    format!(
                        "Vote failed. {} stays. (Yes: {}, No: {})",
                        verdict.target_name, verdict.yes, verdict.no
                    ),
                    now,
                ),
            ));
            return outbound;
        }

        outbound.push(self.broadcast(
            room,
            system_chat(
                format!("{} was removed by majority vote.", verdict.target_name),
                now,
            ),
        ));
        outbound.push(self.broadcast(
            room,
            Notification::RemoveUser {
                peer: verdict.target.clone(),
            },
        ));

        let target_connection = self
            .connections
            .find_by_identity(room, &verdict.target)
            .cloned();
        let Some(target_connection) = target_connection else {
            tracing::warn!(
                "Could not locate connection of '{}' in room '{}' to ban; it may have disconnected already",
                verdict.target,
                room
            );
            return outbound;
        };

        match self.connections.remote_address(&target_connection) {
            Some(address) => {
                self.bans.ban(address, self.policy.ban_duration, now.at);
                tracing::info!(
                    "Banned {} for {:?} (user '{}')",
                    address,
                    self.policy.ban_duration,
                    verdict.target_name
                );
            }
            None => tracing::warn!(
                "Connection '{}' has no remote address; skipping ban",
                target_connection
            ),
        }
        outbound.push(Outbound::Push {
            to: target_connection.clone(),
            notification: Notification::error("You were removed from the room by vote."),
        });
        outbound.push(Outbound::Disconnect {
            connection: target_connection,
            after: self.policy.kick_grace,
        });

        outbound
    }

    /// The transport connection closed.
    pub fn disconnect(&mut self, connection: &ConnectionId) -> Vec<Outbound> {
        match self.connections.close(connection) {
            Some(membership) => {
                tracing::info!(
                    "Connection '{}' ({} in '{}') disconnected",
                    connection,
                    membership.peer,
                    membership.room
                );
                self.leave(&membership)
            }
            None => {
                tracing::debug!("Connection '{}' closed before joining", connection);
                Vec::new()
            }
        }
    }

    /// Occupied rooms with their roster, lock holder and running vote.
    pub fn overview(&self) -> Vec<RoomOverview> {
        let mut rooms: Vec<RoomOverview> = self
            .presence
            .occupied_rooms()
            .map(|room| RoomOverview {
                room: room.clone(),
                members: self.presence.snapshot(room),
                share_holder: self.screen_share.holder(room).cloned(),
                vote: self.votes.active(room).map(|ballot| VoteOverview {
                    target: ballot.target.clone(),
                    yes: ballot.yes,
                    no: ballot.no,
                    started_at: ballot.created_at,
                }),
            })
            .collect();
        rooms.sort_by(|a, b| a.room.cmp(&b.room));
        rooms
    }

    fn validate_join(
        &self,
        connection: &ConnectionId,
        request: &JoinRequest,
        room: Option<&RoomDefinition>,
    ) -> Result<(), ValidationError> {
        let room = room.ok_or(ValidationError::RoomNotFound)?;
        if !room.admits(request.password.as_deref()) {
            return Err(ValidationError::InvalidPassword);
        }
        match self.connections.find_by_identity(&request.room, &request.peer) {
            Some(owner) if owner != connection => Err(ValidationError::PeerAlreadyPresent(
                request.peer.as_str().to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn reject_if_banned(
        &self,
        connection: &ConnectionId,
        address: IpAddr,
        now: &EventTime,
    ) -> Option<Vec<Outbound>> {
        let remaining = self.bans.is_banned(&address, now.at)?;
        tracing::info!("Blocked banned connection '{}' from {}", connection, address);

        let error = CoordinationError::Banned {
            remaining_minutes: ceil_units(remaining, Duration::from_secs(60)),
        };
        Some(vec![
            push_error(connection.clone(), error),
            Outbound::Disconnect {
                connection: connection.clone(),
                after: self.policy.ban_rejection_grace,
            },
        ])
    }

    /// Cleanup of a membership that was already removed from the
    /// connection registry.
    fn leave(&mut self, membership: &Membership) -> Vec<Outbound> {
        let Membership { room, peer } = membership;
        self.presence.leave(room, peer);

        let mut outbound = Vec::new();
        if self.screen_share.stop(room, peer) {
            outbound.push(self.broadcast(room, Notification::ShareEnded));
        }
        outbound.push(self.broadcast(
            room,
            Notification::UserDisconnected { peer: peer.clone() },
        ));
        outbound
    }

    fn membership(&self, connection: &ConnectionId, event: &str) -> Option<Membership> {
        let membership = self.connections.lookup(connection).cloned();
        if membership.is_none() {
            tracing::debug!(
                "Ignoring '{}' from connection '{}' that has not joined",
                event,
                connection
            );
        }
        membership
    }

    fn broadcast(&self, room: &RoomId, notification: Notification) -> Outbound {
        Outbound::Broadcast {
            targets: self.connections.room_connections(room),
            notification,
        }
    }
}

fn push_error(connection: ConnectionId, error: impl Into<CoordinationError>) -> Outbound {
    Outbound::Push {
        to: connection,
        notification: Notification::error(error.into()),
    }
}

fn system_chat(text: String, now: &EventTime) -> Notification {
    Notification::Chat {
        speaker: DisplayName::system(),
        text,
        time: now.label.clone(),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
