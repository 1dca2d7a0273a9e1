//! UseCase: ルーム調整
//!
//! 全てのルームイベント（接続・参加・チャット・画面共有・投票・切断）は
//! 1 つのタスクが順番に処理します。タスクは `RoomRegistry` を所有し、
//! レジストリが返す `Outbound` を実行します：
//!
//! - `Push` / `Broadcast`: `MessagePusher` 経由で送信
//! - `Disconnect`: 猶予時間の後に送信チャンネルを破棄（ソケットが閉じる）
//! - `ScheduleResolution`: 投票期間の後に `ResolveVote` を自分宛てに送る
//!
//! タイマーは同じキューに戻ってくるため、投票の解決も他のイベントと
//! 直列に処理されます。

use std::{net::IpAddr, sync::Arc};

use roomkeeper_shared::time::{Clock, format_clock_label};
use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    BallotTag, ConnectionId, EventTime, JoinRequest, MessagePusher, Notification, Outbound,
    PeerId, PusherChannel, RoomCatalogRepository, RoomDefinition, RoomId, RoomOverview,
    RoomRegistry, Timestamp, ValidationError,
};

use super::error::CoordinatorError;

enum Command {
    Connect {
        connection: ConnectionId,
        address: IpAddr,
        sender: PusherChannel,
    },
    Join {
        connection: ConnectionId,
        request: JoinRequest,
        room: Option<RoomDefinition>,
    },
    Chat {
        connection: ConnectionId,
        text: String,
    },
    RequestShare {
        connection: ConnectionId,
    },
    StopShare {
        connection: ConnectionId,
    },
    StartVote {
        connection: ConnectionId,
        target: PeerId,
    },
    SubmitVote {
        connection: ConnectionId,
        in_favor: bool,
    },
    Disconnect {
        connection: ConnectionId,
    },
    /// Input that never reached the registry (e.g. an invalid id)
    Reject {
        connection: ConnectionId,
        error: ValidationError,
    },
    ResolveVote {
        room: RoomId,
        tag: BallotTag,
    },
    Overview {
        reply: oneshot::Sender<Vec<RoomOverview>>,
    },
}

/// Handle to the room coordinator task.
///
/// Cheap to clone; the task stops once every handle is dropped.
#[derive(Clone)]
pub struct RoomCoordinator {
    commands: mpsc::UnboundedSender<Command>,
    catalog: Arc<dyn RoomCatalogRepository>,
}

impl RoomCoordinator {
    /// Spawn the coordinator task on the current runtime.
    ///
    /// `utc_offset_hours` is the offset of the clock label on chat messages.
    pub fn spawn(
        registry: RoomRegistry,
        catalog: Arc<dyn RoomCatalogRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        utc_offset_hours: i32,
    ) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();
        let worker = Worker {
            registry,
            message_pusher,
            clock,
            utc_offset_hours,
            timers: commands.downgrade(),
        };
        tokio::spawn(worker.run(inbox));

        Self { commands, catalog }
    }

    /// A socket opened from `address`; `sender` feeds its writer loop.
    pub fn connect(
        &self,
        connection: ConnectionId,
        address: IpAddr,
        sender: PusherChannel,
    ) -> Result<(), CoordinatorError> {
        self.send(Command::Connect {
            connection,
            address,
            sender,
        })
    }

    /// Looks the room up in the catalog, then queues the join.
    pub async fn join(
        &self,
        connection: ConnectionId,
        request: JoinRequest,
    ) -> Result<(), CoordinatorError> {
        let room = match self.catalog.find_room(&request.room).await {
            Ok(room) => room,
            Err(e) => {
                tracing::error!("Room catalog lookup for '{}' failed: {}", request.room, e);
                None
            }
        };
        self.send(Command::Join {
            connection,
            request,
            room,
        })
    }

    pub fn chat(&self, connection: ConnectionId, text: String) -> Result<(), CoordinatorError> {
        self.send(Command::Chat { connection, text })
    }

    pub fn request_share(&self, connection: ConnectionId) -> Result<(), CoordinatorError> {
        self.send(Command::RequestShare { connection })
    }

    pub fn stop_share(&self, connection: ConnectionId) -> Result<(), CoordinatorError> {
        self.send(Command::StopShare { connection })
    }

    pub fn start_vote(
        &self,
        connection: ConnectionId,
        target: PeerId,
    ) -> Result<(), CoordinatorError> {
        self.send(Command::StartVote { connection, target })
    }

    pub fn submit_vote(
        &self,
        connection: ConnectionId,
        in_favor: bool,
    ) -> Result<(), CoordinatorError> {
        self.send(Command::SubmitVote {
            connection,
            in_favor,
        })
    }

    /// The socket closed.
    pub fn disconnect(&self, connection: ConnectionId) -> Result<(), CoordinatorError> {
        self.send(Command::Disconnect { connection })
    }

    /// Send an `error` notice for input that could not be turned into an event.
    pub fn reject(
        &self,
        connection: ConnectionId,
        error: ValidationError,
    ) -> Result<(), CoordinatorError> {
        self.send(Command::Reject { connection, error })
    }

    /// Occupied rooms as seen after every event queued before this call.
    pub async fn overview(&self) -> Result<Vec<RoomOverview>, CoordinatorError> {
        let (reply, receiver) = oneshot::channel();
        self.send(Command::Overview { reply })?;
        receiver.await.map_err(|_| CoordinatorError::Stopped)
    }

    fn send(&self, command: Command) -> Result<(), CoordinatorError> {
        self.commands
            .send(command)
            .map_err(|_| CoordinatorError::Stopped)
    }
}

struct Worker {
    registry: RoomRegistry,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    utc_offset_hours: i32,
    /// Resolution timers post back through this; weak so it can't keep the task alive
    timers: mpsc::WeakUnboundedSender<Command>,
}

impl Worker {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = inbox.recv().await {
            let outbound = self.handle(command).await;
            self.apply(outbound).await;
        }
        tracing::debug!("Room coordinator stopped");
    }

    async fn handle(&mut self, command: Command) -> Vec<Outbound> {
        let now = self.now();
        match command {
            Command::Connect {
                connection,
                address,
                sender,
            } => {
                self.message_pusher
                    .register_client(connection.clone(), sender)
                    .await;
                self.registry.connect(connection, address, &now)
            }
            Command::Join {
                connection,
                request,
                room,
            } => self.registry.join(connection, request, room, &now),
            Command::Chat { connection, text } => self.registry.chat(&connection, &text, &now),
            Command::RequestShare { connection } => self.registry.request_share(&connection),
            Command::StopShare { connection } => self.registry.stop_share(&connection),
            Command::StartVote { connection, target } => {
                self.registry.start_vote(&connection, target, &now)
            }
            Command::SubmitVote {
                connection,
                in_favor,
            } => self.registry.submit_vote(&connection, in_favor),
            Command::Disconnect { connection } => {
                self.message_pusher.unregister_client(&connection).await;
                self.registry.disconnect(&connection)
            }
            Command::Reject { connection, error } => {
                tracing::debug!("Rejected input from '{}': {}", connection, error);
                vec![Outbound::Push {
                    to: connection,
                    notification: Notification::error(error),
                }]
            }
            Command::ResolveVote { room, tag } => self.registry.resolve_vote(&room, tag, &now),
            Command::Overview { reply } => {
                if reply.send(self.registry.overview()).is_err() {
                    tracing::debug!("Overview requester went away");
                }
                Vec::new()
            }
        }
    }

    async fn apply(&self, outbound: Vec<Outbound>) {
        for effect in outbound {
            match effect {
                Outbound::Push { to, notification } => {
                    if let Err(e) = self.message_pusher.push_to(&to, &notification).await {
                        tracing::warn!("Failed to notify connection '{}': {}", to, e);
                    }
                }
                Outbound::Broadcast {
                    targets,
                    notification,
                } => {
                    if targets.is_empty() {
                        continue;
                    }
                    if let Err(e) = self.message_pusher.broadcast(targets, &notification).await {
                        tracing::warn!("Failed to broadcast: {}", e);
                    }
                }
                Outbound::Disconnect { connection, after } => {
                    let message_pusher = Arc::clone(&self.message_pusher);
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        tracing::info!("Force closing connection '{}'", connection);
                        message_pusher.unregister_client(&connection).await;
                    });
                }
                Outbound::ScheduleResolution { room, tag, after } => {
                    let timers = self.timers.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let Some(commands) = timers.upgrade() else {
                            return;
                        };
                        if commands.send(Command::ResolveVote { room, tag }).is_err() {
                            tracing::debug!("Coordinator gone before ballot {} resolved", tag.value());
                        }
                    });
                }
            }
        }
    }

    fn now(&self) -> EventTime {
        let millis = self.clock.now_millis();
        EventTime::new(
            Timestamp::new(millis),
            format_clock_label(millis, self.utc_offset_hours),
        )
    }
}
