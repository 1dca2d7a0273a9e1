//! WebSocket connection handlers.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, DisplayName, JoinRequest, PeerId, RoomId, ValidationError, ValueObjectError,
    },
    infrastructure::dto::websocket::ClientMessage,
    ui::{client_ip::resolve_client_ip, state::AppState},
    usecase::{CoordinatorError, RoomCoordinator},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let address = resolve_client_ip(&headers, peer, state.trust_forwarded_headers);
    ws.on_upgrade(move |socket| handle_socket(socket, state, address))
}

/// Spawns a task that writes every frame queued for this connection to the socket.
///
/// The channel closing means the server dropped the connection (kick or
/// ban); a Close frame is sent before the task ends.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        if let Err(e) = sender.send(Message::Close(None)).await {
            tracing::debug!("Close frame not delivered: {}", e);
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, address: IpAddr) {
    let connection = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    if let Err(e) = state.coordinator.connect(connection.clone(), address, tx) {
        tracing::error!("Dropping connection from {}: {}", address, e);
        return;
    }

    let coordinator = state.coordinator.clone();
    let reader = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", reader, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    if let Err(e) = dispatch(&coordinator, &reader, text.as_str()).await {
                        tracing::error!("Stopping reader of '{}': {}", reader, e);
                        break;
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", reader);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.coordinator.disconnect(connection.clone()) {
        tracing::warn!("Failed to clean up connection '{}': {}", connection, e);
    }
}

/// Route one inbound frame to the coordinator.
///
/// Malformed frames are logged and dropped; frames with invalid ids get an
/// `error` notice.
async fn dispatch(
    coordinator: &RoomCoordinator,
    connection: &ConnectionId,
    text: &str,
) -> Result<(), CoordinatorError> {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Ignoring malformed frame from '{}': {}", connection, e);
            return Ok(());
        }
    };
    let connection = connection.clone();

    match message {
        ClientMessage::JoinRoom {
            room_id,
            peer_id,
            nickname,
            password,
        } => match join_request(room_id, peer_id, nickname, password) {
            Ok(request) => coordinator.join(connection, request).await,
            Err(e) => coordinator.reject(connection, ValidationError::from(e)),
        },
        ClientMessage::ChatMessage { text } => coordinator.chat(connection, text),
        ClientMessage::RequestShare => coordinator.request_share(connection),
        ClientMessage::StopShare => coordinator.stop_share(connection),
        ClientMessage::StartVote { target_id } => match PeerId::try_from(target_id) {
            Ok(target) => coordinator.start_vote(connection, target),
            Err(e) => coordinator.reject(connection, ValidationError::from(e)),
        },
        ClientMessage::SubmitVote { vote } => coordinator.submit_vote(connection, vote),
    }
}

fn join_request(
    room_id: String,
    peer_id: String,
    nickname: String,
    password: Option<String>,
) -> Result<JoinRequest, ValueObjectError> {
    Ok(JoinRequest {
        room: RoomId::try_from(room_id)?,
        peer: PeerId::try_from(peer_id)?,
        desired_name: DisplayName::try_from(nickname.trim().to_string())?,
        password,
    })
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use roomkeeper_shared::time::SystemClock;
    use serde_json::Value;

    use super::*;
    use crate::{
        domain::{ModerationPolicy, RoomRegistry},
        infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomCatalog},
    };

    fn start_coordinator() -> RoomCoordinator {
        RoomCoordinator::spawn(
            RoomRegistry::new(ModerationPolicy::default()),
            Arc::new(InMemoryRoomCatalog::with_lobby()),
            Arc::new(WebSocketMessagePusher::default()),
            Arc::new(SystemClock),
            0,
        )
    }

    fn connect(
        coordinator: &RoomCoordinator,
        id: &str,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection = ConnectionId::new(id.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        coordinator
            .connect(
                connection.clone(),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                tx,
            )
            .unwrap();
        (connection, rx)
    }

    async fn next_frame(rx: &mut mpsc::UnboundedReceiver<String>) -> Value {
        let frame = rx.recv().await.expect("connection still open");
        serde_json::from_str(&frame).unwrap()
    }

    #[tokio::test]
    async fn test_join_with_blank_peer_id_gets_invalid_input_notice() {
        // テスト項目: peerId が空白の join-room は入力エラーとして error 通知される
        // given (前提条件):
        let coordinator = start_coordinator();
        let (connection, mut rx) = connect(&coordinator, "c-1");
        let frame = r#"{"type":"join-room","roomId":"lobby","peerId":"  ","nickname":"Alice"}"#;

        // when (操作):
        dispatch(&coordinator, &connection, frame).await.unwrap();

        // then (期待する結果):
        let expected = ValidationError::InvalidInput(ValueObjectError::Empty("peer id"));
        let notice = next_frame(&mut rx).await;
        assert_eq!(notice["type"], "error");
        assert_eq!(notice["message"], expected.to_string());
        let overview = coordinator.overview().await.unwrap();
        assert!(overview.is_empty());
    }

    #[tokio::test]
    async fn test_start_vote_with_blank_target_gets_invalid_input_notice() {
        // given (前提条件):
        let coordinator = start_coordinator();
        let (connection, mut rx) = connect(&coordinator, "c-1");

        // when (操作):
        dispatch(&coordinator, &connection, r#"{"type":"start-vote","targetId":""}"#)
            .await
            .unwrap();

        // then (期待する結果):
        let notice = next_frame(&mut rx).await;
        assert_eq!(notice["type"], "error");
        assert_eq!(notice["message"], "peer id must not be empty");
    }

    #[test]
    fn test_join_request_from_frame_fields() {
        // テスト項目: join-room の各フィールドが値オブジェクトに変換される
        let request = join_request(
            "lobby".to_string(),
            "p-1".to_string(),
            "  Alice ".to_string(),
            None,
        )
        .unwrap();

        assert_eq!(request.room.as_str(), "lobby");
        assert_eq!(request.desired_name.as_str(), "Alice");
    }

    #[test]
    fn test_join_request_rejects_blank_peer() {
        let result = join_request(
            "lobby".to_string(),
            "".to_string(),
            "Alice".to_string(),
            None,
        );

        assert_eq!(result.unwrap_err(), ValueObjectError::Empty("peer id"));
    }
}
