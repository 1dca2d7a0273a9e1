//! End-to-end tests against a real server on an ephemeral port.
//!
//! ## テスト作業記録
//!
//! ### 何をテストしているか
//! - WebSocket のフレーム形式（type タグ、camelCase）
//! - HTTP API（health / rooms / debug）
//! - 投票による追放からソケットの切断と BAN までの一連の流れ
//!
//! ### どのような状況を想定しているか
//! - 複数クライアントが x-forwarded-for で別々の IP として接続する
//! - 投票期間や猶予時間はテスト用に短く設定する

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use futures_util::{SinkExt, StreamExt};
use roomkeeper_server::{config::ServerConfig, domain::ModerationPolicy, ui::Server};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest, http::HeaderValue},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

fn fast_policy() -> ModerationPolicy {
    ModerationPolicy {
        vote_duration: Duration::from_millis(300),
        cooldown: Duration::from_secs(2),
        ban_duration: Duration::from_secs(60),
        kick_grace: Duration::from_millis(100),
        ban_rejection_grace: Duration::from_millis(100),
    }
}

async fn spawn_server(rooms_file: Option<PathBuf>) -> SocketAddr {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        rooms_file,
        policy: fast_policy(),
        trust_forwarded_headers: true,
        utc_offset_hours: 0,
    };
    let server = Server::from_config(&config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.serve(listener, std::future::pending()));
    addr
}

fn rooms_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "roomkeeper-e2e-{}-{}.json",
        name,
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"[{"id": "lobby", "name": "Lobby"}, {"id": "vault", "name": "Vault", "password": "s3cret"}]"#,
    )
    .unwrap();
    path
}

/// Open a socket that claims to come from `ip`.
async fn connect(addr: SocketAddr, ip: &'static str) -> Socket {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    request
        .headers_mut()
        .insert("x-forwarded-for", HeaderValue::from_static(ip));
    let (socket, _) = connect_async(request).await.unwrap();
    socket
}

async fn send(socket: &mut Socket, frame: Value) {
    socket
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Next JSON frame, or `None` once the server closed the socket.
async fn recv(socket: &mut Socket) -> Option<Value> {
    loop {
        let next = tokio::time::timeout(WAIT, socket.next())
            .await
            .expect("timed out waiting for a frame");
        match next {
            Some(Ok(Message::Text(text))) => return Some(serde_json::from_str(&text).unwrap()),
            Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return None,
            Some(Ok(_)) => continue,
        }
    }
}

async fn recv_type(socket: &mut Socket, kind: &str) -> Value {
    loop {
        let frame = recv(socket).await.expect("socket closed");
        if frame["type"] == kind {
            return frame;
        }
    }
}

async fn join(socket: &mut Socket, peer: &str, nickname: &str) -> Value {
    send(
        socket,
        json!({"type": "join-room", "roomId": "lobby", "peerId": peer, "nickname": nickname}),
    )
    .await;
    recv_type(socket, "joined-room").await
}

#[tokio::test]
async fn test_http_api() {
    // テスト項目: health と部屋一覧が JSON で返され、パスワードは公開されない
    // given (前提条件):
    let path = rooms_file("http");
    let addr = spawn_server(Some(path.clone())).await;
    let client = reqwest::Client::new();

    // when (操作):
    let health: Value = client
        .get(format!("http://{addr}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rooms: Value = client
        .get(format!("http://{addr}/api/rooms"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(
        rooms,
        json!([
            {"id": "lobby", "name": "Lobby", "isLocked": false},
            {"id": "vault", "name": "Vault", "isLocked": true}
        ])
    );
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn test_join_chat_and_duplicate_names() {
    // テスト項目: 同じ名前の参加者には接尾辞が付き、チャットは全員に届く
    // given (前提条件):
    let addr = spawn_server(None).await;
    let mut alice = connect(addr, "198.51.100.1").await;
    let mut other = connect(addr, "198.51.100.2").await;
    join(&mut alice, "p-a", "Alice").await;

    // when (操作):
    let joined = join(&mut other, "p-b", "Alice").await;
    send(&mut alice, json!({"type": "chat-message", "text": "<hi>"})).await;

    // then (期待する結果):
    let assigned = joined["nickname"].as_str().unwrap().to_string();
    assert!(assigned.starts_with("Alice_"));
    let connected = recv_type(&mut alice, "user-connected").await;
    assert_eq!(connected, json!({"type": "user-connected", "peerId": "p-b", "nickname": assigned}));

    let chat = recv_type(&mut other, "chat-message").await;
    assert_eq!(chat["user"], "Alice");
    assert_eq!(chat["text"], "&lt;hi&gt;");
    assert_eq!(recv_type(&mut alice, "chat-message").await, chat);

    let debug: Value = reqwest::get(format!("http://{addr}/debug/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(debug[0]["id"], "lobby");
    assert_eq!(debug[0]["members"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_wrong_password_and_malformed_frames() {
    // テスト項目: 不正なフレームは無視され、パスワード違いはエラーになる
    // given (前提条件):
    let path = rooms_file("password");
    let addr = spawn_server(Some(path.clone())).await;
    let mut socket = connect(addr, "198.51.100.3").await;

    // when (操作):
    send(&mut socket, json!({"type": "no-such-event"})).await;
    socket
        .send(Message::Text("definitely not json".into()))
        .await
        .unwrap();
    send(
        &mut socket,
        json!({"type": "join-room", "roomId": "vault", "peerId": "p-1", "nickname": "Eve", "password": "guess"}),
    )
    .await;

    // then (期待する結果):
    let error = recv(&mut socket).await.unwrap();
    assert_eq!(error, json!({"type": "error", "message": "Invalid password"}));

    send(
        &mut socket,
        json!({"type": "join-room", "roomId": "vault", "peerId": "p-1", "nickname": "Eve", "password": "s3cret"}),
    )
    .await;
    assert_eq!(recv_type(&mut socket, "joined-room").await["roomId"], "vault");
    std::fs::remove_file(path).unwrap();
}

#[tokio::test]
async fn test_screen_share_lock() {
    // テスト項目: 画面共有は 1 人だけが許可され、停止後は他の人が取得できる
    let addr = spawn_server(None).await;
    let mut alice = connect(addr, "198.51.100.4").await;
    let mut bob = connect(addr, "198.51.100.5").await;
    join(&mut alice, "p-a", "Alice").await;
    join(&mut bob, "p-b", "Bob").await;

    send(&mut alice, json!({"type": "request-share"})).await;
    recv_type(&mut alice, "share-approved").await;
    assert_eq!(recv_type(&mut bob, "share-started").await["peerId"], "p-a");

    send(&mut bob, json!({"type": "request-share"})).await;
    recv_type(&mut bob, "share-denied").await;

    send(&mut alice, json!({"type": "stop-share"})).await;
    recv_type(&mut bob, "share-ended").await;
    send(&mut bob, json!({"type": "request-share"})).await;
    recv_type(&mut bob, "share-approved").await;
}

#[tokio::test]
async fn test_vote_kick_disconnects_and_bans() {
    // テスト項目: 過半数で追放された参加者は切断され、同じ IP からの再接続は拒否される
    // given (前提条件):
    let addr = spawn_server(None).await;
    let mut alice = connect(addr, "198.51.100.10").await;
    let mut bob = connect(addr, "198.51.100.11").await;
    let mut carol = connect(addr, "198.51.100.12").await;
    join(&mut alice, "p-a", "Alice").await;
    join(&mut bob, "p-b", "Bob").await;
    join(&mut carol, "p-c", "Carol").await;

    // when (操作):
    send(&mut alice, json!({"type": "start-vote", "targetId": "p-b"})).await;
    recv_type(&mut carol, "vote-started").await;
    send(&mut alice, json!({"type": "submit-vote", "vote": true})).await;
    send(&mut carol, json!({"type": "submit-vote", "vote": true})).await;

    // then (期待する結果):
    recv_type(&mut alice, "vote-ended").await;
    let verdict = recv(&mut alice).await.unwrap();
    assert_eq!(verdict["text"], "Bob was removed by majority vote.");
    assert_eq!(
        recv(&mut alice).await.unwrap(),
        json!({"type": "remove-user", "peerId": "p-b"})
    );

    let notice = recv_type(&mut bob, "error").await;
    assert_eq!(notice["message"], "You were removed from the room by vote.");
    while recv(&mut bob).await.is_some() {}
    assert_eq!(
        recv_type(&mut alice, "user-disconnected").await["peerId"],
        "p-b"
    );

    let mut again = connect(addr, "198.51.100.11").await;
    let rejected = recv(&mut again).await.unwrap();
    assert_eq!(
        rejected["message"],
        "You have been removed from this room. Try again in 1 minute(s)."
    );
    assert!(recv(&mut again).await.is_none());

    // クールダウン中の投票開始は拒否される
    send(&mut alice, json!({"type": "start-vote", "targetId": "p-c"})).await;
    let cooldown = recv_type(&mut alice, "error").await;
    assert!(
        cooldown["message"]
            .as_str()
            .unwrap()
            .ends_with("before starting another vote.")
    );
}
