//! End-to-end tests driving a live server over real WebSocket connections.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use stickyboard::server::{EngineHandle, ServerOptions, bind_server};
use stickyboard::sync::ServerMessage;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    engine: EngineHandle,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn start_server() -> TestServer {
    let options = ServerOptions {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_any: true,
    };
    let server = bind_server(&options).await.unwrap();
    let addr = server.local_addr();
    let engine = server.engine().clone();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server.run(async {
        let _ = rx.await;
    }));
    TestServer {
        addr,
        engine,
        shutdown: Some(tx),
    }
}

async fn connect(server: &TestServer) -> Client {
    let url = format!("ws://{}/ws", server.addr);
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn send(ws: &mut Client, event: &str, data: serde_json::Value) {
    let frame = serde_json::json!({ "event": event, "data": data }).to_string();
    ws.send(Message::Text(frame)).await.unwrap();
}

async fn join(ws: &mut Client, name: &str) {
    send(ws, "user:join", serde_json::json!({ "name": name })).await;
}

async fn recv(ws: &mut Client) -> ServerMessage {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a server event")
            .expect("socket closed")
            .unwrap();
        if let Message::Text(text) = next {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Assert nothing else arrives within a short window.
async fn assert_quiet(ws: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(next.is_err(), "unexpected frame: {:?}", next);
}

fn names(msg: &ServerMessage) -> Vec<String> {
    match msg {
        ServerMessage::PresenceUsers { users } => users.iter().map(|u| u.name.clone()).collect(),
        other => panic!("Expected presence:users, got {:?}", other),
    }
}

async fn http_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        path, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_two_party_editing_session() {
    let server = start_server().await;

    // alice joins and loads an empty board
    let mut alice = connect(&server).await;
    join(&mut alice, "alice").await;
    assert_eq!(names(&recv(&mut alice).await), vec!["alice"]);
    send(&mut alice, "board:init", serde_json::Value::Null).await;
    match recv(&mut alice).await {
        ServerMessage::BoardData { notes } => assert!(notes.is_empty()),
        other => panic!("Expected board:data, got {:?}", other),
    }

    // bob joins; both see the new roster
    let mut bob = connect(&server).await;
    join(&mut bob, "bob").await;
    assert_eq!(names(&recv(&mut bob).await), vec!["alice", "bob"]);
    assert_eq!(names(&recv(&mut alice).await), vec!["alice", "bob"]);

    // alice creates a note; both receive it
    let draft = serde_json::json!({ "title": "Plan" });
    send(&mut alice, "note:create", draft).await;
    let created = match recv(&mut alice).await {
        ServerMessage::NoteCreated(note) => note,
        other => panic!("Expected note:created, got {:?}", other),
    };
    assert_eq!(created.title, "Plan");
    assert_eq!(created.z_index, 1);
    assert_eq!(created.updated_by, "alice");
    assert!(created.editing.is_none());
    match recv(&mut bob).await {
        ServerMessage::NoteCreated(note) => assert_eq!(note.id, created.id),
        other => panic!("Expected note:created, got {:?}", other),
    }

    // bob takes the edit lock
    send(
        &mut bob,
        "note:editing",
        serde_json::json!({ "noteId": created.id, "isEditing": true }),
    )
    .await;
    for ws in [&mut alice, &mut bob] {
        match recv(ws).await {
            ServerMessage::NoteUpdated(note) => {
                assert_eq!(note.id, created.id);
                assert_eq!(note.editing.as_deref(), Some("bob"));
                assert!(note.z_index > created.z_index);
            }
            other => panic!("Expected note:updated, got {:?}", other),
        }
    }

    // alice cannot steal it; her next comment is the next thing anyone sees
    send(
        &mut alice,
        "note:editing",
        serde_json::json!({ "noteId": created.id, "isEditing": true }),
    )
    .await;
    send(
        &mut alice,
        "note:comment",
        serde_json::json!({ "noteId": created.id, "text": "looks good" }),
    )
    .await;
    for ws in [&mut alice, &mut bob] {
        match recv(ws).await {
            ServerMessage::NoteCommented { note_id, comment } => {
                assert_eq!(note_id, created.id);
                assert_eq!(comment.user, "alice");
                assert_eq!(comment.text, "looks good");
            }
            other => panic!("Expected note:commented, got {:?}", other),
        }
    }

    // bob drops; his lock is released before the roster shrinks
    bob.close(None).await.unwrap();
    match recv(&mut alice).await {
        ServerMessage::NoteUpdated(note) => {
            assert_eq!(note.id, created.id);
            assert!(note.editing.is_none());
        }
        other => panic!("Expected note:updated, got {:?}", other),
    }
    assert_eq!(names(&recv(&mut alice).await), vec!["alice"]);

    // a late snapshot carries the comment and no lock
    send(&mut alice, "board:init", serde_json::Value::Null).await;
    match recv(&mut alice).await {
        ServerMessage::BoardData { notes } => {
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].comments.len(), 1);
            assert!(notes[0].editing.is_none());
        }
        other => panic!("Expected board:data, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_frame_only_errors_sender() {
    let server = start_server().await;
    let mut alice = connect(&server).await;
    let mut bob = connect(&server).await;

    alice
        .send(Message::Text("this is not json".to_string()))
        .await
        .unwrap();
    match recv(&mut alice).await {
        ServerMessage::ServerError { message } => assert!(!message.is_empty()),
        other => panic!("Expected server:error, got {:?}", other),
    }
    assert_quiet(&mut bob).await;

    // the connection stays usable
    send(&mut alice, "board:init", serde_json::Value::Null).await;
    assert!(matches!(
        recv(&mut alice).await,
        ServerMessage::BoardData { .. }
    ));
}

#[tokio::test]
async fn test_delete_reaches_everyone() {
    let server = start_server().await;
    let mut alice = connect(&server).await;
    let mut bob = connect(&server).await;

    send(&mut alice, "note:create", serde_json::json!({})).await;
    let note = match recv(&mut alice).await {
        ServerMessage::NoteCreated(note) => note,
        other => panic!("Expected note:created, got {:?}", other),
    };
    assert_eq!(note.updated_by, "unknown");
    let _ = recv(&mut bob).await;

    let target = serde_json::json!({ "id": note.id });
    send(&mut bob, "note:delete", target).await;
    for ws in [&mut alice, &mut bob] {
        match recv(ws).await {
            ServerMessage::NoteDeleted { id } => assert_eq!(id, note.id),
            other => panic!("Expected note:deleted, got {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_http_status_and_health() {
    let server = start_server().await;

    let status = http_get(server.addr, "/").await;
    assert!(status.starts_with("HTTP/1.1 200"));
    assert!(status.contains("Board server running"));

    let mut alice = connect(&server).await;
    join(&mut alice, "alice").await;
    let _ = recv(&mut alice).await;
    assert_eq!(server.engine.stats().connections, 1);
    assert_eq!(server.engine.stats().board.users, 1);

    let health = http_get(server.addr, "/health").await;
    assert!(health.starts_with("HTTP/1.1 200"));
    let body = health.split("\r\n\r\n").nth(1).unwrap();
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["connections"], 1);
    assert_eq!(json["users"], 1);
    assert_eq!(json["notes"], 0);
}

#[tokio::test]
async fn test_port_in_use_is_an_error() {
    let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let options = ServerOptions {
        host: "127.0.0.1".to_string(),
        port: taken.local_addr().unwrap().port(),
        cors_any: false,
    };
    assert!(bind_server(&options).await.is_err());
}
