//! WebSocket handler bridging one client to the engine task

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};

use super::http::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let Some((conn, mut outbound)) = state.engine.connect().await else {
        tracing::warn!("engine stopped; refusing connection");
        return;
    };
    let (mut sender, mut receiver) = socket.split();

    // Forward engine events to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    // Feed client frames to the engine in arrival order
    let engine = state.engine.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    if !engine.frame(conn, text).await {
                        break;
                    }
                }
                Message::Close(_) => break,
                // Axum answers pings itself
                Message::Ping(data) => tracing::trace!(conn, "Received ping: {:?}", data),
                Message::Pong(_) => {}
                Message::Binary(_) => tracing::debug!(conn, "ignoring binary frame"),
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    // Abrupt or clean, every exit path ends here
    state.engine.disconnect(conn).await;
}
