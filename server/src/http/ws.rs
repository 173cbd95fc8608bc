//! `GET /ws`: the spectator feed. Grounded in the teacher's
//! `ws_handler.rs` split-sender/receiver shape, simplified for a
//! broadcast-only channel — spectators never send commands (spec §6).

use arena_common::identifiers::ConnectionId;
use arena_common::log;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::http::app_state::AppState;

pub async fn ws_upgrade_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_spectator(socket, state))
}

async fn handle_spectator(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let connection_id = ConnectionId::generate();
    state.broadcaster.register(connection_id.clone(), tx).await;
    log!("spectator connected: {}", connection_id);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }

    send_task.abort();
    state.broadcaster.unregister(&connection_id).await;
    log!("spectator disconnected: {}", connection_id);
}
