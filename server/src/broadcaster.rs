//! Spectator connection registry, grounded directly in the teacher's
//! `broadcaster.rs`: an `Arc<Mutex<HashMap<id, sender>>>` that fans a
//! message out to every connected client, tolerating dead receivers.

use std::collections::HashMap;
use std::sync::Arc;

use arena_common::identifiers::ConnectionId;
use axum::extract::ws::{Message, Utf8Bytes};
use tokio::sync::Mutex;
use tokio::sync::mpsc;

pub type ClientSender = mpsc::UnboundedSender<Message>;

#[derive(Clone)]
pub struct Broadcaster {
    clients: Arc<Mutex<HashMap<ConnectionId, ClientSender>>>,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster").finish()
    }
}

impl Broadcaster {
    pub fn new() -> Self {
        Self { clients: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub async fn register(&self, id: ConnectionId, sender: ClientSender) {
        self.clients.lock().await.insert(id, sender);
    }

    pub async fn unregister(&self, id: &ConnectionId) {
        self.clients.lock().await.remove(id);
    }

    pub async fn connection_count(&self) -> u32 {
        self.clients.lock().await.len() as u32
    }

    pub async fn broadcast_json(&self, value: &serde_json::Value) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(_) => return,
        };
        let clients = self.clients.lock().await;
        for sender in clients.values() {
            let _ = sender.send(Message::Text(Utf8Bytes::from(text.clone())));
        }
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
