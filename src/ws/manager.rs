//! WebSocket connection manager: tracks who is connected to which room and
//! pushes events to them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use super::messages::WsEvent;

/// Sending half of a client's queue. The handler owns the receiving half.
pub type ClientSender = mpsc::UnboundedSender<WsEvent>;

/// A unique ID assigned to each connected WebSocket client.
pub type ClientId = u64;

#[derive(Debug)]
struct Client {
    member_id: String,
    tx: ClientSender,
}

/// Per-room sets of connected clients.
#[derive(Debug)]
pub struct WsManager {
    /// room_id → { client_id → client }
    rooms: RwLock<HashMap<String, HashMap<ClientId, Client>>>,
    next_id: AtomicU64,
}

impl WsManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a client of `member_id` in a room, returning (client_id, receiver).
    pub async fn subscribe(
        &self,
        room_id: &str,
        member_id: &str,
    ) -> (ClientId, mpsc::UnboundedReceiver<WsEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut rooms = self.rooms.write().await;
        rooms.entry(room_id.to_string()).or_default().insert(
            id,
            Client {
                member_id: member_id.to_string(),
                tx,
            },
        );

        debug!(room_id, member_id, client_id = id, "WS client subscribed");
        (id, rx)
    }

    /// Remove a client from a room.
    pub async fn unsubscribe(&self, room_id: &str, client_id: ClientId) {
        let mut rooms = self.rooms.write().await;
        if let Some(clients) = rooms.get_mut(room_id) {
            clients.remove(&client_id);
            if clients.is_empty() {
                rooms.remove(room_id);
            }
        }
        debug!(room_id, client_id, "WS client unsubscribed");
    }

    /// Drop every client of a room; their writers see a closed queue.
    pub async fn close_room(&self, room_id: &str) {
        if let Some(clients) = self.rooms.write().await.remove(room_id) {
            debug!(room_id, clients = clients.len(), "closed room connections");
        }
    }

    /// Send an event to every client in a room.
    pub async fn broadcast(&self, room_id: &str, event: WsEvent) {
        let rooms = self.rooms.read().await;
        let Some(clients) = rooms.get(room_id) else {
            return;
        };
        let stale: Vec<ClientId> = clients
            .iter()
            .filter(|(_, c)| c.tx.send(event.clone()).is_err())
            .map(|(&cid, _)| cid)
            .collect();
        drop(rooms); // release read lock before write

        if !stale.is_empty() {
            self.remove_stale(room_id, &stale).await;
        }
    }

    /// Send an event to a single client.
    pub async fn send_to(&self, room_id: &str, client_id: ClientId, event: WsEvent) {
        let rooms = self.rooms.read().await;
        let sent = rooms
            .get(room_id)
            .and_then(|clients| clients.get(&client_id))
            .map(|c| c.tx.send(event).is_ok());
        drop(rooms);

        if sent == Some(false) {
            self.remove_stale(room_id, &[client_id]).await;
        }
    }

    async fn remove_stale(&self, room_id: &str, stale: &[ClientId]) {
        let mut rooms = self.rooms.write().await;
        if let Some(clients) = rooms.get_mut(room_id) {
            for cid in stale {
                clients.remove(cid);
                warn!(room_id, client_id = cid, "removed stale WS client");
            }
            if clients.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    /// Number of clients connected to a room.
    pub async fn subscriber_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map_or(0, |c| c.len())
    }

    /// Distinct member ids connected to a room, sorted.
    pub async fn watchers(&self, room_id: &str) -> Vec<String> {
        let rooms = self.rooms.read().await;
        let mut ids: Vec<String> = rooms
            .get(room_id)
            .map(|clients| clients.values().map(|c| c.member_id.clone()).collect())
            .unwrap_or_default();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Total number of active connections across all rooms.
    pub async fn total_connections(&self) -> usize {
        let rooms = self.rooms.read().await;
        rooms.values().map(|c| c.len()).sum()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
