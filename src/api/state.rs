use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::AppConfig;
use crate::room::{Action, Outcome, Room};
use crate::roster::Member;
use crate::ws::{WsEvent, WsManager};

use super::errors::ApiError;
use super::models::{RoomResponse, room_to_response};

/// Rooms stored by UUID.
pub type RoomStore = RwLock<HashMap<String, Room>>;

/// Shared application state passed to all handlers via Axum's State extractor.
pub struct AppState {
    pub rooms: RoomStore,
    pub config: AppConfig,
    pub start_time: std::time::Instant,
    pub ws: Arc<WsManager>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(AppState {
            rooms: RwLock::new(HashMap::new()),
            config,
            start_time: std::time::Instant::now(),
            ws: WsManager::new(),
        })
    }

    /// Resolve an access key to a member.
    pub fn authenticate(&self, key: Option<&str>) -> Result<Member, ApiError> {
        key.and_then(|k| self.config.roster.authenticate(k))
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }

    /// Create an empty room.
    pub async fn create_room(&self, name: &str) -> RoomResponse {
        let room = Room::new(name, self.config.history_limit);
        info!(room = %room.id, name, "room created");
        let response = room_to_response(&room);
        self.rooms.write().await.insert(room.id.clone(), room);
        response
    }

    /// Apply an action to a room and push the results to its subscribers.
    ///
    /// Events are broadcast before the room lock is released, so every
    /// subscriber sees them in the order the actions were applied.
    pub async fn dispatch(
        &self,
        room_id: &str,
        member: &Member,
        action: Action,
    ) -> Result<(Outcome, RoomResponse), ApiError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| ApiError::RoomNotFound(room_id.to_string()))?;

        let outcome = room.apply(member, action)?;
        for event in WsEvent::for_outcome(room, &outcome) {
            self.ws.broadcast(room_id, event).await;
        }
        Ok((outcome, room_to_response(room)))
    }
}
