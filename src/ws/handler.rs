//! WebSocket upgrade handler: connects a member to a room's live event
//! stream and feeds their commands into the room.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::state::SharedState;
use crate::engine::Square;
use crate::room::Action;
use crate::roster::Member;

use super::manager::ClientId;
use super::messages::{WsCommand, WsEvent};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub key: Option<String>,
}

/// GET /ws/rooms/{id}?key=...: upgrade to WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    Query(query): Query<WsQuery>,
    State(state): State<SharedState>,
) -> Result<Response, ApiError> {
    let member = state.authenticate(query.key.as_deref())?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id, member, state)))
}

/// Core WebSocket session logic.
async fn handle_socket(socket: WebSocket, room_id: String, member: Member, state: SharedState) {
    // Enter the room and register under the same lock, so the snapshot in
    // `subscribed` and the first broadcast this client sees line up.
    let joined = {
        let mut rooms = state.rooms.write().await;
        match rooms.get_mut(&room_id) {
            Some(room) => {
                let outcome = room.apply(&member, Action::Enter).unwrap_or_default();
                for event in WsEvent::for_outcome(room, &outcome) {
                    state.ws.broadcast(&room_id, event).await;
                }
                let (client_id, rx) = state.ws.subscribe(&room_id, &member.id).await;
                let online = state.ws.watchers(&room_id).await;
                Some((client_id, rx, WsEvent::subscribed(room, &member, &online)))
            }
            None => None,
        }
    };

    let Some((client_id, mut rx, initial_event)) = joined else {
        let (mut sink, _) = socket.split();
        let err = WsEvent::error(&format!("room not found: {room_id}"));
        let _ = sink.send(Message::Text(err.to_json().into())).await;
        let _ = sink.close().await;
        return;
    };

    let (mut sink, mut stream) = socket.split();

    if sink
        .send(Message::Text(initial_event.to_json().into()))
        .await
        .is_err()
    {
        cleanup(&state, &room_id, client_id).await;
        return;
    }

    // Writer task: forward queued events from the manager to the WS sink.
    let writer_state = state.clone();
    let writer_rid = room_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sink
                .send(Message::Text(event.to_json().into()))
                .await
                .is_err()
            {
                break;
            }
        }
        let _ = sink.close().await;
        cleanup(&writer_state, &writer_rid, client_id).await;
    });

    // Reader task: handle client commands.
    let reader_state = state.clone();
    let reader_rid = room_id.clone();
    let mut reader = tokio::spawn(async move {
        while let Some(Ok(msg)) = stream.next().await {
            match msg {
                Message::Text(text) => {
                    handle_client_message(&reader_state, &reader_rid, client_id, &member, &text)
                        .await;
                }
                Message::Close(_) => break,
                _ => {} // Binary / Ping / Pong handled by Axum
            }
        }
    });

    tokio::select! {
        _ = &mut writer => { reader.abort(); }
        _ = &mut reader => { writer.abort(); }
    }

    // Final cleanup (idempotent).
    cleanup(&state, &room_id, client_id).await;
}

/// Process a client-sent text message. Replies that concern only the sender
/// (pong, errors) go to this client alone.
async fn handle_client_message(
    state: &SharedState,
    room_id: &str,
    client_id: ClientId,
    member: &Member,
    text: &str,
) {
    let cmd = match serde_json::from_str::<WsCommand>(text) {
        Ok(c) => c,
        Err(e) => {
            debug!("invalid WS command: {e}");
            let err = WsEvent::error(&format!("invalid command: {e}"));
            state.ws.send_to(room_id, client_id, err).await;
            return;
        }
    };

    let action = match cmd {
        WsCommand::Ping => {
            state.ws.send_to(room_id, client_id, WsEvent::pong()).await;
            return;
        }
        WsCommand::Join => Action::Join,
        WsCommand::Select { row, col } => match Square::new(row, col) {
            Ok(square) => Action::Select(square),
            Err(e) => {
                let err = WsEvent::error(&e.to_string());
                state.ws.send_to(room_id, client_id, err).await;
                return;
            }
        },
        WsCommand::Deselect => Action::Deselect,
        WsCommand::Reset => Action::Reset,
        WsCommand::NewGame => Action::NewGame,
        WsCommand::Say { message } => Action::Say(message),
    };

    if let Err(e) = state.dispatch(room_id, member, action).await {
        state
            .ws
            .send_to(room_id, client_id, WsEvent::error(&e.to_string()))
            .await;
    }
}

/// Remove client from the manager.
async fn cleanup(state: &SharedState, room_id: &str, client_id: ClientId) {
    state.ws.unsubscribe(room_id, client_id).await;
    debug!(room_id, client_id, "WS session cleaned up");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::AppState;
    use crate::config::AppConfig;

    /// Verify the handler function signature compiles as an Axum handler.
    #[tokio::test]
    async fn handler_type_check() {
        fn assert_handler<F, Fut>(_: F)
        where
            F: FnOnce(WebSocketUpgrade, Path<String>, Query<WsQuery>, State<SharedState>) -> Fut,
            Fut: std::future::Future<Output = Result<Response, ApiError>>,
        {
        }
        assert_handler(ws_handler);
    }

    #[tokio::test]
    async fn commands_from_unknown_room_report_errors() {
        let state = AppState::new(AppConfig::default());
        let member = Member::new("friend1", "Friend 1");
        let (client_id, mut rx) = state.ws.subscribe("ghost", &member.id).await;

        handle_client_message(&state, "ghost", client_id, &member, r#"{"type":"join"}"#).await;
        let json: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap().to_json()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Room not found: ghost");
    }

    #[tokio::test]
    async fn ping_and_bad_input_reply_to_sender() {
        let state = AppState::new(AppConfig::default());
        let member = Member::new("friend1", "Friend 1");
        let (client_id, mut rx) = state.ws.subscribe("r1", &member.id).await;

        handle_client_message(&state, "r1", client_id, &member, r#"{"type":"ping"}"#).await;
        assert!(rx.recv().await.unwrap().to_json().contains(r#""type":"pong""#));

        handle_client_message(&state, "r1", client_id, &member, "not json").await;
        assert!(rx.recv().await.unwrap().to_json().contains(r#""type":"error""#));

        handle_client_message(&state, "r1", client_id, &member, r#"{"type":"select","row":-1,"col":0}"#)
            .await;
        let json: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap().to_json()).unwrap();
        assert_eq!(json["type"], "error");
    }
}
