use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};

use crate::chat::ChatMessage;
use crate::engine::Square;
use crate::room::Action;
use crate::roster::Member;

use super::errors::ApiError;
use super::models::*;
use super::state::SharedState;

/// Header carrying the caller's access key.
pub const USER_KEY_HEADER: &str = "x-user-key";

const DEFAULT_ROOM_NAME: &str = "Chess Room";

// =========================================================================
// Health
// =========================================================================

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        language: "rust".to_string(),
        engine: "chess-chat".to_string(),
        uptime,
        rooms: state.rooms.read().await.len(),
        connections: state.ws.total_connections().await,
    })
}

// =========================================================================
// Login
// =========================================================================

/// POST /api/login
pub async fn login(
    State(state): State<SharedState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let member = state.authenticate(Some(&input.key))?;
    Ok(Json(LoginResponse {
        id: member.id,
        name: member.name,
    }))
}

// =========================================================================
// Rooms
// =========================================================================

/// POST /api/rooms
pub async fn create_room(
    State(state): State<SharedState>,
    headers: HeaderMap,
    input: Option<Json<CreateRoomRequest>>,
) -> Result<(StatusCode, Json<RoomResponse>), ApiError> {
    caller(&state, &headers)?;
    let Json(input) = input.unwrap_or_default();
    let name = input
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_ROOM_NAME.to_string());

    let response = state.create_room(&name).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/rooms
pub async fn list_rooms(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<ListRoomsResponse>, ApiError> {
    caller(&state, &headers)?;
    let rooms = state.rooms.read().await;

    let mut listed: Vec<_> = rooms.values().collect();
    // Newest first.
    listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ListRoomsResponse {
        total: listed.len(),
        rooms: listed.into_iter().map(room_to_summary).collect(),
    }))
}

/// GET /api/rooms/:id
pub async fn get_room(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<RoomResponse>, ApiError> {
    caller(&state, &headers)?;
    let rooms = state.rooms.read().await;
    let room = rooms
        .get(&id)
        .ok_or_else(|| ApiError::RoomNotFound(id.clone()))?;
    Ok(Json(room_to_response(room)))
}

/// DELETE /api/rooms/:id
pub async fn delete_room(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let member = caller(&state, &headers)?;
    state
        .rooms
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| ApiError::RoomNotFound(id.clone()))?;
    state.ws.close_room(&id).await;
    tracing::info!(room = %id, member = %member.id, "room deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Room deleted".to_string(),
    }))
}

// =========================================================================
// Game actions
// =========================================================================

/// POST /api/rooms/:id/join
pub async fn join(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    act(&state, &headers, &id, Action::Join).await
}

/// POST /api/rooms/:id/select
pub async fn select(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<SelectRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    let square = Square::new(input.row, input.col)?;
    act(&state, &headers, &id, Action::Select(square)).await
}

/// POST /api/rooms/:id/deselect
pub async fn deselect(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    act(&state, &headers, &id, Action::Deselect).await
}

/// POST /api/rooms/:id/reset
pub async fn reset(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    act(&state, &headers, &id, Action::Reset).await
}

/// POST /api/rooms/:id/new-game
pub async fn new_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, ApiError> {
    act(&state, &headers, &id, Action::NewGame).await
}

// =========================================================================
// Chat
// =========================================================================

/// GET /api/rooms/:id/messages
pub async fn get_messages(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagesResponse>, ApiError> {
    caller(&state, &headers)?;
    let rooms = state.rooms.read().await;
    let room = rooms
        .get(&id)
        .ok_or_else(|| ApiError::RoomNotFound(id.clone()))?;

    let total = room.chat().len();
    let limit = query.limit.unwrap_or(total).min(total);
    let messages: Vec<ChatMessage> = room.chat().messages().skip(total - limit).cloned().collect();
    Ok(Json(MessagesResponse { messages, total }))
}

/// POST /api/rooms/:id/messages
pub async fn post_message(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<SayRequest>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let member = caller(&state, &headers)?;
    let (outcome, _) = state
        .dispatch(&id, &member, Action::Say(input.message))
        .await?;
    let message = outcome
        .messages
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::InvalidRequest("message was not posted".to_string()))?;
    Ok((StatusCode::CREATED, Json(message)))
}

// =========================================================================
// Helpers
// =========================================================================

/// The member whose key is in the request headers.
fn caller(state: &SharedState, headers: &HeaderMap) -> Result<Member, ApiError> {
    let key = headers
        .get(USER_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    state.authenticate(key)
}

async fn act(
    state: &SharedState,
    headers: &HeaderMap,
    room_id: &str,
    action: Action,
) -> Result<Json<ActionResponse>, ApiError> {
    let member = caller(state, headers)?;
    let (outcome, room) = state.dispatch(room_id, &member, action).await?;
    Ok(Json(ActionResponse {
        event: outcome.event,
        rejection: outcome.rejection,
        messages: outcome.messages,
        room,
    }))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use crate::api::router::create_router;
    use crate::api::state::{AppState, SharedState};
    use crate::config::AppConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::USER_KEY_HEADER;

    const WHITE: &str = "FRIEND1_KEY";
    const BLACK: &str = "FRIEND2_KEY";
    const WATCHER: &str = "FRIEND3_KEY";

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default())
    }

    async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str, key: &str) -> Request<Body> {
        Request::get(uri)
            .header(USER_KEY_HEADER, key)
            .body(Body::empty())
            .unwrap()
    }

    fn post(uri: &str, key: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header(USER_KEY_HEADER, key)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(state: &SharedState, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = create_router(state.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        (status, body_json(resp).await)
    }

    async fn new_room(state: &SharedState) -> String {
        let (status, json) = send(state, post("/api/rooms", WHITE, r#"{"name":"Lobby"}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        json["id"].as_str().unwrap().to_string()
    }

    async fn click(state: &SharedState, id: &str, key: &str, row: i32, col: i32) -> serde_json::Value {
        let body = format!(r#"{{"row":{row},"col":{col}}}"#);
        let (status, json) = send(state, post(&format!("/api/rooms/{id}/select"), key, &body)).await;
        assert_eq!(status, StatusCode::OK);
        json
    }

    async fn seated_room(state: &SharedState) -> String {
        let id = new_room(state).await;
        send(state, post(&format!("/api/rooms/{id}/join"), WHITE, "")).await;
        send(state, post(&format!("/api/rooms/{id}/join"), BLACK, "")).await;
        id
    }

    // --- Health ---

    #[tokio::test]
    async fn health_returns_200() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["language"], "rust");
        assert_eq!(json["rooms"], 0);
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(Request::get("/nonexistent").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cors_preflight() {
        let app = create_router(test_state());
        let resp = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/health")
                    .header("Origin", "http://localhost:3001")
                    .header("Access-Control-Request-Method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get("access-control-allow-origin").is_some());
    }

    // --- Login ---

    #[tokio::test]
    async fn login_with_known_key() {
        let state = test_state();
        let req = Request::post("/api/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"key":"FRIEND3_KEY"}"#))
            .unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], "friend3");
        assert_eq!(json["name"], "Friend 3");
    }

    #[tokio::test]
    async fn login_with_unknown_key() {
        let state = test_state();
        let req = Request::post("/api/login")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"key":"guess"}"#))
            .unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn rooms_require_a_key() {
        let state = test_state();
        let req = Request::get("/api/rooms").body(Body::empty()).unwrap();
        let (status, _) = send(&state, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&state, get("/api/rooms", "wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    // --- Rooms ---

    #[tokio::test]
    async fn create_room_default_name() {
        let state = test_state();
        let req = Request::post("/api/rooms")
            .header(USER_KEY_HEADER, WHITE)
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["name"], "Chess Room");
        assert_eq!(json["state"], "awaiting_players");
        assert_eq!(json["turn"], "white");
        assert_eq!(json["board"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn create_get_list_delete_room() {
        let state = test_state();
        let id = new_room(&state).await;

        let (status, json) = send(&state, get(&format!("/api/rooms/{id}"), BLACK)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["id"], id);
        assert_eq!(json["name"], "Lobby");

        let (_, json) = send(&state, get("/api/rooms", BLACK)).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["rooms"][0]["id"], id);

        let req = Request::delete(format!("/api/rooms/{id}"))
            .header(USER_KEY_HEADER, WHITE)
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(&state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);

        let (status, json) = send(&state, get(&format!("/api/rooms/{id}"), WHITE)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "ROOM_NOT_FOUND");
    }

    #[tokio::test]
    async fn action_on_missing_room() {
        let state = test_state();
        let (status, _) = send(&state, post("/api/rooms/nope/join", WHITE, "")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    // --- Game actions ---

    #[tokio::test]
    async fn joins_assign_colors() {
        let state = test_state();
        let id = new_room(&state).await;

        let (status, json) = send(&state, post(&format!("/api/rooms/{id}/join"), WHITE, "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event"]["type"], "role_assigned");
        assert_eq!(json["event"]["role"], "white");
        assert_eq!(json["messages"][0]["content"], "Friend 1 joined as White player!");

        // Clicking the board while a seat is open is also a join.
        let json = click(&state, &id, BLACK, 1, 4).await;
        assert_eq!(json["event"]["role"], "black");
        assert_eq!(json["room"]["state"], "in_progress");
        assert_eq!(json["room"]["status"], "Friend 1's turn");

        let (_, json) = send(&state, post(&format!("/api/rooms/{id}/join"), WATCHER, "")).await;
        assert!(json["event"].is_null());
        assert_eq!(json["rejection"], "roles_closed");
        assert_eq!(json["messages"][0]["content"], "Friend 3 is now watching the game!");
        assert_eq!(json["room"]["spectators"][0]["name"], "Friend 3");
    }

    #[tokio::test]
    async fn select_then_move() {
        let state = test_state();
        let id = seated_room(&state).await;

        let json = click(&state, &id, WHITE, 6, 4).await;
        assert_eq!(json["event"]["type"], "selection_changed");
        assert_eq!(json["event"]["selection"]["origin"], "e2");
        assert_eq!(json["event"]["targets"], serde_json::json!(["e4", "e3"]));
        assert_eq!(json["room"]["selection"]["square"], "e2");
        assert_eq!(json["room"]["targets"], serde_json::json!(["e4", "e3"]));

        let json = click(&state, &id, WHITE, 4, 4).await;
        assert_eq!(json["event"]["type"], "move_applied");
        assert_eq!(json["event"]["from"], "e2");
        assert_eq!(json["event"]["to"], "e4");
        assert_eq!(json["messages"][0]["sender"], "Chess Game");
        assert_eq!(json["messages"][0]["content"], "White: Pe2 → e4");
        assert_eq!(json["room"]["turn"], "black");
        assert_eq!(json["room"]["board"][4][4], "wP");
        assert!(json["room"]["board"][6][4].is_null());
    }

    #[tokio::test]
    async fn out_of_turn_click_is_ignored() {
        let state = test_state();
        let id = seated_room(&state).await;
        let json = click(&state, &id, BLACK, 1, 4).await;
        assert!(json["event"].is_null());
        assert_eq!(json["rejection"], "not_your_turn");
        assert!(json["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_square_is_rejected() {
        let state = test_state();
        let id = seated_room(&state).await;
        let (status, json) = send(
            &state,
            post(&format!("/api/rooms/{id}/select"), WHITE, r#"{"row":8,"col":0}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_SQUARE");
    }

    #[tokio::test]
    async fn deselect_clears_selection() {
        let state = test_state();
        let id = seated_room(&state).await;
        click(&state, &id, WHITE, 7, 6).await;
        let (_, json) = send(&state, post(&format!("/api/rooms/{id}/deselect"), WHITE, "")).await;
        assert_eq!(json["event"]["type"], "selection_changed");
        assert!(json["event"]["selection"].is_null());
        assert!(json["room"].get("selection").is_none());
    }

    #[tokio::test]
    async fn reset_keeps_players_new_game_clears_them() {
        let state = test_state();
        let id = seated_room(&state).await;
        click(&state, &id, WHITE, 6, 0).await;
        click(&state, &id, WHITE, 4, 0).await;

        let (_, json) = send(&state, post(&format!("/api/rooms/{id}/reset"), BLACK, "")).await;
        assert_eq!(json["event"]["type"], "reset");
        assert_eq!(json["messages"][0]["content"], "Chess board has been reset.");
        assert_eq!(json["room"]["turn"], "white");
        assert_eq!(json["room"]["board"][6][0], "wP");
        assert_eq!(json["room"]["players"]["black"]["id"], "friend2");

        let (_, json) = send(&state, post(&format!("/api/rooms/{id}/new-game"), BLACK, "")).await;
        assert_eq!(json["event"]["type"], "new_game");
        assert_eq!(json["room"]["state"], "awaiting_players");
        assert!(json["room"]["players"]["white"].is_null());
    }

    // --- Chat ---

    #[tokio::test]
    async fn post_and_read_messages() {
        let state = test_state();
        let id = new_room(&state).await;

        let (status, json) = send(
            &state,
            post(&format!("/api/rooms/{id}/messages"), WATCHER, r#"{"message":"hello"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["sender"], "Friend 3");
        assert_eq!(json["type"], "user");

        send(&state, post(&format!("/api/rooms/{id}/join"), WHITE, "")).await;

        let (_, json) = send(&state, get(&format!("/api/rooms/{id}/messages"), WHITE)).await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["messages"][0]["content"], "hello");

        let (_, json) = send(&state, get(&format!("/api/rooms/{id}/messages?limit=1"), WHITE)).await;
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], "system");
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let state = test_state();
        let id = new_room(&state).await;
        let (status, json) = send(
            &state,
            post(&format!("/api/rooms/{id}/messages"), WHITE, r#"{"message":"  "}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "INVALID_REQUEST");
    }
}
