use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::SharedState;
use crate::ws;

/// Build the Axum router with all routes and middleware.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check (outside /api prefix)
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        // Room CRUD
        .route(
            "/api/rooms",
            post(handlers::create_room).get(handlers::list_rooms),
        )
        .route(
            "/api/rooms/{id}",
            get(handlers::get_room).delete(handlers::delete_room),
        )
        // Board clicks and game control
        .route("/api/rooms/{id}/join", post(handlers::join))
        .route("/api/rooms/{id}/select", post(handlers::select))
        .route("/api/rooms/{id}/deselect", post(handlers::deselect))
        .route("/api/rooms/{id}/reset", post(handlers::reset))
        .route("/api/rooms/{id}/new-game", post(handlers::new_game))
        // Chat
        .route(
            "/api/rooms/{id}/messages",
            get(handlers::get_messages).post(handlers::post_message),
        )
        // WebSocket: live room events
        .route("/ws/rooms/{id}", get(ws::ws_handler))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
