//! Shared two-player chess board living inside a small chat room.
//!
//! - [`engine`]: board, move legality rules and the game session state machine.
//! - [`roster`]: access keys of the people allowed in.
//! - [`chat`]: per-room chat log and the announcements derived from the game.
//! - [`room`]: one session plus its chat, driven by member actions.
//! - [`api`] / [`ws`]: HTTP and WebSocket surfaces.

pub mod api;
pub mod chat;
pub mod config;
pub mod engine;
pub mod room;
pub mod roster;
pub mod ws;
