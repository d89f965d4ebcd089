//! HTTP surface: routes, handlers, request/response models and shared state.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

pub use errors::ApiError;
pub use router::create_router;
pub use state::{AppState, SharedState};
