pub mod log;
pub mod types;

pub use log::{ChatLog, status_line};
pub use types::{ChatError, ChatMessage, GAME_SENDER, MessageKind, SYSTEM_SENDER, StatusLine};
