use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender name used for move announcements.
pub const GAME_SENDER: &str = "Chess Game";

/// Sender name used for room announcements.
pub const SYSTEM_SENDER: &str = "System";

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A single line in a room's chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: impl Into<String>, kind: MessageKind, content: impl Into<String>) -> Self {
        ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender: sender.into(),
            kind,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Hour and minute, as chat clients show it.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Message author type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Typed by a member.
    User,
    /// Room bookkeeping: joins, resets, new games.
    System,
    /// Move announcements.
    Game,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::System => "system",
            MessageKind::Game => "game",
        }
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Two-line summary shown above the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLine {
    pub status: String,
    pub info: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when posting to a room's chat.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("message exceeds {0} characters")]
    TooLong(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_type_tag() {
        let msg = ChatMessage::new("Friend 1", MessageKind::User, "hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["sender"], "Friend 1");
        assert_eq!(json["content"], "hello");
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn message_ids_are_unique() {
        let a = ChatMessage::new(SYSTEM_SENDER, MessageKind::System, "x");
        let b = ChatMessage::new(SYSTEM_SENDER, MessageKind::System, "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn time_label_is_hours_and_minutes() {
        let msg = ChatMessage::new(GAME_SENDER, MessageKind::Game, "x");
        let label = msg.time_label();
        assert_eq!(label.len(), 5);
        assert_eq!(&label[2..3], ":");
    }

    #[test]
    fn kind_strings() {
        assert_eq!(MessageKind::User.as_str(), "user");
        assert_eq!(MessageKind::System.as_str(), "system");
        assert_eq!(MessageKind::Game.as_str(), "game");
    }
}
