//! Per-room chat history and the announcements the game produces.

use std::collections::{HashMap, VecDeque};

use crate::engine::{Color, Session, SessionEvent, SessionState};

use super::types::*;

/// Longest message a member may post.
pub const MAX_MESSAGE_CHARS: usize = 1000;

// ---------------------------------------------------------------------------
// ChatLog
// ---------------------------------------------------------------------------

/// Bounded chat history; the oldest lines fall off once `limit` is reached.
#[derive(Debug, Clone)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
    limit: usize,
}

impl ChatLog {
    pub fn new(limit: usize) -> Self {
        ChatLog {
            messages: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Post a member's message. Surrounding whitespace is dropped.
    pub fn post(&mut self, sender: &str, text: &str) -> Result<ChatMessage, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(ChatError::TooLong(MAX_MESSAGE_CHARS));
        }
        Ok(self.push(ChatMessage::new(sender, MessageKind::User, text)))
    }

    /// Append a room announcement.
    pub fn system(&mut self, text: impl Into<String>) -> ChatMessage {
        self.push(ChatMessage::new(SYSTEM_SENDER, MessageKind::System, text))
    }

    /// Append a move announcement.
    pub fn game(&mut self, text: impl Into<String>) -> ChatMessage {
        self.push(ChatMessage::new(GAME_SENDER, MessageKind::Game, text))
    }

    /// Announce a member who arrived after both colors were taken.
    pub fn watching(&mut self, actor: &str) -> ChatMessage {
        self.system(format!("{actor} is now watching the game!"))
    }

    /// Record whatever a session event means for the chat, if anything.
    /// `actor` is the display name of the member who caused it.
    pub fn announce(&mut self, actor: &str, event: &SessionEvent) -> Option<ChatMessage> {
        match event {
            SessionEvent::RoleAssigned { role, .. } => Some(match role.color() {
                Some(color) => self.system(format!("{actor} joined as {} player!", color.title())),
                None => self.watching(actor),
            }),
            SessionEvent::MoveApplied(record) => Some(self.game(record.to_string())),
            SessionEvent::Reset => Some(self.system("Chess board has been reset.")),
            SessionEvent::NewGame => {
                Some(self.system("New chess game started! First to click joins as White."))
            }
            SessionEvent::SelectionChanged { .. } => None,
        }
    }

    fn push(&mut self, msg: ChatMessage) -> ChatMessage {
        while self.messages.len() >= self.limit {
            self.messages.pop_front();
        }
        self.messages.push_back(msg.clone());
        msg
    }
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

/// Summarise a session for people looking at the board. `names` maps member
/// ids to display names; unknown ids are left out of the watcher list.
pub fn status_line(session: &Session, names: &HashMap<String, String>) -> StatusLine {
    if session.state() == SessionState::AwaitingPlayers {
        return StatusLine {
            status: "Waiting for players...".to_string(),
            info: "Click the board to join as White or Black".to_string(),
        };
    }

    let roles = session.roles();
    let name_of = |id: Option<&str>, fallback: &str| {
        id.and_then(|id| names.get(id))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };
    let white = name_of(roles.white(), "White");
    let black = name_of(roles.black(), "Waiting...");
    let current = match session.turn() {
        Color::White => &white,
        Color::Black => &black,
    };

    let status = format!("{current}'s turn");
    let mut info = format!("White: {white} | Black: {black}");

    let watching: Vec<&str> = roles
        .spectators()
        .iter()
        .filter_map(|id| names.get(id).map(String::as_str))
        .collect();
    if !watching.is_empty() {
        info.push_str(&format!(" | Watching: {}", watching.join(", ")));
    }

    StatusLine { status, info }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
