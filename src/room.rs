//! A shared room: one game session plus the chat that narrates it.
//!
//! Every request that reaches a room goes through [`Room::apply`], which
//! hands the action to the session, appends whatever the chat should say
//! about the result, and returns both so the transport can broadcast them.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::{ChatError, ChatLog, ChatMessage, StatusLine, status_line};
use crate::engine::{Rejection, Session, SessionEvent, Square};
use crate::roster::Member;

/// Something a member asks a room to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Open the room; announced in chat the first time only.
    Enter,
    /// Ask for a seat.
    Join,
    /// Click a square.
    Select(Square),
    Deselect,
    Reset,
    NewGame,
    Say(String),
}

/// Result of applying an [`Action`].
#[derive(Clone, Debug, Default)]
pub struct Outcome {
    /// The session event, if the action produced one.
    pub event: Option<SessionEvent>,
    /// Why the session stayed silent, if it did.
    pub rejection: Option<Rejection>,
    /// Chat lines appended by this action, oldest first.
    pub messages: Vec<ChatMessage>,
}

impl Outcome {
    fn from_session(result: Result<SessionEvent, Rejection>) -> Self {
        match result {
            Ok(event) => Outcome {
                event: Some(event),
                ..Default::default()
            },
            Err(rejection) => Outcome {
                rejection: Some(rejection),
                ..Default::default()
            },
        }
    }
}

/// One room.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    session: Session,
    chat: ChatLog,
    /// Display names of everyone who has acted in the room, by member id.
    names: HashMap<String, String>,
    entered: HashSet<String>,
}

impl Room {
    pub fn new(name: impl Into<String>, history_limit: usize) -> Self {
        Room {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Utc::now(),
            session: Session::new(),
            chat: ChatLog::new(history_limit),
            names: HashMap::new(),
            entered: HashSet::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Display name for a member id, if they have been in the room.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn status(&self) -> StatusLine {
        status_line(&self.session, &self.names)
    }

    /// Apply `action` on behalf of `member`.
    ///
    /// Session refusals are not errors: they come back as an outcome with no
    /// event. Only a chat message that cannot be posted fails.
    pub fn apply(&mut self, member: &Member, action: Action) -> Result<Outcome, ChatError> {
        self.names
            .entry(member.id.clone())
            .or_insert_with(|| member.name.clone());

        let mut outcome = match action {
            Action::Enter => {
                let mut outcome = Outcome::default();
                if self.entered.insert(member.id.clone()) {
                    info!(room = %self.id, member = %member.id, "member entered room");
                    outcome
                        .messages
                        .push(self.chat.system(format!("{} joined the chat!", member.name)));
                }
                return Ok(outcome);
            }
            Action::Say(text) => {
                let msg = self.chat.post(&member.name, &text)?;
                return Ok(Outcome {
                    messages: vec![msg],
                    ..Default::default()
                });
            }
            Action::Join => Outcome::from_session(self.session.join_checked(&member.id)),
            Action::Select(square) => {
                Outcome::from_session(self.session.select_square_checked(&member.id, square))
            }
            Action::Deselect => Outcome::from_session(self.session.deselect_checked(&member.id)),
            Action::Reset => Outcome::from_session(Ok(self.session.reset())),
            Action::NewGame => Outcome::from_session(Ok(self.session.new_game())),
        };

        match outcome.rejection {
            // The session records late arrivals without an event; the chat
            // still says who is watching.
            Some(Rejection::RolesClosed) => {
                outcome.messages.push(self.chat.watching(&member.name));
            }
            Some(rejection) => {
                debug!(room = %self.id, member = %member.id, %rejection, "action ignored");
            }
            None => {}
        }
        if let Some(event) = &outcome.event
            && let Some(msg) = self.chat.announce(&member.name, event)
        {
            outcome.messages.push(msg);
        }
        Ok(outcome)
    }
}
