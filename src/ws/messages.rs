//! WebSocket message types for live room events.

use serde::{Deserialize, Serialize};

use crate::api::models::{Participant, RoomResponse, SelectionInfo, participant, room_to_response};
use crate::chat::ChatMessage;
use crate::engine::{Color, IllegalMove, Role, SessionEvent, SessionState};
use crate::room::{Outcome, Room};
use crate::roster::Member;

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Envelope sent from server to WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WsEvent {
    /// Discriminator so clients can switch on event type.
    #[serde(rename = "type")]
    pub event_type: WsEventType,
    /// Event-specific payload.
    #[serde(flatten)]
    pub payload: WsPayload,
}

/// Event type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsEventType {
    Subscribed,
    RoleAssigned,
    SelectionChanged,
    MoveMade,
    BoardReset,
    NewGame,
    ChatMessage,
    Error,
    Pong,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum WsPayload {
    Subscribed(Box<SubscribedPayload>),
    RoleAssigned(RoleAssignedPayload),
    SelectionChanged(SelectionChangedPayload),
    MoveMade(MoveMadePayload),
    Board(BoardPayload),
    ChatMessage(ChatMessagePayload),
    Error(ErrorPayload),
    Pong(PongPayload),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedPayload {
    pub room_id: String,
    /// The member this connection belongs to.
    pub you: Participant,
    pub room: RoomResponse,
    pub history: Vec<ChatMessage>,
    /// Members with a live connection to the room, this one included.
    pub online: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignedPayload {
    pub room_id: String,
    pub member: Participant,
    pub role: Role,
    pub state: SessionState,
    pub status: String,
    pub info: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChangedPayload {
    pub room_id: String,
    pub selection: Option<SelectionInfo>,
    pub targets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<IllegalMove>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveMadePayload {
    pub room_id: String,
    pub player: Color,
    pub piece: String,
    pub from: String,
    pub to: String,
    pub captured: Option<String>,
    /// Chat rendering, e.g. "White: Pe2 → e4".
    pub notation: String,
    pub board: Vec<Vec<Option<String>>>,
    pub turn: Color,
    pub status: String,
}

/// Board snapshot sent after a reset or a new game.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPayload {
    pub room_id: String,
    pub board: Vec<Vec<Option<String>>>,
    pub turn: Color,
    pub state: SessionState,
    pub status: String,
    pub info: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub room_id: String,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PongPayload {
    pub timestamp: u64,
}

// ---------------------------------------------------------------------------
// Client → Server commands
// ---------------------------------------------------------------------------

/// Commands sent from client to server over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsCommand {
    Ping,
    Join,
    Select { row: i32, col: i32 },
    Deselect,
    Reset,
    NewGame,
    Say { message: String },
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl WsEvent {
    /// Snapshot for a fresh connection. `online` holds the member ids
    /// currently connected to the room.
    pub fn subscribed(room: &Room, member: &Member, online: &[String]) -> Self {
        WsEvent {
            event_type: WsEventType::Subscribed,
            payload: WsPayload::Subscribed(Box::new(SubscribedPayload {
                room_id: room.id.clone(),
                you: Participant {
                    id: member.id.clone(),
                    name: member.name.clone(),
                },
                room: room_to_response(room),
                history: room.chat().messages().cloned().collect(),
                online: online.iter().map(|id| participant(room, id)).collect(),
            })),
        }
    }

    /// Translate a session event into what subscribers of `room` receive.
    pub fn session(room: &Room, event: &SessionEvent) -> Self {
        let room_id = room.id.clone();
        let session = room.session();
        match event {
            SessionEvent::RoleAssigned { identity, role } => {
                let status = room.status();
                WsEvent {
                    event_type: WsEventType::RoleAssigned,
                    payload: WsPayload::RoleAssigned(RoleAssignedPayload {
                        room_id,
                        member: participant(room, identity),
                        role: *role,
                        state: session.state(),
                        status: status.status,
                        info: status.info,
                    }),
                }
            }
            SessionEvent::SelectionChanged {
                selection,
                targets,
                rejected,
            } => WsEvent {
                event_type: WsEventType::SelectionChanged,
                payload: WsPayload::SelectionChanged(SelectionChangedPayload {
                    room_id,
                    selection: selection.map(SelectionInfo::from),
                    targets: targets.iter().map(|sq| sq.to_algebraic()).collect(),
                    rejected: *rejected,
                }),
            },
            SessionEvent::MoveApplied(record) => WsEvent {
                event_type: WsEventType::MoveMade,
                payload: WsPayload::MoveMade(MoveMadePayload {
                    room_id,
                    player: record.mover,
                    piece: record.piece.code(),
                    from: record.from.to_algebraic(),
                    to: record.to.to_algebraic(),
                    captured: record.captured.map(|p| p.code()),
                    notation: record.to_string(),
                    board: session.board().codes(),
                    turn: session.turn(),
                    status: room.status().status,
                }),
            },
            SessionEvent::Reset => Self::board(WsEventType::BoardReset, room),
            SessionEvent::NewGame => Self::board(WsEventType::NewGame, room),
        }
    }

    fn board(event_type: WsEventType, room: &Room) -> Self {
        let session = room.session();
        let status = room.status();
        WsEvent {
            event_type,
            payload: WsPayload::Board(BoardPayload {
                room_id: room.id.clone(),
                board: session.board().codes(),
                turn: session.turn(),
                state: session.state(),
                status: status.status,
                info: status.info,
            }),
        }
    }

    pub fn chat_message(room_id: &str, message: ChatMessage) -> Self {
        WsEvent {
            event_type: WsEventType::ChatMessage,
            payload: WsPayload::ChatMessage(ChatMessagePayload {
                room_id: room_id.to_string(),
                message,
            }),
        }
    }

    /// Everything an applied action should push to subscribers, in order:
    /// the session event first, then the chat lines it produced.
    pub fn for_outcome(room: &Room, outcome: &Outcome) -> Vec<Self> {
        outcome
            .event
            .iter()
            .map(|event| Self::session(room, event))
            .chain(
                outcome
                    .messages
                    .iter()
                    .map(|msg| Self::chat_message(&room.id, msg.clone())),
            )
            .collect()
    }

    pub fn error(message: &str) -> Self {
        WsEvent {
            event_type: WsEventType::Error,
            payload: WsPayload::Error(ErrorPayload {
                message: message.to_string(),
            }),
        }
    }

    pub fn pong() -> Self {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        WsEvent {
            event_type: WsEventType::Pong,
            payload: WsPayload::Pong(PongPayload { timestamp: ts }),
        }
    }

    /// Serialize to JSON text for sending over WebSocket.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
