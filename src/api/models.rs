use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;
use crate::engine::{Color, Rejection, Selection, SessionEvent, SessionState};
use crate::room::Room;

// ---------------------------------------------------------------------------
// Request models
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: Option<String>,
}

/// Board coordinates as sent by clients; range-checked before use.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRequest {
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SayRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub language: String,
    pub engine: String,
    pub uptime: u64,
    pub rooms: usize,
    pub connections: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Full view of a room: board, seats, selection and status line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub name: String,
    /// Rows from rank 8 down to rank 1, `"wP"`-style codes.
    pub board: Vec<Vec<Option<String>>>,
    /// The same board as a FEN piece-placement field.
    pub placement: String,
    pub state: SessionState,
    pub turn: Color,
    pub players: Players,
    pub spectators: Vec<Participant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionInfo>,
    pub targets: Vec<String>,
    pub status: String,
    pub info: String,
    pub message_count: usize,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Players {
    pub white: Option<Participant>,
    pub black: Option<Participant>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInfo {
    pub square: String,
    pub piece: String,
    /// Unicode glyph of the selected piece, e.g. "♘".
    pub glyph: char,
}

impl From<Selection> for SelectionInfo {
    fn from(selection: Selection) -> Self {
        SelectionInfo {
            square: selection.origin.to_algebraic(),
            piece: selection.piece.code(),
            glyph: selection.piece.glyph(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub state: SessionState,
    pub players: usize,
    pub spectators: usize,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRoomsResponse {
    pub rooms: Vec<RoomSummary>,
    pub total: usize,
}

/// What a room action did. `event` is null when the session ignored it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub event: Option<SessionEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<Rejection>,
    pub messages: Vec<ChatMessage>,
    pub room: RoomResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// A member id with the display name the room knows for it.
pub(crate) fn participant(room: &Room, id: &str) -> Participant {
    Participant {
        id: id.to_string(),
        name: room.name_of(id).unwrap_or(id).to_string(),
    }
}

/// Build the full response view of a room.
pub fn room_to_response(room: &Room) -> RoomResponse {
    let session = room.session();
    let roles = session.roles();
    let status = room.status();

    RoomResponse {
        id: room.id.clone(),
        name: room.name.clone(),
        board: session.board().codes(),
        placement: session.board().to_placement(),
        state: session.state(),
        turn: session.turn(),
        players: Players {
            white: roles.white().map(|id| participant(room, id)),
            black: roles.black().map(|id| participant(room, id)),
        },
        spectators: roles
            .spectators()
            .iter()
            .map(|id| participant(room, id))
            .collect(),
        selection: session.selection().map(SelectionInfo::from),
        targets: session
            .selection_targets()
            .into_iter()
            .map(|sq| sq.to_algebraic())
            .collect(),
        status: status.status,
        info: status.info,
        message_count: room.chat().len(),
        created_at: room.created_at.to_rfc3339(),
    }
}

pub fn room_to_summary(room: &Room) -> RoomSummary {
    let roles = room.session().roles();
    RoomSummary {
        id: room.id.clone(),
        name: room.name.clone(),
        state: room.session().state(),
        players: usize::from(roles.white().is_some()) + usize::from(roles.black().is_some()),
        spectators: roles.spectators().len(),
        created_at: room.created_at.to_rfc3339(),
    }
}
