//! Stateful game session wrapping a `Board`.
//!
//! `Session` owns the board, the role assignment, the turn pointer and the
//! current selection. Callers feed it identity-tagged `join` and
//! `select_square` requests and get back an optional `SessionEvent`. Anything
//! the rules refuse produces no event and leaves the session as it was; the
//! `*_checked` variants report the reason instead.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::engine::board::Board;
use crate::engine::rules::{self, IllegalMove};
use crate::engine::types::{Color, Piece, Role, Square};

// =========================================================================
// SessionState
// =========================================================================

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// At least one color is unassigned; every click is a join attempt.
    AwaitingPlayers,
    /// Both colors are assigned; clicks are moves.
    InProgress,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::AwaitingPlayers => "awaiting_players",
            SessionState::InProgress => "in_progress",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =========================================================================
// Roles
// =========================================================================

/// Who plays which color, and who watches.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Roles {
    white: Option<String>,
    black: Option<String>,
    /// Insertion-ordered, no duplicates.
    spectators: Vec<String>,
}

impl Roles {
    pub fn white(&self) -> Option<&str> {
        self.white.as_deref()
    }

    pub fn black(&self) -> Option<&str> {
        self.black.as_deref()
    }

    pub fn spectators(&self) -> &[String] {
        &self.spectators
    }

    /// Identity holding `color`, if any.
    pub fn player(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white(),
            Color::Black => self.black(),
        }
    }

    /// The role `identity` currently holds.
    pub fn role_of(&self, identity: &str) -> Option<Role> {
        if self.white() == Some(identity) {
            Some(Role::White)
        } else if self.black() == Some(identity) {
            Some(Role::Black)
        } else if self.spectators.iter().any(|s| s == identity) {
            Some(Role::Spectator)
        } else {
            None
        }
    }

    fn add_spectator(&mut self, identity: &str) {
        if !self.spectators.iter().any(|s| s == identity) {
            self.spectators.push(identity.to_string());
        }
    }
}

// =========================================================================
// Selection, moves and events
// =========================================================================

/// The origin square chosen by the player to move, awaiting a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub origin: Square,
    pub piece: Piece,
}

/// A move that was applied to the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub mover: Color,
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Piece>,
}

impl MoveRecord {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for MoveRecord {
    /// e.g. `White: Pe2 → e4` or `Black: qd8 → h4 (capture)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{} → {}",
            self.mover.title(),
            self.piece.symbol(),
            self.from,
            self.to
        )?;
        if self.is_capture() {
            write!(f, " (capture)")?;
        }
        Ok(())
    }
}

/// Something the collaborating chat and rendering layers should hear about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    RoleAssigned {
        identity: String,
        role: Role,
    },
    SelectionChanged {
        selection: Option<Selection>,
        /// Squares the selection can reach.
        targets: Vec<Square>,
        /// Set when the click was a refused move attempt.
        rejected: Option<IllegalMove>,
    },
    MoveApplied(MoveRecord),
    Reset,
    NewGame,
}

/// Why a request produced no event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[error("already playing in this session")]
    AlreadySeated,

    #[error("already watching this session")]
    AlreadyWatching,

    #[error("both colors are taken; recorded as spectator")]
    RolesClosed,

    #[error("not this player's turn")]
    NotYourTurn,

    #[error("square holds the opponent's piece")]
    NotYourPiece,

    #[error("square is empty")]
    EmptySquare,

    #[error("nothing is selected")]
    NothingSelected,
}

// =========================================================================
// Session
// =========================================================================

/// One live game on the shared board.
#[derive(Clone, Debug)]
pub struct Session {
    board: Board,
    roles: Roles,
    state: SessionState,
    turn: Color,
    selection: Option<Selection>,
}

impl Session {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Fresh session: starting position, nobody seated, White to move.
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            roles: Roles::default(),
            state: SessionState::AwaitingPlayers,
            turn: Color::White,
            selection: None,
        }
    }

    /// Session seated with two players on a custom board.
    #[cfg(test)]
    pub(crate) fn with_players(board: Board, white: &str, black: &str, turn: Color) -> Self {
        debug_assert_ne!(white, black, "white and black must be different identities");
        let mut session = Self::new();
        session.board = board;
        session.turn = turn;
        session.join(white);
        session.join(black);
        session
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Squares the current selection can legally reach (for highlighting).
    pub fn selection_targets(&self) -> Vec<Square> {
        self.selection
            .map(|s| rules::legal_destinations(&self.board, s.origin, self.turn))
            .unwrap_or_default()
    }

    pub fn role_of(&self, identity: &str) -> Option<Role> {
        self.roles.role_of(identity)
    }

    /// Whether `identity` holds the color whose turn it is.
    pub fn is_players_turn(&self, identity: &str) -> bool {
        self.roles.player(self.turn) == Some(identity)
    }

    // -----------------------------------------------------------------
    // Join
    // -----------------------------------------------------------------

    /// Ask for a seat. White goes to the first identity, Black to the next
    /// different one, everyone else watches.
    pub fn join(&mut self, identity: &str) -> Option<SessionEvent> {
        self.join_checked(identity).ok()
    }

    /// [`Session::join`] with the reason for a missing event.
    pub fn join_checked(&mut self, identity: &str) -> Result<SessionEvent, Rejection> {
        match self.state {
            SessionState::AwaitingPlayers => self.seat(identity),
            SessionState::InProgress => match self.roles.role_of(identity) {
                Some(Role::White | Role::Black) => Err(Rejection::AlreadySeated),
                Some(Role::Spectator) => Err(Rejection::AlreadyWatching),
                None => {
                    self.roles.add_spectator(identity);
                    debug!(identity, "late arrival recorded as spectator");
                    Err(Rejection::RolesClosed)
                }
            },
        }
    }

    fn seat(&mut self, identity: &str) -> Result<SessionEvent, Rejection> {
        let role = if self.roles.white.is_none() {
            self.roles.white = Some(identity.to_string());
            Role::White
        } else if self.roles.black.is_none() && self.roles.white() != Some(identity) {
            self.roles.black = Some(identity.to_string());
            self.state = SessionState::InProgress;
            Role::Black
        } else {
            // Only White can reach this point while a seat is open.
            return Err(Rejection::AlreadySeated);
        };

        debug!(identity, %role, state = %self.state, "role assigned");
        Ok(SessionEvent::RoleAssigned {
            identity: identity.to_string(),
            role,
        })
    }

    // -----------------------------------------------------------------
    // Select / move
    // -----------------------------------------------------------------

    /// A click on `square` by `identity`.
    ///
    /// While players are missing this is a join attempt. Afterwards only the
    /// player to move is heard: the click selects one of their pieces, or
    /// completes a move from the current selection.
    pub fn select_square(&mut self, identity: &str, square: Square) -> Option<SessionEvent> {
        self.select_square_checked(identity, square).ok()
    }

    /// [`Session::select_square`] with the reason for a missing event.
    pub fn select_square_checked(
        &mut self,
        identity: &str,
        square: Square,
    ) -> Result<SessionEvent, Rejection> {
        if self.state == SessionState::AwaitingPlayers {
            return self.seat(identity);
        }
        if !self.is_players_turn(identity) {
            return Err(Rejection::NotYourTurn);
        }

        let Some(selection) = self.selection else {
            return self.start_selection(square);
        };

        match rules::check_move(&self.board, selection.origin, square, self.turn) {
            Ok(()) => Ok(SessionEvent::MoveApplied(self.apply_move(selection, square))),
            Err(reason) => {
                debug!(from = %selection.origin, to = %square, %reason, "move refused");
                self.selection = None;
                // Clicking another own piece switches the selection to it.
                let _ = self.start_selection(square);
                Ok(SessionEvent::SelectionChanged {
                    selection: self.selection,
                    targets: self.selection_targets(),
                    rejected: Some(reason),
                })
            }
        }
    }

    /// Drop the current selection. Only the player to move may do this.
    pub fn deselect(&mut self, identity: &str) -> Option<SessionEvent> {
        self.deselect_checked(identity).ok()
    }

    /// [`Session::deselect`] with the reason for a missing event.
    pub fn deselect_checked(&mut self, identity: &str) -> Result<SessionEvent, Rejection> {
        if self.state != SessionState::InProgress || !self.is_players_turn(identity) {
            return Err(Rejection::NotYourTurn);
        }
        self.selection.take().ok_or(Rejection::NothingSelected)?;
        Ok(SessionEvent::SelectionChanged {
            selection: None,
            targets: Vec::new(),
            rejected: None,
        })
    }

    fn start_selection(&mut self, square: Square) -> Result<SessionEvent, Rejection> {
        let piece = self.board.piece_at(square).ok_or(Rejection::EmptySquare)?;
        if piece.color != self.turn {
            return Err(Rejection::NotYourPiece);
        }
        self.selection = Some(Selection {
            origin: square,
            piece,
        });
        Ok(SessionEvent::SelectionChanged {
            selection: self.selection,
            targets: self.selection_targets(),
            rejected: None,
        })
    }

    /// Relocate a piece whose move already passed the legality check, hand
    /// the turn over and clear the selection.
    fn apply_move(&mut self, selection: Selection, to: Square) -> MoveRecord {
        let mover = self.turn;
        let Selection { origin: from, piece } = selection;
        let captured = self.board.relocate(from, to);

        self.turn = !self.turn;
        self.selection = None;

        let record = MoveRecord {
            mover,
            piece,
            from,
            to,
            captured,
        };
        debug!(%record, "move applied");
        record
    }

    // -----------------------------------------------------------------
    // Reset / new game
    // -----------------------------------------------------------------

    /// Starting position and White to move; seats and spectators stay.
    pub fn reset(&mut self) -> SessionEvent {
        self.board = Board::starting();
        self.turn = Color::White;
        self.selection = None;
        debug!("board reset");
        SessionEvent::Reset
    }

    /// Throw the whole session away, seats included.
    pub fn new_game(&mut self) -> SessionEvent {
        *self = Session::new();
        debug!("new game started");
        SessionEvent::NewGame
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
