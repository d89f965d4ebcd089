//! Move legality engine.
//!
//! Decides whether a single move is legal under the reduced rule set the
//! shared board plays by: piece geometry, path obstruction for sliders,
//! pawn pushes and diagonal captures, and no capturing your own pieces.
//! Castling, en passant, promotion and check are not part of the rules.
//!
//! Everything here is a pure function of the board it is given.

use serde::Serialize;

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceKind, Square};

// =========================================================================
// Rejection reasons
// =========================================================================

/// Why a move was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum IllegalMove {
    #[error("no piece on the origin square")]
    EmptyOrigin,

    #[error("piece belongs to the other side")]
    NotMoversPiece,

    #[error("origin and destination are the same square")]
    NullMove,

    #[error("destination holds a piece of the same color")]
    OwnPieceAtDestination,

    #[error("piece cannot move that way")]
    BadGeometry,

    #[error("path is blocked")]
    PathBlocked,

    #[error("pawn is blocked")]
    PawnBlocked,
}

// =========================================================================
// Public API
// =========================================================================

/// Whether `mover` may move the piece on `from` to `to`.
pub fn is_legal(board: &Board, from: Square, to: Square, mover: Color) -> bool {
    check_move(board, from, to, mover).is_ok()
}

/// Like [`is_legal`], but reports why a move is refused.
pub fn check_move(board: &Board, from: Square, to: Square, mover: Color) -> Result<(), IllegalMove> {
    let piece = board.piece_at(from).ok_or(IllegalMove::EmptyOrigin)?;
    if piece.color != mover {
        return Err(IllegalMove::NotMoversPiece);
    }
    if from == to {
        return Err(IllegalMove::NullMove);
    }
    let target = board.piece_at(to);
    if target.is_some_and(|t| t.color == mover) {
        return Err(IllegalMove::OwnPieceAtDestination);
    }

    let dr = to.row() as i8 - from.row() as i8;
    let dc = to.col() as i8 - from.col() as i8;

    match piece.kind {
        PieceKind::Pawn => check_pawn(board, from, to, piece.color, target.is_some()),
        PieceKind::Knight => {
            let (ar, ac) = (dr.abs(), dc.abs());
            if (ar == 2 && ac == 1) || (ar == 1 && ac == 2) {
                Ok(())
            } else {
                Err(IllegalMove::BadGeometry)
            }
        }
        PieceKind::Bishop => {
            if is_diagonal(dr, dc) {
                require_clear(board, from, to)
            } else {
                Err(IllegalMove::BadGeometry)
            }
        }
        PieceKind::Rook => {
            if is_orthogonal(dr, dc) {
                require_clear(board, from, to)
            } else {
                Err(IllegalMove::BadGeometry)
            }
        }
        PieceKind::Queen => {
            if is_diagonal(dr, dc) || is_orthogonal(dr, dc) {
                require_clear(board, from, to)
            } else {
                Err(IllegalMove::BadGeometry)
            }
        }
        PieceKind::King => {
            if dr.abs() <= 1 && dc.abs() <= 1 {
                Ok(())
            } else {
                Err(IllegalMove::BadGeometry)
            }
        }
    }
}

/// Every square the piece on `from` may legally reach. Empty when `from` is
/// empty or holds the other side's piece.
pub fn legal_destinations(board: &Board, from: Square, mover: Color) -> Vec<Square> {
    if board.piece_at(from).is_none_or(|p| p.color != mover) {
        return Vec::new();
    }
    Square::all()
        .filter(|&to| is_legal(board, from, to, mover))
        .collect()
}

/// Whether every square strictly between `from` and `to` is empty.
///
/// Walks unit steps along the line implied by the two squares. Callers only
/// pass squares on a shared rank, file or diagonal.
pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let step_r = (to.row() as i8 - from.row() as i8).signum();
    let step_c = (to.col() as i8 - from.col() as i8).signum();

    let mut current = from.offset(step_r, step_c);
    while let Some(sq) = current {
        if sq == to {
            return true;
        }
        if !board.is_empty(sq) {
            return false;
        }
        current = sq.offset(step_r, step_c);
    }
    true
}

// =========================================================================
// Per-piece helpers (internal)
// =========================================================================

fn check_pawn(
    board: &Board,
    from: Square,
    to: Square,
    color: Color,
    occupied: bool,
) -> Result<(), IllegalMove> {
    let dir = color.forward();
    let dr = to.row() as i8 - from.row() as i8;
    let dc = to.col() as i8 - from.col() as i8;

    if dc == 0 {
        let single = dr == dir;
        let double = dr == 2 * dir && from.row() == color.pawn_row();
        if !single && !double {
            return Err(IllegalMove::BadGeometry);
        }
        if occupied {
            return Err(IllegalMove::PawnBlocked);
        }
        if double {
            let between = from.offset(dir, 0).ok_or(IllegalMove::BadGeometry)?;
            if !board.is_empty(between) {
                return Err(IllegalMove::PawnBlocked);
            }
        }
        return Ok(());
    }

    if dc.abs() == 1 && dr == dir {
        return if occupied {
            Ok(())
        } else {
            Err(IllegalMove::BadGeometry)
        };
    }

    Err(IllegalMove::BadGeometry)
}

#[inline]
fn is_diagonal(dr: i8, dc: i8) -> bool {
    dr != 0 && dr.abs() == dc.abs()
}

#[inline]
fn is_orthogonal(dr: i8, dc: i8) -> bool {
    (dr == 0) != (dc == 0)
}

#[inline]
fn require_clear(board: &Board, from: Square, to: Square) -> Result<(), IllegalMove> {
    if path_clear(board, from, to) {
        Ok(())
    } else {
        Err(IllegalMove::PathBlocked)
    }
}

// =========================================================================
// Tests
// =========================================================================
