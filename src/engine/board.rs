//! Mailbox board representation.
//!
//! `Board` is an 8×8 grid of optional pieces indexed `[row][col]`, row 0 being
//! rank 8. It knows nothing about turns or rules; the legality engine reads it
//! and the session mutates it.

use crate::engine::types::{ChessError, Piece, Square};

/// Piece placement of the standard starting position.
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// An 8×8 board holding at most one piece per square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_placement(STARTING_PLACEMENT).expect("starting placement is always valid")
    }

    /// Parse the piece-placement field of a FEN string (ranks from 8 down to 1,
    /// separated by `/`, digits for runs of empty squares).
    pub fn from_placement(placement: &str) -> Result<Self, ChessError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank = 8 - row;
            let mut col: usize = 0;
            for ch in rank_str.chars() {
                if col > 7 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "too many squares in rank {rank}"
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidPlacement(format!(
                            "invalid empty count '{ch}' in rank {rank}"
                        )));
                    }
                    col += digit as usize;
                } else if let Some(piece) = Piece::from_symbol(ch) {
                    board.squares[row][col] = Some(piece);
                    col += 1;
                } else {
                    return Err(ChessError::InvalidPlacement(format!(
                        "invalid character '{ch}' in rank {rank}"
                    )));
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "rank {rank} has {col} squares instead of 8"
                )));
            }
        }
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

// ---------------------------------------------------------------------------
// Queries & mutation
// ---------------------------------------------------------------------------

impl Board {
    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Place a piece, returning whatever stood there before.
    pub fn put(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize].replace(piece)
    }

    /// Empty a square, returning its piece.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize].take()
    }

    /// Relocate the piece on `from` to `to`, overwriting anything on `to`.
    /// Returns the overwritten piece. Does nothing if `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square) -> Option<Piece> {
        let piece = self.take(from)?;
        self.put(to, piece)
    }

    /// Iterate over occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// 8×8 grid of piece codes ("wP", "bK", ...) for API responses.
    pub fn codes(&self) -> Vec<Vec<Option<String>>> {
        self.squares
            .iter()
            .map(|row| row.iter().map(|p| p.map(Piece::code)).collect())
            .collect()
    }

    /// Export the piece-placement field of a FEN string.
    pub fn to_placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for (row, rank) in self.squares.iter().enumerate() {
            let mut empty_count = 0u8;
            for square in rank {
                match square {
                    Some(piece) => {
                        if empty_count > 0 {
                            out.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        out.push(piece.symbol());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                out.push((b'0' + empty_count) as char);
            }
            if row < 7 {
                out.push('/');
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
