//! Castling rights and the square data needed to validate and execute castling.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::piece::Color;
use super::square::Square;

pub(crate) const CASTLE_WHITE_K: u8 = 1 << 0;
pub(crate) const CASTLE_WHITE_Q: u8 = 1 << 1;
pub(crate) const CASTLE_BLACK_K: u8 = 1 << 2;
pub(crate) const CASTLE_BLACK_Q: u8 = 1 << 3;

/// All castling rights combined
pub(crate) const ALL_CASTLING_RIGHTS: u8 =
    CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// Number of distinct castlings, indexed in FEN order: K, Q, k, q.
pub(crate) const NUM_CASTLES: usize = 4;

/// Colour owning each castling right.
pub(crate) const CASTLE_COLORS: [Color; NUM_CASTLES] =
    [Color::White, Color::White, Color::Black, Color::Black];

/// Original king square for each right.
pub(crate) const KING_FROM_SQUARES: [Square; NUM_CASTLES] = [
    Square::new(0, 4),
    Square::new(0, 4),
    Square::new(7, 4),
    Square::new(7, 4),
];

/// Original rook square for each right.
pub(crate) const ROOK_FROM_SQUARES: [Square; NUM_CASTLES] = [
    Square::new(0, 7),
    Square::new(0, 0),
    Square::new(7, 7),
    Square::new(7, 0),
];

/// King destination square for each right.
pub(crate) const KING_TO_SQUARES: [Square; NUM_CASTLES] = [
    Square::new(0, 6),
    Square::new(0, 2),
    Square::new(7, 6),
    Square::new(7, 2),
];

/// Rook destination square for each right.
pub(crate) const ROOK_TO_SQUARES: [Square; NUM_CASTLES] = [
    Square::new(0, 5),
    Square::new(0, 3),
    Square::new(7, 5),
    Square::new(7, 3),
];

/// Squares the king passes through, inclusive of start and end.
pub(crate) const KING_PATH_MASKS: [u64; NUM_CASTLES] = [
    (1 << 4) | (1 << 5) | (1 << 6),
    (1 << 2) | (1 << 3) | (1 << 4),
    (1 << 60) | (1 << 61) | (1 << 62),
    (1 << 58) | (1 << 59) | (1 << 60),
];

/// Squares the rook passes through, inclusive of start and end.
pub(crate) const ROOK_PATH_MASKS: [u64; NUM_CASTLES] = [
    (1 << 5) | (1 << 6) | (1 << 7),
    1 | (1 << 1) | (1 << 2) | (1 << 3),
    (1 << 61) | (1 << 62) | (1 << 63),
    (1 << 56) | (1 << 57) | (1 << 58) | (1 << 59),
];

/// Index of the (colour, side) castling right in FEN order.
#[inline]
pub(crate) const fn castle_index(color: Color, kingside: bool) -> usize {
    match (color, kingside) {
        (Color::White, true) => 0,
        (Color::White, false) => 1,
        (Color::Black, true) => 2,
        (Color::Black, false) => 3,
    }
}

/// Castling rights represented as a bitmask over K, Q, k, q.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CastlingRights(u8);

impl CastlingRights {
    /// No castling rights
    #[must_use]
    pub const fn none() -> Self {
        CastlingRights(0)
    }

    /// All castling rights (both sides can castle kingside and queenside)
    #[must_use]
    pub const fn all() -> Self {
        CastlingRights(ALL_CASTLING_RIGHTS)
    }

    /// Check if a specific castling right is set
    #[inline]
    #[must_use]
    pub const fn has(self, color: Color, kingside: bool) -> bool {
        self.0 & (1 << castle_index(color, kingside)) != 0
    }

    /// Check a right by its FEN-order index (0=K, 1=Q, 2=k, 3=q)
    #[inline]
    #[must_use]
    pub(crate) const fn has_index(self, idx: usize) -> bool {
        self.0 & (1 << idx) != 0
    }

    /// Set a specific castling right
    #[inline]
    pub fn set(&mut self, color: Color, kingside: bool) {
        self.0 |= 1 << castle_index(color, kingside);
    }

    /// Remove a specific castling right
    #[inline]
    pub fn remove(&mut self, color: Color, kingside: bool) {
        self.0 &= !(1 << castle_index(color, kingside));
    }

    /// Remove a right by its FEN-order index
    #[inline]
    pub(crate) fn remove_index(&mut self, idx: usize) {
        self.0 &= !(1 << idx);
    }

    /// Remove both of a colour's rights
    #[inline]
    pub(crate) fn remove_color(&mut self, color: Color) {
        match color {
            Color::White => self.0 &= !(CASTLE_WHITE_K | CASTLE_WHITE_Q),
            Color::Black => self.0 &= !(CASTLE_BLACK_K | CASTLE_BLACK_Q),
        }
    }

    /// Returns true if no right is set
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the raw bitmask value
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}
