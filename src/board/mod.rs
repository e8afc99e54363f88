mod error;
mod fen;
mod lookup;
mod make_unmake;
mod movegen;
mod rules;
mod state;
mod types;

#[cfg(debug_assertions)]
mod debug;

#[cfg(test)]
mod tests;

pub use error::{FenError, MoveParseError, SquareError};
pub use rules::{Arbiter, AtomicRules, OrthoRules, Rules, Variant};
pub use state::{Position, UndoState};
pub use types::{Bitboard, CastlingRights, Color, Move, MoveList, MoveListIntoIter, Piece, Square};
