//! Rule engines: variant-specific legality on top of shared generation.
//!
//! `Rules` is the judging interface; `OrthoRules` and `AtomicRules` are the
//! two concrete engines, and `Arbiter` binds one of them to a `Variant` tag
//! for callers that pick the rule set at runtime.

mod atomic;
mod ortho;

pub use atomic::AtomicRules;
pub use ortho::OrthoRules;

use super::error::{FenError, MoveParseError};
use super::lookup::{bishop_attacks, line_between, rook_attacks};
use super::types::{
    bit_for_square, castle_index, file_to_index, pop_lsb_u64, rank_to_index, Bitboard, Color, Move,
    MoveList, Piece, Square, KING_FROM_SQUARES, KING_PATH_MASKS, KING_TO_SQUARES, NUM_CASTLES,
    ROOK_FROM_SQUARES, ROOK_PATH_MASKS,
};
use super::Position;

/// The rule sets this crate knows how to judge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Orthodox chess.
    Ortho,
    /// Atomic chess: captures detonate, kings cannot capture.
    Atomic,
}

/// A legality engine for one variant.
///
/// `is_legal` assumes its argument is a valid (pseudo-legal) move for the
/// position, as produced by `generate_pseudo`; it answers whether making the
/// move would be allowed under the variant's king-safety rules.
pub trait Rules {
    /// Judge a pseudo-legal move.
    fn is_legal(&self, pos: &mut Position, mv: Move) -> bool;

    /// Whether a side is currently in check under this variant's rules.
    fn is_in_check(&self, pos: &Position, color: Color) -> bool;

    /// Bitboard of `by`-coloured units attacking a square.
    fn attacks_to(&self, pos: &Position, sq: Square, by: Color) -> u64;

    /// Whether an enemy king placed on `sq` would be in check by `by`. In
    /// orthodox chess this is plain attack; atomic carves out king
    /// adjacency.
    fn is_check_attacked(&self, pos: &Position, sq: Square, by: Color) -> bool;

    /// Whether any `by`-coloured unit attacks a square.
    fn is_attacked(&self, pos: &Position, sq: Square, by: Color) -> bool {
        self.attacks_to(pos, sq, by) != 0
    }

    /// All pseudo-legal moves for the side to move, in the fixed order:
    /// king, knight, bishop, rook, queen, pawn, en passant, castling.
    fn generate_pseudo(&self, pos: &Position) -> MoveList {
        let color = pos.side_to_move();
        let mut list = MoveList::new();
        pos.add_king_moves(&mut list, color);
        pos.add_knight_moves(&mut list, color);
        pos.add_slider_moves(&mut list, color, Piece::Bishop);
        pos.add_slider_moves(&mut list, color, Piece::Rook);
        pos.add_slider_moves(&mut list, color, Piece::Queen);
        pos.add_pawn_moves(&mut list, color);
        pos.add_ep_moves(&mut list, color);
        self.add_castling_moves(pos, color, &mut list);
        list
    }

    /// All legal moves for the side to move. Empty on a terminated
    /// (variant-end) position.
    fn generate_legal(&self, pos: &mut Position) -> MoveList {
        let mut legal = MoveList::new();
        if pos.is_variant_end() {
            return legal;
        }
        let pseudo = self.generate_pseudo(pos);
        for mv in &pseudo {
            if self.is_legal(pos, *mv) {
                legal.push(*mv);
            }
        }
        legal
    }

    /// Castling candidates for a colour, kingside before queenside.
    fn add_castling_moves(&self, pos: &Position, color: Color, list: &mut MoveList) {
        for kingside in [true, false] {
            let idx = castle_index(color, kingside);
            if self.is_castling_valid(pos, idx) {
                list.push(Move::castle(KING_FROM_SQUARES[idx], ROOK_FROM_SQUARES[idx]));
            }
        }
    }

    /// Validity test for one castling right: the right is still held, both
    /// paths are clear apart from the king and rook themselves, and no
    /// square the king crosses (origin and destination included) is
    /// check-attacked on the board as it stands.
    fn is_castling_valid(&self, pos: &Position, idx: usize) -> bool {
        debug_assert!(idx < NUM_CASTLES);
        if !pos.castling_rights().has_index(idx) {
            return false;
        }
        let others = pos.occupied()
            ^ bit_for_square(KING_FROM_SQUARES[idx]).0
            ^ bit_for_square(ROOK_FROM_SQUARES[idx]).0;
        if (KING_PATH_MASKS[idx] | ROOK_PATH_MASKS[idx]) & others != 0 {
            return false;
        }
        let enemy = super::types::CASTLE_COLORS[idx].opponent();
        let mut path = KING_PATH_MASKS[idx];
        while path != 0 {
            let sq = pop_lsb_u64(&mut path);
            if self.is_check_attacked(pos, Square::from_index(sq), enemy) {
                return false;
            }
        }
        true
    }

    /// Count of legal-move leaves at the given depth.
    fn perft(&self, pos: &mut Position, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.generate_legal(pos);
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for mv in &moves {
            pos.make_move(*mv);
            nodes += self.perft(pos, depth - 1);
            pos.unmake_move(*mv);
        }
        nodes
    }

    /// Per-root-move perft subtotals, in generation order.
    fn perft_split(&self, pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
        debug_assert!(depth >= 1);
        let moves = self.generate_legal(pos);
        let mut results = Vec::with_capacity(moves.len());
        for mv in &moves {
            pos.make_move(*mv);
            results.push((*mv, self.perft(pos, depth - 1)));
            pos.unmake_move(*mv);
        }
        results
    }
}

/// Bitboard of `color`'s absolutely pinned pieces.
///
/// Phantom slider rays are cast from the king over an occupancy of just the
/// king, so they extend through everything; each enemy rook/bishop/queen hit
/// that way pins the single unit (if any) standing strictly between it and
/// the king.
pub(crate) fn pinned(pos: &Position, color: Color) -> u64 {
    let king_bb = pos.pieces_of(color, Piece::King);
    if king_bb == 0 {
        return 0;
    }
    let ks = Bitboard(king_bb).lsb();
    let occupied = pos.occupied();
    let friendly = pos.occupied_by(color);
    let them = color.opponent();

    let rook_like = pos.pieces_of(them, Piece::Rook) | pos.pieces_of(them, Piece::Queen);
    let bishop_like = pos.pieces_of(them, Piece::Bishop) | pos.pieces_of(them, Piece::Queen);
    let mut pinners = (rook_attacks(ks.as_index(), king_bb) & rook_like)
        | (bishop_attacks(ks.as_index(), king_bb) & bishop_like);

    let mut pinned_bb = 0u64;
    while pinners != 0 {
        let pinner = pop_lsb_u64(&mut pinners);
        let ray_units = line_between(Square::from_index(pinner), ks) & occupied;
        if Bitboard(ray_units).is_single() {
            pinned_bb |= ray_units & friendly;
        }
    }
    pinned_bb
}

/// Binds a rule engine to a `Variant` chosen at runtime.
///
/// The arbiter owns exactly one engine at a time; switching variants
/// replaces it.
pub struct Arbiter {
    variant: Variant,
    rules: Box<dyn Rules>,
}

impl Arbiter {
    #[must_use]
    pub fn new(variant: Variant) -> Self {
        Arbiter {
            variant,
            rules: Self::engine_for(variant),
        }
    }

    fn engine_for(variant: Variant) -> Box<dyn Rules> {
        match variant {
            Variant::Ortho => Box::new(OrthoRules),
            Variant::Atomic => Box::new(AtomicRules),
        }
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: Variant) {
        self.variant = variant;
        self.rules = Self::engine_for(variant);
    }

    /// The bound rule engine.
    #[must_use]
    pub fn rules(&self) -> &dyn Rules {
        self.rules.as_ref()
    }

    /// Construct a position of the arbiter's variant from FEN.
    pub fn position_from_fen(&self, fen: &str) -> Result<Position, FenError> {
        Position::from_fen(fen, self.variant)
    }

    pub fn is_legal(&self, pos: &mut Position, mv: Move) -> bool {
        debug_assert_eq!(pos.variant(), self.variant);
        self.rules.is_legal(pos, mv)
    }

    #[must_use]
    pub fn is_in_check(&self, pos: &Position, color: Color) -> bool {
        debug_assert_eq!(pos.variant(), self.variant);
        self.rules.is_in_check(pos, color)
    }

    pub fn generate_legal(&self, pos: &mut Position) -> MoveList {
        debug_assert_eq!(pos.variant(), self.variant);
        self.rules.generate_legal(pos)
    }

    pub fn perft(&self, pos: &mut Position, depth: u32) -> u64 {
        debug_assert_eq!(pos.variant(), self.variant);
        let nodes = self.rules.perft(pos, depth);
        #[cfg(feature = "logging")]
        log::debug!("perft depth {depth}: {nodes} nodes");
        nodes
    }

    pub fn perft_split(&self, pos: &mut Position, depth: u32) -> Vec<(Move, u64)> {
        debug_assert_eq!(pos.variant(), self.variant);
        let results = self.rules.perft_split(pos, depth);
        #[cfg(feature = "logging")]
        for (mv, nodes) in &results {
            log::debug!("perft split {mv}: {nodes}");
        }
        results
    }

    /// Resolve a move in long algebraic notation (e.g. "e2e4", "e7e8q")
    /// against the legal moves of the position.
    ///
    /// Castling is accepted in either encoding: king-to-rook ("e1h1") as
    /// generated, or the common king-destination form ("e1g1").
    ///
    /// ```
    /// use atomic_chess::board::{Arbiter, Variant};
    ///
    /// let arbiter = Arbiter::new(Variant::Ortho);
    /// let mut pos = arbiter
    ///     .position_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
    ///     .unwrap();
    /// let mv = arbiter.parse_move(&mut pos, "e2e4").unwrap();
    /// assert_eq!(mv.to_string(), "e2e4");
    /// ```
    pub fn parse_move(&self, pos: &mut Position, text: &str) -> Result<Move, MoveParseError> {
        if text.len() < 4 || text.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: text.len() });
        }
        let chars: Vec<char> = text.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: text.to_string(),
            });
        }
        let from = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
        let to = Square::new(rank_to_index(chars[3]), file_to_index(chars[2]));

        let promotion = if text.len() == 5 {
            let piece = Piece::from_char(chars[4])
                .ok_or(MoveParseError::InvalidPromotion { char: chars[4] })?;
            if matches!(piece, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            Some(piece)
        } else {
            None
        };

        let legal = self.generate_legal(pos);
        for mv in &legal {
            if mv.from() == from && mv.to() == to && mv.promotion() == promotion {
                return Ok(*mv);
            }
        }
        // King-destination castling notation
        if promotion.is_none() {
            for mv in &legal {
                if !mv.is_castling() || mv.from() != from {
                    continue;
                }
                let idx = castle_index(pos.side_to_move(), mv.to().file() > mv.from().file());
                if KING_TO_SQUARES[idx] == to {
                    return Ok(*mv);
                }
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: text.to_string(),
        })
    }
}
