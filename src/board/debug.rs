//! Structural invariant checks, compiled into debug builds only.
//!
//! `make_move` and `unmake_move` call `debug_validate` on exit, so any
//! bitboard/mailbox divergence is caught at the operation that caused it
//! rather than thousands of nodes later in a perft run.

use super::rules::Variant;
use super::types::{Color, Piece, CASTLE_COLORS, KING_FROM_SQUARES, NUM_CASTLES, ROOK_FROM_SQUARES};
use super::Position;

impl Position {
    pub(crate) fn debug_validate(&self) {
        // No square may belong to both colours.
        assert_eq!(
            self.by_color[0].0 & self.by_color[1].0,
            0,
            "colour bitboards overlap"
        );

        // Piece-type boards partition the occupancy.
        let mut type_union = 0u64;
        let mut type_popcount = 0;
        for bb in &self.by_type {
            assert_eq!(type_union & bb.0, 0, "piece-type bitboards overlap");
            type_union |= bb.0;
            type_popcount += bb.0.count_ones();
        }
        let occupied = self.by_color[0].0 | self.by_color[1].0;
        assert_eq!(type_union, occupied, "type and colour occupancy differ");
        assert_eq!(
            type_popcount,
            occupied.count_ones(),
            "piece counts by type and by colour differ"
        );

        // The mailbox agrees with the bitboards square by square.
        for idx in 0..64 {
            let bit = 1u64 << idx;
            match self.mailbox[idx] {
                None => {
                    assert_eq!(occupied & bit, 0, "mailbox empty but bitboards occupied at {idx}");
                }
                Some((color, piece)) => {
                    assert_ne!(
                        self.by_color[color.index()].0 & bit,
                        0,
                        "mailbox colour disagrees with bitboards at {idx}"
                    );
                    assert_ne!(
                        self.by_type[piece.index()].0 & bit,
                        0,
                        "mailbox piece type disagrees with bitboards at {idx}"
                    );
                }
            }
        }

        // At most one king per side, and always exactly one in orthodox play.
        for color in Color::BOTH {
            let kings = self.pieces_of(color, Piece::King).count_ones();
            assert!(kings <= 1, "{color} has {kings} kings");
            if self.variant == Variant::Ortho && occupied != 0 {
                assert_eq!(kings, 1, "{color} must have a king in orthodox play");
            }
        }

        // En passant rights imply the double-pushed pawn behind the target.
        if let Some(ep) = self.ep_square {
            let expected_rank = match self.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            assert_eq!(ep.rank(), expected_rank, "ep square on wrong rank");
            let pawn_sq = match self.side_to_move {
                Color::White => ep.south(),
                Color::Black => ep.north(),
            };
            assert_eq!(
                self.piece_at(pawn_sq),
                Some((self.side_to_move.opponent(), Piece::Pawn)),
                "ep square without the pawn that passed it"
            );
        }

        // Castling rights assert their king and rook placement. A terminated
        // atomic game is exempt: a blast may remove a king while the far
        // rook's right is still formally set.
        if !self.is_variant_end() {
            for idx in 0..NUM_CASTLES {
                if self.castling_rights.has_index(idx) {
                    let color = CASTLE_COLORS[idx];
                    assert_eq!(
                        self.piece_at(KING_FROM_SQUARES[idx]),
                        Some((color, Piece::King)),
                        "castling right {idx} without king in place"
                    );
                    assert_eq!(
                        self.piece_at(ROOK_FROM_SQUARES[idx]),
                        Some((color, Piece::Rook)),
                        "castling right {idx} without rook in place"
                    );
                }
            }
        }

        // Halfmove parity tracks the side to move.
        assert_eq!(
            self.halfmove_num % 2 == 1,
            self.side_to_move == Color::Black,
            "halfmove counter out of step with side to move"
        );
    }
}
