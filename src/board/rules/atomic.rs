//! The rules of atomic chess.
//!
//! Every capture detonates the captured piece, the capturing piece, and all
//! non-pawn pieces on the eight squares around the target. Kings cannot
//! capture, so they attack nothing; and when the two kings stand adjacent
//! ("connected"), check is not in force at all.
//!
//! The engine judges legality from the pre-move bitboards, without
//! make/unmake on the common paths: the blast's effect on the occupancy is
//! modelled directly, covering newly opened rays, checkers destroyed by the
//! explosion, king adjacency, and pins. A make/unmake oracle is kept for the
//! rare cases (en passant, castling) and as a debug cross-check on every
//! answer.

use super::super::lookup::{
    bishop_attacks, line_between, rook_attacks, BLAST_MASKS, KNIGHT_ATTACKS, PAWN_ATTACKS,
};
use super::super::types::{bit_for_square, Bitboard, Color, Move, Piece, Square};
use super::super::Position;
use super::{pinned, Rules};

/// Atomic-chess legality engine.
pub struct AtomicRules;

impl AtomicRules {
    /// Make/unmake oracle: reliable for every move kind, and the reference
    /// the optimised predicates must agree with.
    pub(crate) fn is_legal_naive(&self, pos: &mut Position, mv: Move) -> bool {
        let color = pos.side_to_move();
        pos.make_move(mv);
        let ok = if pos.pieces_of(color, Piece::King) == 0 {
            // exploded own king
            false
        } else if pos.pieces_of(color.opponent(), Piece::King) == 0 {
            // exploded enemy king
            true
        } else {
            !self.is_in_check(pos, color)
        };
        pos.unmake_move(mv);
        ok
    }

    /// Both kings within each other's blast radius. Assumes both kings are
    /// on the board; callers guard with `is_variant_end`.
    fn is_connected_kings(&self, pos: &Position) -> bool {
        let black_king = Bitboard(pos.pieces_of(Color::Black, Piece::King));
        if black_king.is_empty() {
            return false;
        }
        pos.pieces_of(Color::White, Piece::King) & BLAST_MASKS[black_king.lsb().as_index()] != 0
    }

    /// Legality of a non-king, non-en-passant capture, decided from the
    /// pre-explosion bitboards.
    pub(crate) fn is_capture_legal(&self, pos: &Position, from: Square, to: Square) -> bool {
        let color = pos.side_to_move();
        let them = color.opponent();
        let king_bb = pos.pieces_of(color, Piece::King);
        let enemy_king_bb = pos.pieces_of(them, Piece::King);
        let occupied = pos.occupied();
        let blast = BLAST_MASKS[to.as_index()];

        // Blowing up one's own king loses on the spot; blowing up the
        // enemy's wins regardless of any check against us.
        if king_bb & blast != 0 {
            return false;
        }
        if enemy_king_bb & blast != 0 {
            return true;
        }
        let king_sq = Bitboard(king_bb).lsb();
        if enemy_king_bb & BLAST_MASKS[king_sq.as_index()] != 0 {
            // Connected kings: no check to answer, and the capture cannot be
            // a king capture since kings never capture.
            return true;
        }

        // Kings are not connected, so checkers are genuine. The squares
        // vacated by the explosion: every non-pawn in the blast, plus the
        // target square itself (a directly captured pawn still dies).
        let checkers = self.attacks_to(pos, king_sq, them);
        let exploded =
            (blast & occupied & !pos.pieces_by_type(Piece::Pawn)) | bit_for_square(to).0;
        // If in check already, the blast must destroy every checker.
        if checkers & exploded != checkers {
            return false;
        }

        // Occupancy as it would stand after the move; the capturer leaves
        // its origin square too.
        let occ = occupied & !(exploded | bit_for_square(from).0);
        let king_idx = king_sq.as_index();
        if occ & KNIGHT_ATTACKS[king_idx] & pos.pieces_of(them, Piece::Knight) != 0 {
            return false;
        }
        if occ & PAWN_ATTACKS[color.index()][king_idx] & pos.pieces_of(them, Piece::Pawn) != 0 {
            return false;
        }
        if occ
            & rook_attacks(king_idx, occ)
            & (pos.pieces_of(them, Piece::Rook) | pos.pieces_of(them, Piece::Queen))
            != 0
        {
            return false;
        }
        if occ
            & bishop_attacks(king_idx, occ)
            & (pos.pieces_of(them, Piece::Bishop) | pos.pieces_of(them, Piece::Queen))
            != 0
        {
            return false;
        }
        true
    }

    /// Whether from/to describe a legal interposition. Assumes the side to
    /// move is in (real) check.
    fn is_interposition_legal(&self, pos: &Position, from: Square, to: Square) -> bool {
        let color = pos.side_to_move();
        let king_sq = Bitboard(pos.pieces_of(color, Piece::King)).lsb();
        let checkers = Bitboard(self.attacks_to(pos, king_sq, color.opponent()));

        if !checkers.is_single() {
            return false;
        }
        let checker_sq = checkers.lsb();
        let (_, checker_type) = pos
            .piece_at(checker_sq)
            .expect("checker square holds no piece");
        // Contact checks cannot be interposed.
        if matches!(checker_type, Piece::Pawn | Piece::Knight) {
            return false;
        }
        bit_for_square(from).0 & pinned(pos, color) == 0
            && line_between(checker_sq, king_sq) & bit_for_square(to).0 != 0
    }

    fn is_legal_impl(&self, pos: &mut Position, mv: Move) -> bool {
        // No moves are legal once a king has been detonated.
        if pos.is_variant_end() {
            return false;
        }
        // En passant and castling are rare and interact subtly with the
        // blast; judge them by trial.
        if mv.is_en_passant() || mv.is_castling() {
            return self.is_legal_naive(pos, mv);
        }

        let color = pos.side_to_move();
        let from = mv.from();
        let to = mv.to();

        // King moves: kings cannot capture, and the destination is probed
        // with the king lifted off its origin so rays extend through it.
        if let Some((_, Piece::King)) = pos.piece_at(from) {
            if pos.piece_at(to).is_some() {
                return false;
            }
            pos.ghost_king(color, from);
            let ok = !self.is_check_attacked(pos, to, color.opponent());
            pos.unghost_king(color, from);
            return ok;
        }

        if pos.piece_at(to).is_some() {
            return self.is_capture_legal(pos, from, to);
        }

        // Quiet moves. With connected kings nothing can be check, and the
        // mover is not the king.
        if self.is_connected_kings(pos) {
            return true;
        }
        let king_sq = Bitboard(pos.pieces_of(color, Piece::King)).lsb();
        if self.attacks_to(pos, king_sq, color.opponent()) != 0 {
            return self.is_interposition_legal(pos, from, to);
        }
        // Pinned pieces may only move along the pin ray; either direction of
        // the containment test covers both sides of the king.
        if bit_for_square(from).0 & pinned(pos, color) != 0 {
            return line_between(from, king_sq) & bit_for_square(to).0 != 0
                || line_between(to, king_sq) & bit_for_square(from).0 != 0;
        }
        true
    }
}

impl Rules for AtomicRules {
    fn is_legal(&self, pos: &mut Position, mv: Move) -> bool {
        let verdict = self.is_legal_impl(pos, mv);
        debug_assert_eq!(
            verdict,
            self.is_legal_naive(pos, mv),
            "atomic fast path disagrees with make/unmake oracle for {mv:?}"
        );
        verdict
    }

    /// A king is in check when attacked by anything but the enemy king,
    /// except that connected kings cancel check entirely. A side with no
    /// king is not "in check"; that state is a variant loss and is handled
    /// by `is_variant_end`.
    fn is_in_check(&self, pos: &Position, color: Color) -> bool {
        let king_bb = Bitboard(pos.pieces_of(color, Piece::King));
        if king_bb.is_empty() {
            return false;
        }
        let king_sq = king_bb.lsb();
        if self.attacks_to(pos, king_sq, color.opponent()) == 0 {
            return false;
        }
        pos.pieces_of(color.opponent(), Piece::King) & BLAST_MASKS[king_sq.as_index()] == 0
    }

    /// As orthodox, minus the king term: kings cannot capture, so they do
    /// not attack.
    fn attacks_to(&self, pos: &Position, sq: Square, by: Color) -> u64 {
        let occupied = pos.occupied();
        let target = sq.as_index();

        let mut attackers = KNIGHT_ATTACKS[target] & pos.pieces_of(by, Piece::Knight);
        attackers |= bishop_attacks(target, occupied)
            & (pos.pieces_of(by, Piece::Bishop) | pos.pieces_of(by, Piece::Queen));
        attackers |= rook_attacks(target, occupied)
            & (pos.pieces_of(by, Piece::Rook) | pos.pieces_of(by, Piece::Queen));
        attackers |= PAWN_ATTACKS[by.opponent().index()][target] & pos.pieces_of(by, Piece::Pawn);
        attackers
    }

    /// An enemy king on `sq` would be in check by `by` unless `by`'s own
    /// king sits adjacent to `sq`.
    fn is_check_attacked(&self, pos: &Position, sq: Square, by: Color) -> bool {
        BLAST_MASKS[sq.as_index()] & pos.pieces_of(by, Piece::King) == 0
            && self.attacks_to(pos, sq, by) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::super::Variant;
    use super::*;
    use crate::board::MoveList;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen, Variant::Atomic).unwrap()
    }

    fn legal(fen: &str) -> MoveList {
        AtomicRules.generate_legal(&mut pos(fen))
    }

    #[test]
    fn test_atomic_start_matches_ortho_count() {
        assert_eq!(legal("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").len(), 20);
    }

    #[test]
    fn test_king_cannot_capture() {
        let rules = AtomicRules;
        let mut p = pos("4k3/8/8/8/8/8/3q4/3K4 w - - 0 1");
        let capture = Move::new(Square::new(0, 3), Square::new(1, 3));
        assert!(!rules.is_legal(&mut p, capture));
        // The queen covers every flight square: no legal moves at all
        assert!(rules.generate_legal(&mut p).is_empty());
    }

    #[test]
    fn test_exploding_enemy_king_overrides_check() {
        let rules = AtomicRules;
        // The rook on e7 checks the white king, but Qd1xd8 catches the black
        // king in the blast: an instant win, legal despite the check.
        let mut p = pos("3qk3/4r3/8/8/8/8/8/3QK3 w - - 0 1");
        assert!(rules.is_in_check(&p, Color::White));
        assert!(rules.is_legal(&mut p, Move::new(Square::new(0, 3), Square::new(7, 3))));
    }

    #[test]
    fn test_cannot_explode_own_king() {
        let rules = AtomicRules;
        // White queen could capture d2, but the white king on e1 is adjacent
        // to the blast square.
        let mut p = pos("4k3/8/8/8/8/8/3r4/2Q1K3 w - - 0 1");
        assert!(!rules.is_legal(&mut p, Move::new(Square::new(0, 2), Square::new(1, 3))));
    }

    #[test]
    fn test_connected_kings_cancel_check() {
        let rules = AtomicRules;
        // Kings on d7/e8 are connected; the rook on d4 "attacks" the white
        // king but there is no check.
        let p = pos("4k3/3K4/8/8/3r4/8/8/8 w - - 0 1");
        assert!(rules.is_attacked(&p, Square::new(6, 3), Color::Black));
        assert!(!rules.is_in_check(&p, Color::White));
    }

    #[test]
    fn test_connected_kings_king_move_rules() {
        let moves = legal("4k3/3K4/8/8/3r4/8/8/8 w - - 0 1");
        let targets: Vec<Square> = moves.iter().map(|m| m.to()).collect();
        // Staying connected on d8 is fine even though the rook covers d8
        assert!(targets.contains(&Square::new(7, 3)));
        // Stepping to d6 disconnects into the rook's file: illegal
        assert!(!targets.contains(&Square::new(5, 3)));
        // Capturing the enemy king is never a move
        assert!(!targets.contains(&Square::new(7, 4)));
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn test_kings_do_not_attack() {
        let rules = AtomicRules;
        let p = pos("8/8/8/8/8/2k5/8/K7 w - - 0 1");
        // The black king is adjacent to b2 but attacks nothing
        assert!(!rules.is_attacked(&p, Square::new(1, 1), Color::Black));
    }

    #[test]
    fn test_check_attacked_carveout() {
        let rules = AtomicRules;
        let p = pos("4k3/8/8/8/8/8/8/3RK3 w - - 0 1");
        // The rook on d1 covers d8; the carve-out looks at the attacker's
        // own king, so the black king next to d8 changes nothing.
        assert!(rules.is_check_attacked(&p, Square::new(7, 3), Color::White));
        // A square next to White's own king is never check-attacked by White
        assert!(!rules.is_check_attacked(&p, Square::new(1, 4), Color::White));
    }

    #[test]
    fn test_capture_must_remove_all_checkers() {
        let rules = AtomicRules;
        // White is checked by the rook on e8. Capturing the knight on b6
        // does not touch the checker: illegal.
        let mut p = pos("3kr3/8/1n6/8/3B4/8/8/4K3 w - - 0 1");
        assert!(rules.is_in_check(&p, Color::White));
        assert!(!rules.is_legal(&mut p, Move::new(Square::new(3, 3), Square::new(5, 1))));
    }

    #[test]
    fn test_capture_that_explodes_checker_is_legal() {
        let rules = AtomicRules;
        // The rook on e4 checks the white king; Nc2xd4 catches the rook in
        // the blast, answering the check by explosion.
        let mut p = pos("k7/8/8/8/3pr3/8/2N5/4K3 w - - 0 1");
        assert!(rules.is_in_check(&p, Color::White));
        assert!(rules.is_legal(&mut p, Move::new(Square::new(1, 2), Square::new(3, 3))));
    }

    #[test]
    fn test_residual_check_through_opened_ray() {
        let rules = AtomicRules;
        // The knight on e4 shields the white king from the rook on e8.
        // Ne4xc5 vacates the e-file without catching the rook in the blast,
        // so the ray it opens leaves White in check: illegal.
        let mut p = pos("4r1k1/8/8/2p5/4N3/8/8/4K3 w - - 0 1");
        assert!(!rules.is_in_check(&p, Color::White));
        assert!(!rules.is_legal(&mut p, Move::new(Square::new(3, 4), Square::new(4, 2))));
    }

    #[test]
    fn test_no_moves_after_variant_end() {
        let rules = AtomicRules;
        // Black has no king: the game is over for every purpose.
        let mut p = pos("8/8/8/8/8/8/8/Q3K3 w - - 0 1");
        assert!(p.is_variant_end());
        assert!(rules.generate_legal(&mut p).is_empty());
        assert!(!rules.is_legal(&mut p, Move::new(Square::new(0, 0), Square::new(0, 1))));
        assert!(!rules.is_in_check(&p, Color::Black));
    }

    #[test]
    fn test_oracle_and_fast_path_agree_on_pseudo_moves() {
        let rules = AtomicRules;
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "4k3/8/8/3q4/3Q4/8/8/4K3 w - - 0 1",
            "4k3/3K4/8/8/3r4/8/8/8 w - - 0 1",
            "3kr3/8/1n6/8/8/8/1B6/4K3 w - - 0 1",
            "rnb1kbnr/pp1ppppp/8/q1p5/3P4/4P3/PPP2PPP/RNBQKBNR w KQkq - 2 3",
        ];
        for fen in fens {
            let mut p = pos(fen);
            let pseudo = rules.generate_pseudo(&p);
            for mv in &pseudo {
                assert_eq!(
                    rules.is_legal_impl(&mut p, *mv),
                    rules.is_legal_naive(&mut p, *mv),
                    "disagreement on {mv:?} in {fen}"
                );
            }
        }
    }
}
