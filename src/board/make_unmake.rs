//! Making and unmaking moves for both variants.
//!
//! Moves are assumed valid (produced by the pseudo-legal generator); they
//! need not be legal. `make_move` followed by `unmake_move` of the same move
//! restores the position bit-exactly, including the undo stack depth.

use super::lookup::BLAST_MASKS;
use super::rules::Variant;
use super::state::UndoState;
use super::types::{
    bit_for_square, castle_index, pop_lsb, Bitboard, Color, Move, Piece, Square, KING_FROM_SQUARES,
    KING_TO_SQUARES, NUM_CASTLES, ROOK_FROM_SQUARES, ROOK_TO_SQUARES,
};
use super::Position;

// Rank masks relative to the moving colour, for double-push detection.
const PAWN_START_RANKS: [u64; 2] = [Bitboard::RANK_2.0, Bitboard::RANK_7.0];
const DOUBLE_PUSH_RANKS: [u64; 2] = [Bitboard::RANK_4.0, Bitboard::RANK_5.0];

/// Square of the pawn captured en passant: one rank behind the target.
fn ep_victim_square(mover: Color, to: Square) -> Square {
    match mover {
        Color::White => to.south(),
        Color::Black => to.north(),
    }
}

impl Position {
    /// Apply a move, pushing one undo frame.
    pub fn make_move(&mut self, mv: Move) {
        if mv.is_castling() {
            self.make_castling_move(mv);
        } else {
            match self.variant {
                Variant::Ortho => self.make_normal_ortho(mv),
                Variant::Atomic => self.make_normal_atomic(mv),
            }
        }
        #[cfg(debug_assertions)]
        self.debug_validate();
    }

    /// Retract a move made by `make_move`, popping its undo frame.
    pub fn unmake_move(&mut self, mv: Move) {
        if mv.is_castling() {
            self.unmake_castling_move(mv);
        } else {
            match self.variant {
                Variant::Ortho => self.unmake_normal_ortho(mv),
                Variant::Atomic => self.unmake_normal_atomic(mv),
            }
        }
        #[cfg(debug_assertions)]
        self.debug_validate();
    }

    fn make_normal_ortho(&mut self, mv: Move) {
        let from = mv.from();
        let to = mv.to();
        let (color, piece) = self
            .piece_at(from)
            .expect("make_move: from-square is empty");
        let captured = self.piece_at(to);

        self.remove_piece(from, color, piece);
        if let Some((cap_color, cap_piece)) = captured {
            self.remove_piece(to, cap_color, cap_piece);
        }
        if mv.is_en_passant() {
            let victim = ep_victim_square(color, to);
            self.remove_piece(victim, color.opponent(), Piece::Pawn);
        }
        if let Some(promo) = mv.promotion() {
            self.set_piece(to, color, promo);
        } else {
            self.set_piece(to, color, piece);
        }

        self.undo_stack.push(UndoState {
            captured_piece: captured,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            fifty_move: self.fifty_move,
            moved_piece: Some((color, piece)),
            exploded_by_color: [Bitboard::EMPTY; 2],
            exploded_by_type: [Bitboard::EMPTY; 6],
        });

        self.update_ep_rights(color, piece, from, to);
        self.update_mover_castling_rights(color, piece, from);
        // An orthodox capture removes a rook right if it lands on the rook's
        // original square.
        if let Some((cap_color, Piece::Rook)) = captured {
            for idx in 0..NUM_CASTLES {
                if to == ROOK_FROM_SQUARES[idx] && self.castling_rights.has_index(idx) {
                    debug_assert_eq!(cap_color, super::types::CASTLE_COLORS[idx]);
                    self.castling_rights.remove_index(idx);
                }
            }
        }
        self.finish_move(captured.is_some() || mv.is_en_passant() || piece == Piece::Pawn);
    }

    fn unmake_normal_ortho(&mut self, mv: Move) {
        let undo = self
            .undo_stack
            .pop()
            .expect("unmake_move: undo stack is empty");
        self.rewind_state(&undo);

        let from = mv.from();
        let to = mv.to();
        let color = self.side_to_move;
        let (pc_color, pc_at_to) = self
            .piece_at(to)
            .expect("unmake_move: to-square is empty");

        self.remove_piece(to, pc_color, pc_at_to);
        if mv.promotion().is_some() {
            self.set_piece(from, color, Piece::Pawn);
        } else {
            self.set_piece(from, pc_color, pc_at_to);
        }
        if let Some((cap_color, cap_piece)) = undo.captured_piece {
            self.set_piece(to, cap_color, cap_piece);
        }
        if mv.is_en_passant() {
            let victim = ep_victim_square(color, to);
            self.set_piece(victim, color.opponent(), Piece::Pawn);
        }
    }

    fn make_normal_atomic(&mut self, mv: Move) {
        let from = mv.from();
        let to = mv.to();
        let (color, piece) = self
            .piece_at(from)
            .expect("make_move: from-square is empty");
        let captured = self.piece_at(to);
        let is_capture = captured.is_some();
        let is_ep = mv.is_en_passant();
        let mask = BLAST_MASKS[to.as_index()];
        let them = color.opponent();

        let mut exploded_by_color = [Bitboard::EMPTY; 2];
        let mut exploded_by_type = [Bitboard::EMPTY; 6];

        // The capturing piece leaves its origin before the blast is swept, so
        // it is never recorded among the exploded units.
        self.remove_piece(from, color, piece);

        if is_capture || is_ep {
            // Every non-pawn unit in the blast radius is destroyed. Pawns are
            // skipped here (index 0) and survive unless captured directly.
            for t in 1..6 {
                let hit = self.by_type[t].0 & mask;
                exploded_by_type[t].0 |= hit;
                self.by_type[t].0 &= !hit;
            }
            let pawns = self.by_type[Piece::Pawn.index()].0;
            for c in 0..2 {
                let hit = self.by_color[c].0 & mask & !pawns;
                exploded_by_color[c].0 |= hit;
                self.by_color[c].0 &= !hit;
            }
            // The directly captured unit always dies, pawn or not.
            if let Some((cap_color, Piece::Pawn)) = captured {
                let bit = bit_for_square(to).0;
                exploded_by_color[cap_color.index()].0 |= bit;
                exploded_by_type[Piece::Pawn.index()].0 |= bit;
                self.by_color[cap_color.index()].0 &= !bit;
                self.by_type[Piece::Pawn.index()].0 &= !bit;
            }
            if is_ep {
                let victim = ep_victim_square(color, to);
                let bit = bit_for_square(victim).0;
                exploded_by_color[them.index()].0 |= bit;
                exploded_by_type[Piece::Pawn.index()].0 |= bit;
                self.by_color[them.index()].0 &= !bit;
                self.by_type[Piece::Pawn.index()].0 &= !bit;
            }
            // The bitboards are settled; clear the mailbox in one pass. The
            // moving piece is not placed anywhere: it went up with the blast.
            let mut cleared = Bitboard(exploded_by_color[0].0 | exploded_by_color[1].0);
            while !cleared.is_empty() {
                let sq = pop_lsb(&mut cleared);
                self.mailbox[sq.as_index()] = None;
            }
        } else if let Some(promo) = mv.promotion() {
            self.set_piece(to, color, promo);
        } else {
            self.set_piece(to, color, piece);
        }

        self.undo_stack.push(UndoState {
            captured_piece: captured,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            fifty_move: self.fifty_move,
            moved_piece: Some((color, piece)),
            exploded_by_color,
            exploded_by_type,
        });

        self.update_ep_rights(color, piece, from, to);
        self.update_mover_castling_rights(color, piece, from);
        // A blast reaching an original rook square takes that right with it,
        // whether the rook was captured directly or merely stood nearby.
        if is_capture || is_ep {
            for idx in 0..NUM_CASTLES {
                if mask & bit_for_square(ROOK_FROM_SQUARES[idx]).0 != 0 {
                    self.castling_rights.remove_index(idx);
                }
            }
        }
        self.finish_move(is_capture || is_ep || piece == Piece::Pawn);
    }

    fn unmake_normal_atomic(&mut self, mv: Move) {
        let undo = self
            .undo_stack
            .pop()
            .expect("unmake_move: undo stack is empty");
        self.rewind_state(&undo);

        let from = mv.from();
        let to = mv.to();
        let color = self.side_to_move;

        // After an atomic capture the target square is empty (the mover was
        // destroyed too); a quiet move leaves the mover standing there.
        match self.piece_at(to) {
            None => {
                for (c, exploded) in undo.exploded_by_color.iter().enumerate() {
                    for (t, by_type) in undo.exploded_by_type.iter().enumerate() {
                        let mut units = Bitboard(exploded.0 & by_type.0);
                        while !units.is_empty() {
                            let sq = pop_lsb(&mut units);
                            self.set_piece(sq, Color::BOTH[c], Piece::ALL[t]);
                        }
                    }
                }
                let (mv_color, mv_piece) = undo
                    .moved_piece
                    .expect("unmake_move: capture frame without moved piece");
                self.set_piece(from, mv_color, mv_piece);
            }
            Some((pc_color, pc_at_to)) => {
                self.remove_piece(to, pc_color, pc_at_to);
                if mv.promotion().is_some() {
                    self.set_piece(from, color, Piece::Pawn);
                } else {
                    self.set_piece(from, pc_color, pc_at_to);
                }
            }
        }
    }

    /// Castling path shared by both variants. The move carries the king's
    /// and rook's original squares; destinations follow from the side.
    fn make_castling_move(&mut self, mv: Move) {
        let color = self.side_to_move;
        let king_from = mv.from();
        let rook_from = mv.to();
        let idx = castle_index(color, rook_from.file() > king_from.file());
        let king_to = KING_TO_SQUARES[idx];
        let rook_to = ROOK_TO_SQUARES[idx];

        self.remove_piece(king_from, color, Piece::King);
        self.remove_piece(rook_from, color, Piece::Rook);
        self.set_piece(king_to, color, Piece::King);
        self.set_piece(rook_to, color, Piece::Rook);

        self.undo_stack.push(UndoState {
            captured_piece: None,
            castling_rights: self.castling_rights,
            ep_square: self.ep_square,
            fifty_move: self.fifty_move,
            moved_piece: Some((color, Piece::King)),
            exploded_by_color: [Bitboard::EMPTY; 2],
            exploded_by_type: [Bitboard::EMPTY; 6],
        });

        self.ep_square = None;
        self.castling_rights.remove_color(color);
        self.finish_move(false);
    }

    fn unmake_castling_move(&mut self, mv: Move) {
        let undo = self
            .undo_stack
            .pop()
            .expect("unmake_move: undo stack is empty");
        self.rewind_state(&undo);

        let color = self.side_to_move;
        let king_from = mv.from();
        let rook_from = mv.to();
        let idx = castle_index(color, rook_from.file() > king_from.file());

        self.remove_piece(KING_TO_SQUARES[idx], color, Piece::King);
        self.remove_piece(ROOK_TO_SQUARES[idx], color, Piece::Rook);
        self.set_piece(king_from, color, Piece::King);
        self.set_piece(rook_from, color, Piece::Rook);
    }

    /// En passant rights arise exactly when a pawn moves two ranks; the
    /// target is the square passed over.
    fn update_ep_rights(&mut self, color: Color, piece: Piece, from: Square, to: Square) {
        let c = color.index();
        self.ep_square = if piece == Piece::Pawn
            && bit_for_square(from).0 & PAWN_START_RANKS[c] != 0
            && bit_for_square(to).0 & DOUBLE_PUSH_RANKS[c] != 0
        {
            Some(Square::from_index((from.as_index() + to.as_index()) / 2))
        } else {
            None
        };
    }

    /// Rights lost by the moving side: both on a king move from its original
    /// square, one on a rook move from its original square. Rights are never
    /// regained.
    fn update_mover_castling_rights(&mut self, color: Color, piece: Piece, from: Square) {
        if piece == Piece::King {
            if from == KING_FROM_SQUARES[castle_index(color, true)] {
                self.castling_rights.remove_color(color);
            }
        } else if piece == Piece::Rook {
            for idx in 0..NUM_CASTLES {
                if from == ROOK_FROM_SQUARES[idx]
                    && super::types::CASTLE_COLORS[idx] == color
                {
                    self.castling_rights.remove_index(idx);
                }
            }
        }
    }

    /// Counter and side-to-move updates shared by every make path.
    fn finish_move(&mut self, resets_fifty: bool) {
        if resets_fifty {
            self.fifty_move = 0;
        } else {
            self.fifty_move += 1;
        }
        self.halfmove_num += 1;
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Restore the irreversible fields from an undo frame.
    fn rewind_state(&mut self, undo: &UndoState) {
        self.side_to_move = self.side_to_move.opponent();
        self.castling_rights = undo.castling_rights;
        self.ep_square = undo.ep_square;
        self.fifty_move = undo.fifty_move;
        self.halfmove_num -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ortho(fen: &str) -> Position {
        Position::from_fen(fen, Variant::Ortho).unwrap()
    }

    fn atomic(fen: &str) -> Position {
        Position::from_fen(fen, Variant::Atomic).unwrap()
    }

    #[test]
    fn test_quiet_move_updates_counters() {
        let mut pos = ortho("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        pos.make_move(Move::new(Square::new(0, 6), Square::new(2, 5))); // Ng1-f3
        assert_eq!(pos.side_to_move(), Color::Black);
        assert_eq!(pos.fifty_move(), 1);
        assert_eq!(pos.halfmove_num(), 1);
        assert_eq!(pos.undo_depth(), 1);
    }

    #[test]
    fn test_double_push_sets_ep_square() {
        let mut pos = ortho("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        pos.make_move(Move::new(Square::new(1, 4), Square::new(3, 4))); // e2-e4
        assert_eq!(pos.ep_square(), Some(Square::new(2, 4)));
        assert_eq!(pos.fifty_move(), 0);
    }

    #[test]
    fn test_make_unmake_restores_exactly() {
        let mut pos = ortho("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = pos.clone();
        let mv = Move::new(Square::new(4, 3), Square::new(5, 4)); // d5xe6
        pos.make_move(mv);
        assert_ne!(pos, before);
        pos.unmake_move(mv);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_castling_moves_both_pieces() {
        let mut pos = ortho("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        let before = pos.clone();
        let mv = Move::castle(Square::new(0, 4), Square::new(0, 7));
        pos.make_move(mv);
        assert_eq!(pos.piece_at(Square::new(0, 6)), Some((Color::White, Piece::King)));
        assert_eq!(pos.piece_at(Square::new(0, 5)), Some((Color::White, Piece::Rook)));
        assert!(pos.piece_at(Square::new(0, 4)).is_none());
        assert!(pos.piece_at(Square::new(0, 7)).is_none());
        assert!(pos.castling_rights().is_empty());
        pos.unmake_move(mv);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_rook_capture_clears_right() {
        let mut pos = ortho("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let mv = Move::new(Square::new(0, 0), Square::new(7, 0)); // Ra1xa8
        pos.make_move(mv);
        // White loses the queenside right (rook left a1), Black loses the
        // queenside right (rook on a8 captured).
        assert!(!pos.castling_rights().has(Color::White, false));
        assert!(!pos.castling_rights().has(Color::Black, false));
        assert!(pos.castling_rights().has(Color::White, true));
        assert!(pos.castling_rights().has(Color::Black, true));
    }

    #[test]
    fn test_atomic_capture_explodes_neighbourhood() {
        let mut pos = atomic("4k3/8/8/2nq4/3Q4/8/8/4K3 w - - 0 1");
        let before = pos.clone();
        let mv = Move::new(Square::new(3, 3), Square::new(4, 3)); // Qd4xd5
        pos.make_move(mv);
        // Victim, capturer and the adjacent knight are all gone.
        assert!(pos.piece_at(Square::new(4, 3)).is_none());
        assert!(pos.piece_at(Square::new(3, 3)).is_none());
        assert!(pos.piece_at(Square::new(4, 2)).is_none());
        assert_eq!(pos.occupied().count_ones(), 2); // just the kings
        pos.unmake_move(mv);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_atomic_pawns_survive_blast() {
        let mut pos = atomic("4k3/8/3ppp2/3pqp2/3ppp2/3N4/8/4K3 w - - 0 1");
        let before = pos.clone();
        let mv = Move::new(Square::new(2, 3), Square::new(4, 4)); // Nd3xe5
        pos.make_move(mv);
        // The queen on e5 dies, the capturer dies, all eight pawns stay.
        assert_eq!(pos.pieces_by_type(Piece::Pawn).count_ones(), 8);
        assert_eq!(pos.pieces_by_type(Piece::Queen), 0);
        assert_eq!(pos.pieces_by_type(Piece::Knight), 0);
        pos.unmake_move(mv);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_atomic_quiet_move_is_orthodox() {
        let mut pos = atomic("4k3/8/8/8/8/8/4P3/4K3 w - - 4 10");
        let mv = Move::new(Square::new(1, 4), Square::new(2, 4)); // e2-e3
        pos.make_move(mv);
        assert_eq!(pos.piece_at(Square::new(2, 4)), Some((Color::White, Piece::Pawn)));
        assert_eq!(pos.fifty_move(), 0);
        let top = pos.undo_stack.last().unwrap();
        assert_eq!(top.exploded_by_color, [Bitboard::EMPTY; 2]);
        assert_eq!(top.exploded_by_type, [Bitboard::EMPTY; 6]);
    }

    #[test]
    fn test_atomic_blast_removes_castling_right() {
        let mut pos = atomic("4k3/8/8/8/8/8/6p1/4K2R b K - 0 1");
        let before = pos.clone();
        let mv = Move::new_promotion(Square::new(1, 6), Square::new(0, 7), Piece::Queen);
        pos.make_move(mv); // g2xh1=Q detonates on h1
        assert!(pos.castling_rights().is_empty());
        // The promoted piece never appears: the capturer is destroyed.
        assert_eq!(pos.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 2");
        pos.unmake_move(mv);
        assert_eq!(pos, before);
    }

    #[test]
    fn test_atomic_en_passant_blast() {
        let mut pos = atomic("4k3/8/8/8/2pP4/8/4N3/4K3 b - d3 0 2");
        let before = pos.clone();
        let mv = Move::en_passant(Square::new(3, 2), Square::new(2, 3)); // c4xd3 e.p.
        pos.make_move(mv);
        // Capturer, en-passant victim and the knight next to the blast die.
        assert_eq!(pos.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 3");
        pos.unmake_move(mv);
        assert_eq!(pos, before);
    }
}
