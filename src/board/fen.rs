//! FEN parsing and serialisation.

use std::str::FromStr;

use super::error::FenError;
use super::rules::Variant;
use super::types::{
    file_to_index, rank_to_index, Color, Piece, Square, CASTLE_COLORS, KING_FROM_SQUARES,
    NUM_CASTLES, ROOK_FROM_SQUARES,
};
use super::Position;

impl Position {
    /// Parse a position from FEN notation for the given variant.
    ///
    /// The six standard fields are accepted; the halfmove clock and fullmove
    /// counter may be omitted and default to 0 and 1. The undo stack of the
    /// returned position is empty.
    ///
    /// Castling rights that do not match the placement (no friendly king or
    /// rook on the original square) are dropped, and the en passant field
    /// must name a square consistent with a just-played double push.
    pub fn from_fen(fen: &str, variant: Variant) -> Result<Self, FenError> {
        let mut pos = Position::empty(variant);
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // Parse piece placement
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRankCount { ranks: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(run) = c.to_digit(10) {
                    file += run as usize;
                } else {
                    let color = if c.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file + 1,
                        });
                    }
                    pos.set_piece(Square::new(7 - rank_idx, file), color, piece);
                    file += 1;
                }
            }
        }

        // Parse side to move
        match parts[1] {
            "w" => pos.side_to_move = Color::White,
            "b" => pos.side_to_move = Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        }

        // Parse castling rights
        for c in parts[2].chars() {
            match c {
                'K' => pos.castling_rights.set(Color::White, true),
                'Q' => pos.castling_rights.set(Color::White, false),
                'k' => pos.castling_rights.set(Color::Black, true),
                'q' => pos.castling_rights.set(Color::Black, false),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        // A right is only meaningful while its king and rook still stand on
        // their original squares.
        for idx in 0..NUM_CASTLES {
            if pos.castling_rights.has_index(idx) {
                let color = CASTLE_COLORS[idx];
                let king_ok =
                    pos.piece_at(KING_FROM_SQUARES[idx]) == Some((color, Piece::King));
                let rook_ok =
                    pos.piece_at(ROOK_FROM_SQUARES[idx]) == Some((color, Piece::Rook));
                if !king_ok || !rook_ok {
                    pos.castling_rights.remove_index(idx);
                }
            }
        }

        // Parse en passant target
        pos.ep_square = if parts[3] == "-" {
            None
        } else {
            let chars: Vec<char> = parts[3].chars().collect();
            if chars.len() != 2
                || !('a'..='h').contains(&chars[0])
                || !('1'..='8').contains(&chars[1])
            {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            let sq = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
            // The target sits behind a pawn that just moved two squares.
            let expected_rank = match pos.side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if sq.rank() != expected_rank {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            let pawn_sq = match pos.side_to_move {
                Color::White => sq.south(),
                Color::Black => sq.north(),
            };
            if pos.piece_at(pawn_sq) != Some((pos.side_to_move.opponent(), Piece::Pawn)) {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
            Some(sq)
        };

        // Parse halfmove clock and fullmove counter (both optional)
        if parts.len() >= 5 {
            pos.fifty_move = parts[4].parse().unwrap_or(0);
        }
        let fullmove: u32 = if parts.len() >= 6 {
            parts[5].parse().unwrap_or(1).max(1)
        } else {
            1
        };
        pos.halfmove_num = 2 * (fullmove - 1) + u32::from(pos.side_to_move == Color::Black);

        Ok(pos)
    }

    /// Serialise the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::new();
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                if let Some((color, piece)) = self.piece_at(Square::new(rank, file)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = if self.side_to_move == Color::White {
            "w"
        } else {
            "b"
        };
        let mut castling = String::new();
        for (idx, c) in ['K', 'Q', 'k', 'q'].into_iter().enumerate() {
            if self.castling_rights.has_index(idx) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self
            .ep_square
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            castling,
            ep,
            self.fifty_move,
            self.fullmove_num()
        )
    }
}

impl FromStr for Position {
    type Err = FenError;

    /// Parse a FEN string as an orthodox-chess position.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s, Variant::Ortho)
    }
}
