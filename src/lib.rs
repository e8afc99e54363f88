//! Move generation and position maintenance for orthodox and atomic chess.
//!
//! Provides the board-state core of a two-variant chess engine:
//! - Bitboard-based position representation with make/unmake and an undo stack
//! - Pseudo-legal move generation shared between variants
//! - Per-variant legality engines (orthodox, and atomic with its explosion
//!   rules decided from pre-move bitboards)
//! - Perft and perft-split drivers for correctness checking
//!
//! # Quick Start
//!
//! ```
//! use atomic_chess::board::{Arbiter, Variant};
//!
//! let arbiter = Arbiter::new(Variant::Ortho);
//! let mut pos = arbiter
//!     .position_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
//!     .unwrap();
//!
//! let moves = arbiter.generate_legal(&mut pos);
//! assert_eq!(moves.len(), 20);
//! assert_eq!(arbiter.perft(&mut pos, 2), 400);
//! ```
//!
//! # Atomic chess
//!
//! In the atomic variant every capture detonates the captured piece, the
//! capturing piece, and all non-pawn pieces on the eight squares around the
//! target. A side whose king is detonated loses immediately, and kings can
//! never capture.
//!
//! ```
//! use atomic_chess::board::{Arbiter, Variant};
//!
//! let arbiter = Arbiter::new(Variant::Atomic);
//! let mut pos = arbiter
//!     .position_from_fen("4k3/8/8/3q4/3Q4/8/8/4K3 w - - 0 1")
//!     .unwrap();
//!
//! // Qxd5 blows up both queens; both kings are outside the blast.
//! let mv = arbiter.parse_move(&mut pos, "d4d5").unwrap();
//! pos.make_move(mv);
//! assert_eq!(pos.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
//! ```
//!
//! # Features
//!
//! - `serde` - Enable serialization for `Piece`, `Color`, `Square`, `Move`,
//!   and `CastlingRights`
//! - `logging` - Enable optional debug logging via the `log` crate

// Enable pedantic lints with sensible domain-specific exceptions
#![warn(clippy::pedantic)]
// Bitboard hex literals are clearer without separators (bit patterns visible)
#![allow(clippy::unreadable_literal)]
// Index casts are ubiquitous and safe in chess (board indices, square indices)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
// Module-level documentation is sufficient for this codebase
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod board;
