//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `perft.rs` - Perft node counts for both variants
//! - `make_unmake.rs` - Make/unmake correctness against expected FENs
//! - `atomic.rs` - Atomic rule scenarios driven through the arbiter
//! - `proptest.rs` - Property-based tests (round trips, oracle equivalence)
