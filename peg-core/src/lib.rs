//! Triangular peg solitaire rules with a bit-based board representation.
//!
//! # Board Encoding (64-bit)
//!
//! ```text
//! Bit i: slot i holds a peg (1) or is empty (0)
//! Bits total_slots..63: always zero
//!
//! Slot indices (row-major, row r has r + 1 slots):
//!             0
//!           1   2
//!         3   4   5
//!       6   7   8   9
//!    10  11  12  13  14
//!
//! index(row, col) = row * (row + 1) / 2 + col
//! ```
//!
//! A board of `R` rows has `R * (R + 1) / 2` slots, so the 64-bit encoding
//! supports up to 10 rows (55 slots).
//!
//! # Jumps
//!
//! Each slot has up to six neighbours on three axes: parents (row above),
//! siblings (same row) and children (row below), each with a left and a
//! right side. A peg jumps over an occupied neighbour into the empty slot
//! that lies one further step along the same axis and side.
//!
//! # Solving
//!
//! The [`Solver`] is an explicit-stack depth-first search that can be
//! advanced in bounded slices from a host frame loop. See [`solver`].

pub mod board;
pub mod error;
pub mod history;
pub mod moves;
pub mod solver;
pub mod state;
pub mod topology;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use board::{Board, BoardConfig, GameStatus, Playback, Selection};
pub use error::PegError;
pub use history::{History, Replay, StateStack};
pub use moves::{find_moves, has_moves, Move, MoveList, MAX_MOVES};
pub use solver::{
    now_millis, Budget, Deadline, SearchStats, SolveStatus, Solver, StepBudget, TickResult,
    Unlimited,
};
pub use state::BoardState;
pub use topology::{Axis, Neighbors, Side, Topology, MAX_BITS};

/// Time budget handed to the solver on every host frame.
pub const SOLVE_TIME_PER_FRAME_MS: f64 = 17.0;
