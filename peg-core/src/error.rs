//! Error types for board construction and play.

use thiserror::Error;

use crate::moves::Move;

/// Precondition violations reported by the core.
///
/// None of these are retried. Soft outcomes such as "nothing to undo" or
/// "no solution from here" are plain return values, not errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PegError {
    #[error("invalid board size: {rows} rows does not fit in a 64-bit board")]
    InvalidSize { rows: usize },
    #[error("no slot at row {row}, column {col}")]
    InvalidSlot { row: usize, col: usize },
    #[error("mask {mask:#x} has pegs outside the board")]
    InvalidMask { mask: u64 },
    #[error("illegal move {0:?}")]
    IllegalMove(Move),
    #[error("a search is already in progress")]
    SearchInProgress,
}
