//! Peg occupancy packed into a single u64.

use crate::error::PegError;
use crate::moves::{has_moves, Move};
use crate::topology::{Axis, Side, Topology};

/// Compact board state - one bit per slot.
///
/// See crate documentation for the encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct BoardState(pub u64);

impl BoardState {
    /// Create a board with every slot empty.
    #[inline]
    pub const fn empty() -> BoardState {
        BoardState(0)
    }

    /// Create a board with every slot of `topology` filled except `hole`.
    pub fn full_except(topology: &Topology, hole: usize) -> BoardState {
        assert!(hole < topology.total_slots(), "slot {hole} out of range");
        BoardState(topology.full_mask() & !(1u64 << hole))
    }

    /// Get the raw encoding.
    #[inline]
    pub const fn serialize(self) -> u64 {
        self.0
    }

    /// Overwrite every slot from `bits`.
    #[inline]
    pub fn deserialize(&mut self, bits: u64) {
        self.0 = bits;
    }

    /// Check if `slot` has no peg.
    #[inline]
    pub const fn is_empty(self, slot: usize) -> bool {
        self.0 & (1u64 << slot) == 0
    }

    /// Check if `slot` holds a peg.
    #[inline]
    pub const fn is_occupied(self, slot: usize) -> bool {
        !self.is_empty(slot)
    }

    /// Put a peg in `slot`.
    #[inline]
    pub fn add_peg(&mut self, slot: usize) {
        self.0 |= 1u64 << slot;
    }

    /// Take the peg out of `slot`.
    #[inline]
    pub fn remove_peg(&mut self, slot: usize) {
        self.0 &= !(1u64 << slot);
    }

    /// Number of pegs on the board.
    #[inline]
    pub const fn peg_count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over occupied slots in ascending order.
    pub fn pegs(self) -> impl Iterator<Item = usize> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let slot = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(slot)
        })
    }

    /// A single remaining peg wins.
    #[inline]
    pub fn is_won(self) -> bool {
        debug_assert!(self.0 != 0, "board has no pegs");
        self.0.is_power_of_two()
    }

    /// No occupied slot has a legal jump.
    pub fn is_stuck(self, topology: &Topology) -> bool {
        self.pegs().all(|slot| !has_moves(topology, self, slot))
    }

    /// Apply `mov`, returning the resulting state.
    ///
    /// The move must still hold on this state: `src` and `jump` occupied,
    /// `dest` empty, and `jump` between them on one axis. `self` is never
    /// modified.
    pub fn apply(self, topology: &Topology, mov: Move) -> Result<BoardState, PegError> {
        let total = topology.total_slots();
        let in_range = mov.src < total && mov.jump < total && mov.dest < total;

        if !in_range
            || self.is_empty(mov.src)
            || self.is_empty(mov.jump)
            || self.is_occupied(mov.dest)
            || !Self::is_jump_line(topology, mov)
        {
            return Err(PegError::IllegalMove(mov));
        }

        Ok(self.apply_unchecked(mov))
    }

    /// Apply a move already known to be legal.
    #[inline]
    pub(crate) fn apply_unchecked(self, mov: Move) -> BoardState {
        let mut next = self;
        next.remove_peg(mov.src);
        next.remove_peg(mov.jump);
        next.add_peg(mov.dest);
        next
    }

    fn is_jump_line(topology: &Topology, mov: Move) -> bool {
        Axis::ALL.iter().any(|&axis| {
            Side::ALL.iter().any(|&side| {
                topology.neighbor(mov.src, axis, side) == Some(mov.jump)
                    && topology.neighbor(mov.jump, axis, side) == Some(mov.dest)
            })
        })
    }
}
