//! Legal jump discovery.

use serde::{Deserialize, Serialize};

use crate::state::BoardState;
use crate::topology::{Axis, Side, Topology};

/// A jump: the peg at `src` jumps over `jump` and lands in `dest`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Move {
    pub src: usize,
    pub dest: usize,
    pub jump: usize,
}

impl Move {
    /// Recover the move that turns `before` into `after`, if exactly one
    /// legal jump does.
    pub fn between(topology: &Topology, before: BoardState, after: BoardState) -> Option<Move> {
        let removed = before.0 & !after.0;
        let added = after.0 & !before.0;
        if removed.count_ones() != 2 || added.count_ones() != 1 {
            return None;
        }

        let dest = added.trailing_zeros() as usize;
        BoardState(removed).pegs().find_map(|src| {
            let moves = find_moves(topology, before, src)?;
            let found = moves
                .iter()
                .find(|m| m.dest == dest && removed & (1u64 << m.jump) != 0);
            found
        })
    }
}

/// Most moves a single slot can have: two per axis.
pub const MAX_MOVES: usize = 6;

/// A fixed-size move list that avoids heap allocation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: u8,
}

impl MoveList {
    const BLANK: Move = Move { src: 0, dest: 0, jump: 0 };

    /// Create an empty move list.
    #[inline]
    pub const fn new() -> MoveList {
        MoveList {
            moves: [Self::BLANK; MAX_MOVES],
            len: 0,
        }
    }

    /// Add a move to the list.
    #[inline]
    pub fn push(&mut self, mov: Move) {
        debug_assert!((self.len as usize) < MAX_MOVES);
        self.moves[self.len as usize] = mov;
        self.len += 1;
    }

    /// Get the number of moves.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get a move by index.
    #[inline]
    pub fn get(&self, idx: usize) -> Option<Move> {
        self.as_slice().get(idx).copied()
    }

    /// View the moves as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len as usize]
    }

    /// Iterate over moves.
    pub fn iter(&self) -> impl Iterator<Item = Move> + '_ {
        self.as_slice().iter().copied()
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

/// The jump from `slot` along one axis and side, if legal on `state`.
#[inline]
fn jump_from(
    topology: &Topology,
    state: BoardState,
    slot: usize,
    axis: Axis,
    side: Side,
) -> Option<Move> {
    let near = topology.neighbor(slot, axis, side)?;
    if state.is_empty(near) {
        return None;
    }
    let far = topology.neighbor(near, axis, side)?;
    if state.is_occupied(far) {
        return None;
    }
    Some(Move {
        src: slot,
        dest: far,
        jump: near,
    })
}

/// Enumerate the jumps available to the peg in `slot`.
///
/// `slot` must hold a peg. Moves come out in axis order (parent, sibling,
/// child), left before right; the solver's traversal order depends on it.
/// Returns `None` rather than an empty list when there is nothing to do.
pub fn find_moves(topology: &Topology, state: BoardState, slot: usize) -> Option<MoveList> {
    debug_assert!(state.is_occupied(slot), "slot {slot} has no peg");

    let mut moves = MoveList::new();
    for axis in Axis::ALL {
        for side in Side::ALL {
            if let Some(mov) = jump_from(topology, state, slot, axis, side) {
                moves.push(mov);
            }
        }
    }

    if moves.is_empty() {
        None
    } else {
        Some(moves)
    }
}

/// Check whether the peg in `slot` has any jump, without building a list.
pub fn has_moves(topology: &Topology, state: BoardState, slot: usize) -> bool {
    Axis::ALL.iter().any(|&axis| {
        Side::ALL
            .iter()
            .any(|&side| jump_from(topology, state, slot, axis, side).is_some())
    })
}
