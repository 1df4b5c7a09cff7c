//! Fixed adjacency graph of a triangular board.

use crate::error::PegError;

/// Width of the board encoding in bits.
pub const MAX_BITS: usize = 64;

/// One of the three jump axes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Axis {
    /// Towards the row above.
    Parent,
    /// Along the same row.
    Sibling,
    /// Towards the row below.
    Child,
}

impl Axis {
    /// Axes in move-generation order.
    pub const ALL: [Axis; 3] = [Axis::Parent, Axis::Sibling, Axis::Child];
}

/// Direction along an axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Sides in move-generation order.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];
}

/// Neighbour links of a single slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Neighbors {
    pub parent_left: Option<usize>,
    pub parent_right: Option<usize>,
    pub sibling_left: Option<usize>,
    pub sibling_right: Option<usize>,
    pub child_left: Option<usize>,
    pub child_right: Option<usize>,
}

impl Neighbors {
    /// Get the neighbour on the given axis and side.
    #[inline]
    pub fn get(&self, axis: Axis, side: Side) -> Option<usize> {
        match (axis, side) {
            (Axis::Parent, Side::Left) => self.parent_left,
            (Axis::Parent, Side::Right) => self.parent_right,
            (Axis::Sibling, Side::Left) => self.sibling_left,
            (Axis::Sibling, Side::Right) => self.sibling_right,
            (Axis::Child, Side::Left) => self.child_left,
            (Axis::Child, Side::Right) => self.child_right,
        }
    }
}

/// Immutable slot graph for a board of `rows` rows.
///
/// Slots are stored in an arena indexed by slot number; links are indices,
/// never references, so the graph is freely shareable by `&Topology`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Topology {
    rows: usize,
    slots: Vec<Neighbors>,
}

impl Topology {
    /// Build the graph for a board with `rows` rows.
    ///
    /// Fails if `rows` is zero or the board needs more than [`MAX_BITS`]
    /// slots.
    pub fn build(rows: usize) -> Result<Topology, PegError> {
        if rows == 0 || Self::slots_for(rows) > MAX_BITS {
            return Err(PegError::InvalidSize { rows });
        }

        let mut slots = vec![Neighbors::default(); Self::slots_for(rows)];

        // Row 0 is the lone root: no parents, no siblings.
        for row in 1..rows {
            let prev = Self::row_start(row - 1);
            let start = Self::row_start(row);
            let last = row;

            for col in 0..=row {
                let slot = start + col;
                let links = &mut slots[slot];

                links.parent_left = if col == 0 { None } else { Some(prev + col - 1) };
                links.parent_right = if col == last { None } else { Some(prev + col) };
                links.sibling_left = if col == 0 { None } else { Some(slot - 1) };
                links.sibling_right = if col == last { None } else { Some(slot + 1) };
            }

            for col in 0..row {
                let parent = &mut slots[prev + col];
                parent.child_left = Some(start + col);
                parent.child_right = Some(start + col + 1);
            }
        }

        Ok(Topology { rows, slots })
    }

    /// Number of slots on a board with `rows` rows.
    #[inline]
    pub const fn slots_for(rows: usize) -> usize {
        rows * (rows + 1) / 2
    }

    /// Index of the first slot of `row`.
    #[inline]
    const fn row_start(row: usize) -> usize {
        row * (row + 1) / 2
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of slots.
    #[inline]
    pub fn total_slots(&self) -> usize {
        self.slots.len()
    }

    /// Mask with every slot of this board set.
    #[inline]
    pub fn full_mask(&self) -> u64 {
        if self.slots.len() == MAX_BITS {
            u64::MAX
        } else {
            (1u64 << self.slots.len()) - 1
        }
    }

    /// Iterate over all slot indices.
    pub fn slots(&self) -> impl Iterator<Item = usize> {
        0..self.slots.len()
    }

    /// Neighbour links of `slot`.
    ///
    /// Panics if `slot` is out of range.
    #[inline]
    pub fn neighbors(&self, slot: usize) -> &Neighbors {
        &self.slots[slot]
    }

    /// Neighbour of `slot` on the given axis and side, if any.
    #[inline]
    pub fn neighbor(&self, slot: usize, axis: Axis, side: Side) -> Option<usize> {
        self.slots[slot].get(axis, side)
    }

    /// Convert boundary coordinates to a slot index.
    pub fn slot_at(&self, row: usize, col: usize) -> Result<usize, PegError> {
        if row >= self.rows || col > row {
            return Err(PegError::InvalidSlot { row, col });
        }
        Ok(Self::row_start(row) + col)
    }

    /// Convert a slot index back to `(row, col)`.
    pub fn row_col(&self, slot: usize) -> (usize, usize) {
        assert!(slot < self.slots.len(), "slot {slot} out of range");
        let mut row = 0;
        while Self::row_start(row + 1) <= slot {
            row += 1;
        }
        (row, slot - Self::row_start(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_bad_sizes() {
        assert_eq!(Topology::build(0), Err(PegError::InvalidSize { rows: 0 }));
        assert_eq!(Topology::build(11), Err(PegError::InvalidSize { rows: 11 }));
        assert!(Topology::build(1).is_ok());
        assert!(Topology::build(10).is_ok());
    }

    #[test]
    fn test_slot_counts() {
        for rows in 1..=10 {
            let topo = Topology::build(rows).unwrap();
            assert_eq!(topo.total_slots(), rows * (rows + 1) / 2);
            assert_eq!(topo.full_mask().count_ones() as usize, topo.total_slots());
        }
    }

    #[test]
    fn test_root_has_only_children() {
        let topo = Topology::build(3).unwrap();
        let root = topo.neighbors(0);
        assert_eq!(root.parent_left, None);
        assert_eq!(root.parent_right, None);
        assert_eq!(root.sibling_left, None);
        assert_eq!(root.sibling_right, None);
        assert_eq!(root.child_left, Some(1));
        assert_eq!(root.child_right, Some(2));
    }

    #[test]
    fn test_interior_slot_links() {
        // Slot 4 is (2, 1) on a 4-row board.
        let topo = Topology::build(4).unwrap();
        let n = topo.neighbors(4);
        assert_eq!(n.parent_left, Some(1));
        assert_eq!(n.parent_right, Some(2));
        assert_eq!(n.sibling_left, Some(3));
        assert_eq!(n.sibling_right, Some(5));
        assert_eq!(n.child_left, Some(7));
        assert_eq!(n.child_right, Some(8));
    }

    #[test]
    fn test_row_edges_lack_outer_links() {
        let topo = Topology::build(4).unwrap();

        let left = topo.neighbors(3);
        assert_eq!(left.parent_left, None);
        assert_eq!(left.parent_right, Some(1));
        assert_eq!(left.sibling_left, None);

        let right = topo.neighbors(5);
        assert_eq!(right.parent_left, Some(2));
        assert_eq!(right.parent_right, None);
        assert_eq!(right.sibling_right, None);

        // Bottom row has no children.
        for slot in 6..10 {
            assert_eq!(topo.neighbors(slot).child_left, None);
            assert_eq!(topo.neighbors(slot).child_right, None);
        }
    }

    #[test]
    fn test_links_are_symmetric() {
        let topo = Topology::build(6).unwrap();
        for slot in topo.slots() {
            let n = topo.neighbors(slot);
            if let Some(c) = n.child_left {
                assert_eq!(topo.neighbors(c).parent_right, Some(slot));
            }
            if let Some(c) = n.child_right {
                assert_eq!(topo.neighbors(c).parent_left, Some(slot));
            }
            if let Some(s) = n.sibling_right {
                assert_eq!(topo.neighbors(s).sibling_left, Some(slot));
            }
        }
    }

    #[test]
    fn test_slot_at_and_row_col() {
        let topo = Topology::build(5).unwrap();
        assert_eq!(topo.slot_at(0, 0), Ok(0));
        assert_eq!(topo.slot_at(2, 1), Ok(4));
        assert_eq!(topo.slot_at(4, 4), Ok(14));
        assert_eq!(topo.slot_at(2, 3), Err(PegError::InvalidSlot { row: 2, col: 3 }));
        assert_eq!(topo.slot_at(5, 0), Err(PegError::InvalidSlot { row: 5, col: 0 }));

        for slot in topo.slots() {
            let (row, col) = topo.row_col(slot);
            assert_eq!(topo.slot_at(row, col), Ok(slot));
        }
    }
}
