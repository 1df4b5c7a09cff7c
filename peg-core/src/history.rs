//! Stacks of serialized board states: undo, redo and replay.

use std::collections::VecDeque;

/// LIFO stack of serialized states.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateStack {
    states: Vec<u64>,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, state: u64) {
        self.states.push(state);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<u64> {
        self.states.pop()
    }

    /// Top of the stack.
    #[inline]
    pub fn peek(&self) -> Option<u64> {
        self.states.last().copied()
    }

    /// Oldest entry.
    #[inline]
    pub fn peek_bottom(&self) -> Option<u64> {
        self.states.first().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Entries from bottom to top.
    pub fn as_slice(&self) -> &[u64] {
        &self.states
    }
}

impl From<Vec<u64>> for StateStack {
    fn from(states: Vec<u64>) -> Self {
        Self { states }
    }
}

/// Undo and redo stacks for the live board.
#[derive(Clone, Debug, Default)]
pub struct History {
    undo: StateStack,
    redo: StateStack,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state before a new move. Any redo branch is discarded.
    pub fn record(&mut self, before: u64) {
        self.undo.push(before);
        self.redo.clear();
    }

    /// Step back from `current`. Returns the state to restore, or `None` if
    /// there is nothing to undo.
    pub fn undo(&mut self, current: u64) -> Option<u64> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    /// Step forward from `current`. Returns the state to restore, or `None`
    /// if there is nothing to redo.
    pub fn redo(&mut self, current: u64) -> Option<u64> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

/// A recorded sequence played back one state at a time, front first.
#[derive(Clone, Debug, Default)]
pub struct Replay {
    states: VecDeque<u64>,
}

impl Replay {
    /// Start a replay of `states` (first element is the current position).
    pub fn new(states: &[u64]) -> Self {
        Self {
            states: states.iter().copied().collect(),
        }
    }

    /// The state currently shown.
    pub fn current(&self) -> Option<u64> {
        self.states.front().copied()
    }

    /// Advance to the next state. Returns it, or `None` once the last
    /// recorded state is showing.
    pub fn step(&mut self) -> Option<u64> {
        if self.states.len() < 2 {
            return None;
        }
        self.states.pop_front();
        self.current()
    }

    /// States left to step through after the current one.
    pub fn remaining(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    /// States from the current one to the end.
    pub fn states(&self) -> Vec<u64> {
        self.states.iter().copied().collect()
    }

    pub fn is_active(&self) -> bool {
        !self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_order() {
        let mut stack = StateStack::new();
        assert_eq!(stack.peek(), None);
        stack.push(1);
        stack.push(2);
        stack.push(3);
        assert_eq!(stack.peek(), Some(3));
        assert_eq!(stack.peek_bottom(), Some(1));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.len(), 2);
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::new();
        history.record(10);
        // Live board is now 20.
        assert_eq!(history.undo(20), Some(10));
        assert_eq!(history.redo(10), Some(20));
        assert_eq!(history.redo(20), None);
        assert_eq!(history.undo(20), Some(10));
        assert_eq!(history.undo(10), None);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new();
        history.record(10);
        history.undo(20);
        assert!(history.can_redo());
        history.record(10);
        assert!(!history.can_redo());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_replay_steps_to_end() {
        let mut replay = Replay::new(&[7, 6, 4]);
        assert_eq!(replay.current(), Some(7));
        assert_eq!(replay.remaining(), 2);
        assert_eq!(replay.step(), Some(6));
        assert_eq!(replay.step(), Some(4));
        assert_eq!(replay.remaining(), 0);
        assert_eq!(replay.step(), None);
        assert_eq!(replay.current(), Some(4));
    }
}
