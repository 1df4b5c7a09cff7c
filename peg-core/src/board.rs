//! The playable board: live state, history, solver and playback.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PegError;
use crate::history::{History, Replay};
use crate::moves::{find_moves, Move, MoveList};
use crate::solver::{Budget, Deadline, SearchStats, SolveStatus, Solver, TickResult};
use crate::state::BoardState;
use crate::topology::Topology;

/// Board size and starting hole.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    /// Row of the slot left empty by `reset`
    pub empty_row: usize,
    /// Column of the slot left empty by `reset`
    pub empty_col: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 5,
            empty_row: 0,
            empty_col: 0,
        }
    }
}

/// Where the game stands for the player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    Won,
    /// Pegs remain but none can jump.
    Lost,
}

/// Result of stepping through a recorded solution.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Playback {
    /// Nothing is being played back.
    Idle,
    /// Advanced one move; `remaining` moves are left.
    Step { remaining: usize },
    /// Advanced onto the final, won position.
    Solved,
}

/// Result of the player selecting a slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Selection {
    /// Nothing happened.
    Ignored,
    /// A jump was made.
    Moved { mov: Move, won: bool },
    /// The peg has several jumps; select one of the destinations next.
    Choosing(MoveList),
    /// Another peg was picked while choosing; the pending jump was dropped.
    Aborted,
}

/// A triangular board with its undo history and solver.
#[derive(Clone, Debug)]
pub struct Board {
    topology: Topology,
    state: BoardState,
    hole: usize,
    history: History,
    solver: Solver,
    /// Winning line from the current state, once the solver found one
    solution: Option<Vec<u64>>,
    replay: Replay,
    /// Peg awaiting a destination and its jumps
    selected: Option<(usize, MoveList)>,
    /// Host timestamp passed to the latest tick
    last_tick_millis: Option<f64>,
}

impl Board {
    /// Create a board of `rows` rows with the top slot empty.
    pub fn new(rows: usize) -> Result<Board, PegError> {
        Self::with_config(BoardConfig {
            rows,
            ..BoardConfig::default()
        })
    }

    /// Create a board from `config`.
    pub fn with_config(config: BoardConfig) -> Result<Board, PegError> {
        let topology = Topology::build(config.rows)?;
        let hole = topology.slot_at(config.empty_row, config.empty_col)?;

        let mut board = Board {
            topology,
            state: BoardState::empty(),
            hole,
            history: History::new(),
            solver: Solver::new(),
            solution: None,
            replay: Replay::default(),
            selected: None,
            last_tick_millis: None,
        };
        board.reset();
        Ok(board)
    }

    /// Fill every slot but the starting hole and forget all history.
    ///
    /// A one-slot board keeps its only peg.
    pub fn reset(&mut self) {
        self.abandon_search();
        self.history.clear();
        self.clear_solution();
        self.selected = None;

        self.state = if self.topology.total_slots() == 1 {
            BoardState(self.topology.full_mask())
        } else {
            BoardState::full_except(&self.topology, self.hole)
        };
        log::debug!("board reset to {:#x}", self.state.serialize());
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn rows(&self) -> usize {
        self.topology.rows()
    }

    fn check_slot(&self, slot: usize) {
        assert!(
            slot < self.topology.total_slots(),
            "slot {slot} out of range for {} slots",
            self.topology.total_slots()
        );
    }

    // ========== Pegs & Moves ==========

    /// Put a peg in `slot`. Panics if `slot` is off the board.
    pub fn add_peg(&mut self, slot: usize) {
        self.check_slot(slot);
        self.edit(|state| state.add_peg(slot));
    }

    /// Take the peg out of `slot`. Panics if `slot` is off the board.
    pub fn remove_peg(&mut self, slot: usize) {
        self.check_slot(slot);
        self.edit(|state| state.remove_peg(slot));
    }

    fn edit(&mut self, f: impl FnOnce(&mut BoardState)) {
        self.abandon_search();
        self.clear_solution();
        self.selected = None;
        f(&mut self.state);
    }

    /// Jumps available from `slot`, or `None` if it is empty or stuck.
    pub fn find_moves(&self, slot: usize) -> Option<MoveList> {
        self.check_slot(slot);
        if self.state.is_empty(slot) {
            return None;
        }
        find_moves(&self.topology, self.state, slot)
    }

    /// Play `mov` on the live board. Returns whether the game is now won.
    ///
    /// The previous state goes on the undo stack and the redo stack is
    /// cleared. A stale move is rejected without touching the board.
    pub fn apply_move(&mut self, mov: Move) -> Result<bool, PegError> {
        let next = self.state.apply(&self.topology, mov)?;

        self.abandon_search();
        self.clear_solution();
        self.selected = None;
        self.history.record(self.state.serialize());
        self.state = next;

        Ok(self.state.is_won())
    }

    /// React to the player selecting `slot`.
    ///
    /// Selecting a peg with one jump makes it at once. A peg with several
    /// jumps waits for one of its destinations to be selected.
    pub fn select(&mut self, slot: usize) -> Result<Selection, PegError> {
        self.check_slot(slot);

        if let Some((src, moves)) = self.selected {
            if let Some(mov) = moves.iter().find(|m| m.dest == slot) {
                let won = self.apply_move(mov)?;
                return Ok(Selection::Moved { mov, won });
            }
            if slot != src && self.state.is_occupied(slot) {
                self.selected = None;
                return Ok(Selection::Aborted);
            }
            return Ok(Selection::Ignored);
        }

        let Some(moves) = self.find_moves(slot) else {
            return Ok(Selection::Ignored);
        };

        if let (1, Some(mov)) = (moves.len(), moves.get(0)) {
            let won = self.apply_move(mov)?;
            return Ok(Selection::Moved { mov, won });
        }

        self.selected = Some((slot, moves));
        Ok(Selection::Choosing(moves))
    }

    /// Peg currently waiting for a destination.
    pub fn selected(&self) -> Option<usize> {
        self.selected.map(|(slot, _)| slot)
    }

    // ========== Serialization ==========

    pub fn serialize(&self) -> u64 {
        self.state.serialize()
    }

    /// Replace the live board with `mask`.
    ///
    /// The mask must have at least one peg and no bits beyond the board.
    pub fn deserialize(&mut self, mask: u64) -> Result<(), PegError> {
        if mask == 0 || mask & !self.topology.full_mask() != 0 {
            return Err(PegError::InvalidMask { mask });
        }
        self.edit(|state| state.deserialize(mask));
        Ok(())
    }

    // ========== Status ==========

    /// An edited board may have no pegs at all, which is not a win.
    pub fn is_won(&self) -> bool {
        self.state.peg_count() > 0 && self.state.is_won()
    }

    /// Whether `slot` has no peg. Panics if `slot` is off the board.
    pub fn is_empty(&self, slot: usize) -> bool {
        self.check_slot(slot);
        self.state.is_empty(slot)
    }

    pub fn is_stuck(&self) -> bool {
        self.state.is_stuck(&self.topology)
    }

    pub fn status(&self) -> GameStatus {
        if self.is_won() {
            GameStatus::Won
        } else if self.is_stuck() {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        }
    }

    // ========== Undo & Redo ==========

    /// Step back one move. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.state.serialize()) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    /// Step forward one undone move. Returns false when there is nothing to
    /// redo.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.state.serialize()) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn restore(&mut self, bits: u64) {
        self.abandon_search();
        self.clear_solution();
        self.selected = None;
        self.state = BoardState(bits);
    }

    // ========== Solving ==========

    /// Start searching for a solution from the current board.
    ///
    /// Drive the search with [`tick`](Self::tick). Rejected while a search
    /// is already running.
    pub fn solve(&mut self) -> Result<(), PegError> {
        if self.solver.is_searching() {
            return Err(PegError::SearchInProgress);
        }
        self.clear_solution();
        self.solver.start(self.state)
    }

    /// Advance the search for at most `budget_millis`.
    ///
    /// `frame_millis` is the host's frame timestamp in whatever time base the
    /// host uses (a frame counter, `performance.now()`, `Date.now()`). It is
    /// only recorded, see [`last_tick_millis`](Self::last_tick_millis). The
    /// budget runs on [`now_millis`](crate::now_millis) from the moment this
    /// call starts.
    pub fn tick(&mut self, frame_millis: f64, budget_millis: f64) -> TickResult {
        self.last_tick_millis = Some(frame_millis);
        self.tick_with(&mut Deadline::from_now(budget_millis))
    }

    /// Advance the search until `budget` runs out.
    ///
    /// Once a solution is published the result carries it as it stands,
    /// starting at the live board.
    pub fn tick_with<B: Budget + ?Sized>(&mut self, budget: &mut B) -> TickResult {
        let result = self.solver.tick(&self.topology, budget);
        if result.found && self.solution.is_none() {
            self.solution = result.sequence.clone();
        }

        match &self.solution {
            Some(solution) if result.done => TickResult {
                done: true,
                found: true,
                sequence: Some(solution.clone()),
            },
            _ => result,
        }
    }

    /// Host timestamp passed to the latest [`tick`](Self::tick).
    pub fn last_tick_millis(&self) -> Option<f64> {
        self.last_tick_millis
    }

    /// Abandon the running search, if any.
    pub fn cancel_solve(&mut self) {
        self.abandon_search();
    }

    pub fn is_solving(&self) -> bool {
        self.solver.is_searching()
    }

    pub fn solve_status(&self) -> SolveStatus {
        self.solver.status()
    }

    pub fn search_stats(&self) -> &SearchStats {
        self.solver.stats()
    }

    /// A solution to the current board is known.
    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }

    /// Winning line from the current board: first entry is the current
    /// state, last is the won state.
    pub fn best_solution(&self) -> Option<&[u64]> {
        self.solution.as_deref()
    }

    fn abandon_search(&mut self) {
        self.solver.cancel();
    }

    fn clear_solution(&mut self) {
        self.solution = None;
        self.replay.clear();
    }

    // ========== Playback ==========

    /// Show the first position of the known solution. Returns false if no
    /// solution is known.
    pub fn start_best_playback(&mut self) -> bool {
        let Some(solution) = self.solution.as_deref() else {
            return false;
        };
        self.replay = Replay::new(solution);
        if let Some(first) = self.replay.current() {
            self.state = BoardState(first);
        }
        true
    }

    /// Advance the playback one move. Each step can be undone.
    pub fn step_best_playback(&mut self) -> Playback {
        let before = self.state.serialize();
        let Some(next) = self.replay.step() else {
            return Playback::Idle;
        };

        // The published line now tracks the live board, not the search start.
        self.solver.cancel();
        self.history.record(before);
        self.state = BoardState(next);
        let remaining = self.replay.remaining();
        self.solution = Some(self.replay.states());

        if remaining == 0 {
            Playback::Solved
        } else {
            Playback::Step { remaining }
        }
    }

    /// Play the next move of the known solution. Returns the move, or
    /// `None` if no solution is known or the board is already won.
    pub fn hint(&mut self) -> Option<Move> {
        let before = self.state;
        if self.replay.current() != Some(before.serialize()) && !self.start_best_playback() {
            return None;
        }

        match self.step_best_playback() {
            Playback::Idle => None,
            Playback::Step { .. } | Playback::Solved => {
                Move::between(&self.topology, before, self.state)
            }
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.topology.rows();
        for row in 0..rows {
            write!(f, "{:width$}", "", width = rows - row - 1)?;
            for col in 0..=row {
                if col > 0 {
                    f.write_str(" ")?;
                }
                let slot = row * (row + 1) / 2 + col;
                f.write_str(if self.state.is_occupied(slot) { "o" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{StepBudget, Unlimited};

    fn board() -> Board {
        Board::new(5).unwrap()
    }

    #[test]
    fn test_new_board() {
        let board = board();
        assert_eq!(board.serialize(), 32766);
        assert_eq!(board.status(), GameStatus::Playing);
        assert!(!board.has_solution());
    }

    #[test]
    fn test_config_hole() {
        let board = Board::with_config(BoardConfig {
            rows: 4,
            empty_row: 2,
            empty_col: 1,
        })
        .unwrap();
        assert!(board.state().is_empty(4));
        assert_eq!(board.status(), GameStatus::Lost);

        let bad = Board::with_config(BoardConfig {
            rows: 4,
            empty_row: 1,
            empty_col: 2,
        });
        assert_eq!(bad.err(), Some(PegError::InvalidSlot { row: 1, col: 2 }));
        assert_eq!(Board::new(0).err(), Some(PegError::InvalidSize { rows: 0 }));
    }

    #[test]
    fn test_single_slot_board_is_won() {
        let board = Board::new(1).unwrap();
        assert_eq!(board.serialize(), 1);
        assert_eq!(board.status(), GameStatus::Won);
    }

    #[test]
    fn test_apply_move_and_undo_redo() {
        let mut board = board();
        let s0 = board.serialize();
        let won = board.apply_move(Move { src: 3, dest: 0, jump: 1 }).unwrap();
        assert!(!won);
        let s1 = board.serialize();

        assert!(board.undo());
        assert_eq!(board.serialize(), s0);
        assert!(board.redo());
        assert_eq!(board.serialize(), s1);
        assert!(!board.redo());

        assert!(board.undo());
        board.apply_move(Move { src: 5, dest: 0, jump: 2 }).unwrap();
        assert!(!board.history().can_redo());
    }

    #[test]
    fn test_undo_on_fresh_board() {
        let mut board = board();
        assert!(!board.undo());
        assert!(!board.redo());
        assert_eq!(board.serialize(), 32766);
    }

    #[test]
    fn test_illegal_move_leaves_board() {
        let mut board = board();
        let mov = Move { src: 12, dest: 3, jump: 7 };
        assert_eq!(board.apply_move(mov), Err(PegError::IllegalMove(mov)));
        assert_eq!(board.serialize(), 32766);
        assert!(!board.history().can_undo());
    }

    #[test]
    fn test_deserialize_checks_mask() {
        let mut board = board();
        assert_eq!(board.deserialize(0), Err(PegError::InvalidMask { mask: 0 }));
        assert_eq!(
            board.deserialize(1 << 15),
            Err(PegError::InvalidMask { mask: 1 << 15 })
        );
        board.deserialize(0b101).unwrap();
        assert_eq!(board.serialize(), 0b101);
    }

    #[test]
    fn test_select_single_move() {
        let mut board = board();
        let result = board.select(3).unwrap();
        assert_eq!(
            result,
            Selection::Moved {
                mov: Move { src: 3, dest: 0, jump: 1 },
                won: false
            }
        );
        assert_eq!(board.select(0).unwrap(), Selection::Ignored);
    }

    #[test]
    fn test_select_choose_and_abort() {
        let mut board = board();
        // Slot 5 can jump up over 2 into 0 or left over 4 into 3.
        board
            .deserialize((1 << 2) | (1 << 4) | (1 << 5) | (1 << 14))
            .unwrap();

        let moves = board.find_moves(5).unwrap();
        assert_eq!(
            moves.as_slice(),
            &[Move { src: 5, dest: 0, jump: 2 }, Move { src: 5, dest: 3, jump: 4 }]
        );

        assert_eq!(board.select(5).unwrap(), Selection::Choosing(moves));
        assert_eq!(board.selected(), Some(5));
        assert_eq!(board.select(5).unwrap(), Selection::Ignored);
        assert_eq!(board.select(14).unwrap(), Selection::Aborted);
        assert_eq!(board.selected(), None);

        board.select(5).unwrap();
        let result = board.select(3).unwrap();
        assert_eq!(
            result,
            Selection::Moved {
                mov: Move { src: 5, dest: 3, jump: 4 },
                won: false
            }
        );
        assert_eq!(board.serialize(), (1 << 2) | (1 << 3) | (1 << 14));
    }

    #[test]
    fn test_solve_publishes_solution() {
        let mut board = Board::with_config(BoardConfig {
            rows: 4,
            empty_row: 1,
            empty_col: 0,
        })
        .unwrap();
        let before = board.serialize();

        board.solve().unwrap();
        assert_eq!(board.solve(), Err(PegError::SearchInProgress));
        let result = board.tick_with(&mut Unlimited);
        assert!(result.done && result.found);
        assert_eq!(board.serialize(), before);

        let solution = board.best_solution().unwrap().to_vec();
        assert_eq!(solution.first(), Some(&before));
        assert_eq!(solution.len(), 9);
    }

    #[test]
    fn test_move_abandons_search() {
        let mut board = board();
        board.solve().unwrap();
        board.tick_with(&mut StepBudget::new(50));
        assert!(board.is_solving());

        board.apply_move(Move { src: 3, dest: 0, jump: 1 }).unwrap();
        assert!(!board.is_solving());
        assert_eq!(board.solve_status(), SolveStatus::Idle);
        assert!(board.solve().is_ok());
    }

    #[test]
    fn test_hint_and_playback() {
        let mut board = Board::with_config(BoardConfig {
            rows: 4,
            empty_row: 1,
            empty_col: 0,
        })
        .unwrap();
        assert_eq!(board.hint(), None);

        board.solve().unwrap();
        board.tick_with(&mut Unlimited);
        let solution = board.best_solution().unwrap().to_vec();

        let mov = board.hint().unwrap();
        assert_eq!(mov, Move { src: 6, dest: 1, jump: 3 });
        assert_eq!(board.serialize(), solution[1]);
        assert!(board.has_solution());

        let mut steps = 1;
        loop {
            match board.step_best_playback() {
                Playback::Step { remaining } => assert_eq!(remaining, solution.len() - 2 - steps),
                Playback::Solved => break,
                Playback::Idle => panic!("playback stopped early"),
            }
            steps += 1;
        }
        assert_eq!(board.status(), GameStatus::Won);
        assert_eq!(board.step_best_playback(), Playback::Idle);

        // Every playback step can be undone back to the start.
        while board.undo() {}
        assert_eq!(board.serialize(), solution[0]);
    }

    #[test]
    fn test_display() {
        let board = Board::new(3).unwrap();
        assert_eq!(board.to_string(), "  .\n o o\no o o\n");
    }

    #[test]
    fn test_tick_with_frame_clock_from_zero() {
        // Stuck start: finishes on the very first frame.
        let mut board = Board::with_config(BoardConfig {
            rows: 4,
            empty_row: 2,
            empty_col: 1,
        })
        .unwrap();
        board.solve().unwrap();
        let result = board.tick(0.0, 17.0);
        assert!(result.done);
        assert!(!result.found);
        assert_eq!(board.last_tick_millis(), Some(0.0));

        // Frame counters and far-future stamps both get a real slice.
        for frame_millis in [0.0, 16.0, 1.0e15] {
            let mut board = self::board();
            board.solve().unwrap();
            let result = board.tick(frame_millis, 1.0);
            assert!(!result.done);
            assert!(board.search_stats().attempts > 0);
        }
    }

    #[test]
    fn test_tick_after_playback_follows_live_board() {
        let mut board = Board::with_config(BoardConfig {
            rows: 4,
            empty_row: 1,
            empty_col: 0,
        })
        .unwrap();
        board.solve().unwrap();
        board.tick_with(&mut Unlimited);

        assert!(board.start_best_playback());
        assert!(matches!(board.step_best_playback(), Playback::Step { .. }));
        assert_eq!(board.solve_status(), SolveStatus::Idle);

        let result = board.tick_with(&mut Unlimited);
        assert!(result.done && result.found);
        let sequence = result.sequence.unwrap();
        assert_eq!(sequence.first(), Some(&board.serialize()));
        assert_eq!(sequence.len(), 8);
    }

    #[test]
    fn test_is_empty() {
        let board = board();
        assert!(board.is_empty(0));
        assert!(!board.is_empty(14));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_is_empty_off_board() {
        board().is_empty(15);
    }

    #[test]
    fn test_cleared_board_is_lost() {
        let mut board = Board::new(3).unwrap();
        for slot in 0..6 {
            board.remove_peg(slot);
        }
        assert!(!board.is_won());
        assert_eq!(board.status(), GameStatus::Lost);
    }
}
