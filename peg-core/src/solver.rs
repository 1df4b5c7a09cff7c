//! Time-sliced exhaustive backtracking solver.
//!
//! The search is a depth-first walk over every move sequence reachable from
//! the start position, driven by an explicit stack of search frames so it
//! can stop at any move attempt and resume on the next call to
//! [`Solver::tick`]. The shortest winning sequence seen is kept; ties go to
//! the first one found, which the fixed move order of
//! [`find_moves`](crate::moves::find_moves) makes reproducible.
//!
//! The solver works on its own copy of the board. The live board a player
//! sees is never touched mid-search.

use serde::{Deserialize, Serialize};

use crate::error::PegError;
use crate::history::StateStack;
use crate::moves::find_moves;
use crate::state::BoardState;
use crate::topology::Topology;

/// Decides when a tick must hand control back to the caller.
///
/// Consulted once before every move attempt or backtrack step.
pub trait Budget {
    fn exhausted(&mut self) -> bool;
}

/// Wall-clock budget: stop once [`now_millis`] reaches the deadline.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    until: f64,
}

impl Deadline {
    /// Budget of `budget_millis` starting at `now_millis`, which must be a
    /// reading of [`now_millis`] (epoch milliseconds).
    pub fn new(now_millis: f64, budget_millis: f64) -> Self {
        Self {
            until: now_millis + budget_millis,
        }
    }

    /// Budget of `budget_millis` starting now.
    pub fn from_now(budget_millis: f64) -> Self {
        Self::new(now_millis(), budget_millis)
    }
}

impl Budget for Deadline {
    #[inline]
    fn exhausted(&mut self) -> bool {
        now_millis() >= self.until
    }
}

/// Fixed number of search steps. Deterministic, so handy for tests.
#[derive(Clone, Copy, Debug)]
pub struct StepBudget {
    remaining: u64,
}

impl StepBudget {
    pub fn new(steps: u64) -> Self {
        Self { remaining: steps }
    }
}

impl Budget for StepBudget {
    #[inline]
    fn exhausted(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

/// Run until the search completes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unlimited;

impl Budget for Unlimited {
    #[inline]
    fn exhausted(&mut self) -> bool {
        false
    }
}

/// Milliseconds since the Unix epoch, the time base hosts pass to ticks.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn now_millis() -> f64 {
    crate::wasm::date_now()
}

/// Milliseconds since the Unix epoch, the time base hosts pass to ticks.
#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
pub fn now_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Where the solver is in its lifecycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    #[default]
    Idle,
    Searching,
    Solved,
    NoSolution,
}

/// Outcome of one tick.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TickResult {
    /// The search has finished (or was never started).
    pub done: bool,
    /// A winning sequence was found.
    pub found: bool,
    /// Serialized states from the start (first) to the won state (last).
    pub sequence: Option<Vec<u64>>,
}

/// Counters collected during a search.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Frames pushed, root included
    pub nodes: u64,
    /// Moves tried
    pub attempts: u64,
    /// Winning positions reached
    pub wins: u64,
    /// Frames popped after running out of moves
    pub dead_ends: u64,
    /// Deepest frame stack seen
    pub max_depth: u64,
    /// Ticks that did search work
    pub ticks: u64,
}

/// Explicit stack frame: one per open ply.
#[derive(Clone, Copy, Debug)]
struct SearchFrame {
    /// Serialized board on entry to this ply
    board: u64,
    /// Slot currently being examined
    slot: usize,
    /// Index into that slot's move list
    move_index: usize,
    /// A child frame is open for `move_index`
    wants_undo: bool,
}

impl SearchFrame {
    fn new(board: u64) -> Self {
        Self {
            board,
            slot: 0,
            move_index: 0,
            wants_undo: false,
        }
    }
}

/// Result of a single move attempt on the top frame.
enum Attempt {
    /// The move won; the frame advanced to its next move.
    Won,
    /// The move opened a new ply at this state.
    Descend(BoardState),
    /// The frame has nothing left to try.
    Exhausted,
}

/// Resumable depth-first solver.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    frames: Vec<SearchFrame>,
    /// States along the current line, start at the bottom
    path: StateStack,
    /// Shortest winning line found so far
    best: StateStack,
    /// Scratch board the search mutates
    state: BoardState,
    status: SolveStatus,
    stats: SearchStats,
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new search from `start`.
    ///
    /// Rejected while another search is running.
    pub fn start(&mut self, start: BoardState) -> Result<(), PegError> {
        if self.status == SolveStatus::Searching {
            return Err(PegError::SearchInProgress);
        }

        self.frames.clear();
        self.path.clear();
        self.best.clear();
        self.stats = SearchStats::default();
        self.state = start;
        self.path.push(start.serialize());

        if start.peg_count() == 1 {
            self.best = self.path.clone();
            self.status = SolveStatus::Solved;
            log::debug!("start {:#x} is already won", start.serialize());
            return Ok(());
        }

        self.frames.push(SearchFrame::new(start.serialize()));
        self.stats.nodes = 1;
        self.stats.max_depth = 1;
        self.status = SolveStatus::Searching;
        log::debug!(
            "search started from {:#x} ({} pegs)",
            start.serialize(),
            start.peg_count()
        );
        Ok(())
    }

    /// Advance the search until it completes or `budget` runs out.
    pub fn tick<B: Budget + ?Sized>(&mut self, topology: &Topology, budget: &mut B) -> TickResult {
        if self.status != SolveStatus::Searching {
            return self.result();
        }
        self.stats.ticks += 1;

        while !self.frames.is_empty() {
            if budget.exhausted() {
                return self.result();
            }

            match self.attempt(topology) {
                Attempt::Won => {}
                Attempt::Descend(next) => {
                    self.state = next;
                    self.frames.push(SearchFrame::new(next.serialize()));
                    self.stats.nodes += 1;
                    self.stats.max_depth = self.stats.max_depth.max(self.frames.len() as u64);
                }
                Attempt::Exhausted => self.backtrack(),
            }
        }

        self.finish();
        self.result()
    }

    /// Run the search to completion in one call.
    pub fn run(&mut self, topology: &Topology) -> TickResult {
        self.tick(topology, &mut Unlimited)
    }

    /// Abandon the running search. The best line found so far is dropped.
    pub fn cancel(&mut self) {
        if self.status == SolveStatus::Searching {
            log::warn!(
                "search abandoned at depth {} after {} attempts",
                self.frames.len(),
                self.stats.attempts
            );
        }
        self.frames.clear();
        self.path.clear();
        self.best.clear();
        self.status = SolveStatus::Idle;
    }

    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn is_searching(&self) -> bool {
        self.status == SolveStatus::Searching
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Number of open plies.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Best winning line once the search has completed.
    pub fn best(&self) -> Option<&[u64]> {
        (self.status == SolveStatus::Solved).then(|| self.best.as_slice())
    }

    fn result(&self) -> TickResult {
        TickResult {
            done: self.status != SolveStatus::Searching,
            found: self.status == SolveStatus::Solved,
            sequence: self.best().map(<[u64]>::to_vec),
        }
    }

    /// Try the next move of the top frame.
    fn attempt(&mut self, topology: &Topology) -> Attempt {
        let total = topology.total_slots();
        let Some(frame) = self.frames.last_mut() else {
            return Attempt::Exhausted;
        };
        debug_assert_eq!(self.state.serialize(), frame.board);

        while frame.slot < total {
            if self.state.is_occupied(frame.slot) {
                let mov = find_moves(topology, self.state, frame.slot)
                    .and_then(|moves| moves.get(frame.move_index));

                if let Some(mov) = mov {
                    self.stats.attempts += 1;
                    let next = self.state.apply_unchecked(mov);
                    self.path.push(next.serialize());

                    if next.is_won() {
                        self.stats.wins += 1;
                        if self.best.is_empty() || self.path.len() < self.best.len() {
                            self.best = self.path.clone();
                        }
                        // Never descended, so the scratch board is still `frame.board`.
                        self.path.pop();
                        frame.move_index += 1;
                        return Attempt::Won;
                    }

                    frame.wants_undo = true;
                    return Attempt::Descend(next);
                }
            }

            frame.slot += 1;
            frame.move_index = 0;
        }

        Attempt::Exhausted
    }

    /// Pop the exhausted top frame and resume its parent at the next move.
    fn backtrack(&mut self) {
        self.frames.pop();
        self.stats.dead_ends += 1;

        let Some(parent) = self.frames.last_mut() else {
            return;
        };
        debug_assert!(parent.wants_undo);

        self.state = BoardState(parent.board);
        self.path.pop();
        parent.move_index += 1;
        parent.wants_undo = false;
    }

    fn finish(&mut self) {
        self.status = if self.best.is_empty() {
            SolveStatus::NoSolution
        } else {
            SolveStatus::Solved
        };
        log::info!(
            "search complete: {:?} after {} nodes, {} attempts, {} wins, {} ticks",
            self.status,
            self.stats.nodes,
            self.stats.attempts,
            self.stats.wins,
            self.stats.ticks
        );
    }
}
