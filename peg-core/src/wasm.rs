//! WASM bindings for peg-core
//!
//! Provides a JavaScript-friendly API for a browser frame loop: the host
//! calls `tick(frameTime, budget)` once per animation frame while a solve
//! is running and renders whatever state the board reports.

use wasm_bindgen::prelude::*;

use crate::{Board, BoardConfig, GameStatus, Move, Playback, Selection, SOLVE_TIME_PER_FRAME_MS};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = Date, js_name = now)]
    fn js_date_now() -> f64;
}

/// Milliseconds since the Unix epoch from the JavaScript clock.
#[cfg(target_arch = "wasm32")]
pub(crate) fn date_now() -> f64 {
    js_date_now()
}

/// WASM-friendly wrapper around Board
#[wasm_bindgen]
pub struct WasmBoard {
    inner: Board,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Create a board with `rows` rows and the hole at (emptyRow, emptyCol)
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, empty_row: usize, empty_col: usize) -> Result<WasmBoard, JsError> {
        console_error_panic_hook::set_once();
        let inner = Board::with_config(BoardConfig {
            rows,
            empty_row,
            empty_col,
        })?;
        Ok(WasmBoard { inner })
    }

    /// Refill the board, leaving only the starting hole
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Number of slots on the board
    #[wasm_bindgen(js_name = totalSlots)]
    pub fn total_slots(&self) -> usize {
        self.inner.topology().total_slots()
    }

    /// Slot index for a row and column
    #[wasm_bindgen(js_name = slotAt)]
    pub fn slot_at(&self, row: usize, col: usize) -> Result<usize, JsError> {
        Ok(self.inner.topology().slot_at(row, col)?)
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self, slot: usize) -> bool {
        self.inner.is_empty(slot)
    }

    #[wasm_bindgen(js_name = addPeg)]
    pub fn add_peg(&mut self, slot: usize) {
        self.inner.add_peg(slot);
    }

    #[wasm_bindgen(js_name = removePeg)]
    pub fn remove_peg(&mut self, slot: usize) {
        self.inner.remove_peg(slot);
    }

    /// Get legal moves from a slot as JSON array of { src, dest, jump }
    /// Returns null if the slot has none
    #[wasm_bindgen(js_name = findMoves)]
    pub fn find_moves(&self, slot: usize) -> Result<JsValue, JsError> {
        let moves: Option<Vec<Move>> = self.inner.find_moves(slot).map(|m| m.iter().collect());
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    /// Apply a move. Returns true if the board is now won.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, src: usize, dest: usize, jump: usize) -> Result<bool, JsError> {
        Ok(self.inner.apply_move(Move { src, dest, jump })?)
    }

    /// Handle a slot press from the input layer.
    /// Returns { kind: "ignored" | "moved" | "choosing" | "aborted", ... }
    pub fn select(&mut self, slot: usize) -> Result<JsValue, JsError> {
        let selection = WasmSelection::from(self.inner.select(slot)?);
        Ok(serde_wasm_bindgen::to_value(&selection)?)
    }

    /// Get u64 encoding of the board
    pub fn serialize(&self) -> u64 {
        self.inner.serialize()
    }

    /// Replace the board with a u64 encoding
    pub fn deserialize(&mut self, mask: u64) -> Result<(), JsError> {
        Ok(self.inner.deserialize(mask)?)
    }

    /// Game status: "playing", "won" or "lost"
    pub fn status(&self) -> String {
        match self.inner.status() {
            GameStatus::Playing => "playing".to_string(),
            GameStatus::Won => "won".to_string(),
            GameStatus::Lost => "lost".to_string(),
        }
    }

    /// Returns false if there was nothing to undo
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    /// Returns false if there was nothing to redo
    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    /// Start a solve from the current board
    pub fn solve(&mut self) -> Result<(), JsError> {
        Ok(self.inner.solve()?)
    }

    /// Advance the solver. Returns { done, found, sequence }
    /// `frameMillis` is any host timestamp (the requestAnimationFrame time
    /// works); the budget is timed with `Date.now()` from the call.
    /// A non-positive budget uses the default per-frame slice
    pub fn tick(&mut self, frame_millis: f64, budget_millis: f64) -> Result<JsValue, JsError> {
        let budget = if budget_millis > 0.0 {
            budget_millis
        } else {
            SOLVE_TIME_PER_FRAME_MS
        };
        let result = self.inner.tick(frame_millis, budget);
        Ok(serde_wasm_bindgen::to_value(&result)?)
    }

    #[wasm_bindgen(js_name = cancelSolve)]
    pub fn cancel_solve(&mut self) {
        self.inner.cancel_solve();
    }

    #[wasm_bindgen(js_name = hasSolution)]
    pub fn has_solution(&self) -> bool {
        self.inner.has_solution()
    }

    #[wasm_bindgen(js_name = startBestPlayback)]
    pub fn start_best_playback(&mut self) -> bool {
        self.inner.start_best_playback()
    }

    /// Returns remaining moves, 0 when solved, -1 when nothing is playing
    #[wasm_bindgen(js_name = stepBestPlayback)]
    pub fn step_best_playback(&mut self) -> i32 {
        match self.inner.step_best_playback() {
            Playback::Step { remaining } => remaining as i32,
            Playback::Solved => 0,
            Playback::Idle => -1,
        }
    }

    /// Play the next solution move. Returns the move or null
    pub fn hint(&mut self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.hint())?)
    }
}

/// Serializable selection result for JavaScript
#[derive(serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WasmSelection {
    Ignored,
    Moved { mov: Move, won: bool },
    Choosing { moves: Vec<Move> },
    Aborted,
}

impl From<Selection> for WasmSelection {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Ignored => WasmSelection::Ignored,
            Selection::Moved { mov, won } => WasmSelection::Moved { mov, won },
            Selection::Choosing(moves) => WasmSelection::Choosing {
                moves: moves.iter().collect(),
            },
            Selection::Aborted => WasmSelection::Aborted,
        }
    }
}
