//! Count the full game tree from a starting hole.
//!
//! Every move sequence is a distinct path: positions reached by different
//! orders of the same jumps are counted once per path. Terminal positions
//! are tallied by how many pegs remain.
//!
//! Usage: census [ROWS] [ROW,COL]

use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use peg_core::{find_moves, BoardConfig, BoardState, Move, PegError, Topology};

/// Stack frame for iterative DFS.
struct Frame {
    /// Board state at this node
    state: BoardState,
    /// All legal moves from this position
    moves: Vec<Move>,
    /// Index of next move to explore
    move_idx: usize,
}

impl Frame {
    fn new(topology: &Topology, state: BoardState) -> Self {
        let moves = state
            .pegs()
            .filter_map(|slot| find_moves(topology, state, slot))
            .flat_map(|list| list.iter().collect::<Vec<_>>())
            .collect();
        Self {
            state,
            moves,
            move_idx: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Census {
    /// Total nodes visited
    nodes: u64,
    /// Terminal nodes indexed by pegs left; index 1 is a win
    terminals: Vec<u64>,
    /// Maximum depth reached
    max_depth: u64,
}

impl Census {
    fn wins(&self) -> u64 {
        self.terminals.get(1).copied().unwrap_or(0)
    }

    fn stuck(&self) -> u64 {
        self.terminals.iter().skip(2).sum()
    }

    fn record_terminal(&mut self, state: BoardState) {
        let pegs = state.peg_count() as usize;
        if self.terminals.len() <= pegs {
            self.terminals.resize(pegs + 1, 0);
        }
        self.terminals[pegs] += 1;
    }
}

/// Statistics for logging.
struct Stats {
    start_time: Instant,
    last_log_time: Instant,
    last_log_nodes: u64,
}

impl Stats {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            last_log_nodes: 0,
        }
    }

    fn log_progress(&mut self, census: &Census, stack_len: usize) {
        let elapsed_total = self.start_time.elapsed().as_secs();
        let elapsed_since_log = self.last_log_time.elapsed().as_secs_f64();
        let rate = if elapsed_since_log > 0.0 {
            (census.nodes - self.last_log_nodes) as f64 / elapsed_since_log
        } else {
            0.0
        };

        println!(
            "[{:02}:{:02}:{:02}] nodes={} rate={:.0}/s depth={} max_depth={}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            census.nodes,
            rate,
            stack_len,
            census.max_depth,
        );
        println!(
            "           terminals: wins={} stuck={}",
            census.wins(),
            census.stuck()
        );

        self.last_log_time = Instant::now();
        self.last_log_nodes = census.nodes;
    }
}

/// Walk every path from `start`. Returns false if interrupted.
fn enumerate(
    topology: &Topology,
    start: BoardState,
    census: &mut Census,
    running: &AtomicBool,
    mut on_progress: impl FnMut(&Census, usize),
) -> bool {
    census.nodes = 1;
    census.max_depth = 1;
    let mut stack = vec![Frame::new(topology, start)];
    if stack[0].moves.is_empty() {
        census.record_terminal(start);
        return true;
    }

    let mut steps: u64 = 0;
    while !stack.is_empty() {
        steps += 1;
        if steps % 1_000_000 == 0 {
            if !running.load(Ordering::SeqCst) {
                return false;
            }
            on_progress(census, stack.len());
        }

        let Some(frame) = stack.last_mut() else {
            break;
        };
        if frame.move_idx >= frame.moves.len() {
            stack.pop();
            continue;
        }
        let mov = frame.moves[frame.move_idx];
        frame.move_idx += 1;

        let Ok(child) = frame.state.apply(topology, mov) else {
            continue;
        };
        census.nodes += 1;

        let child_frame = Frame::new(topology, child);
        if child_frame.moves.is_empty() {
            census.record_terminal(child);
            continue;
        }
        stack.push(child_frame);
        census.max_depth = census.max_depth.max(stack.len() as u64);
    }
    true
}

fn parse_config(args: &[String]) -> Option<BoardConfig> {
    let mut config = BoardConfig::default();
    if let Some(rows) = args.first() {
        config.rows = rows.parse().ok()?;
    }
    if let Some(hole) = args.get(1) {
        let (row, col) = hole.split_once(',')?;
        config.empty_row = row.trim().parse().ok()?;
        config.empty_col = col.trim().parse().ok()?;
    }
    Some(config)
}

fn start_state(config: &BoardConfig) -> Result<(Topology, BoardState), PegError> {
    let topology = Topology::build(config.rows)?;
    let hole = topology.slot_at(config.empty_row, config.empty_col)?;
    let state = BoardState::full_except(&topology, hole);
    Ok((topology, state))
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(config) = parse_config(&args) else {
        eprintln!("usage: census [ROWS] [ROW,COL]");
        return ExitCode::from(2);
    };
    let (topology, start) = match start_state(&config) {
        Ok(start) => start,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Full Game Tree Census");
    println!("=====================");
    println!(
        "{} rows, hole at ({},{}), {} pegs",
        config.rows,
        config.empty_row,
        config.empty_col,
        start.peg_count()
    );
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, stopping...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let mut census = Census::default();
    let mut stats = Stats::new();
    let complete = enumerate(&topology, start, &mut census, &running, |census, depth| {
        stats.log_progress(census, depth)
    });

    println!("\n=====================");
    println!(
        "{}",
        if complete {
            "Enumeration complete!"
        } else {
            "Enumeration interrupted (partial counts)"
        }
    );
    println!("=====================");
    println!("Total nodes: {}", census.nodes);
    println!("Games won: {}", census.wins());
    println!("Games stuck: {}", census.stuck());
    for (pegs, &count) in census.terminals.iter().enumerate().skip(2) {
        if count > 0 {
            println!("  - {} pegs left: {}", pegs, count);
        }
    }
    println!("Max depth: {}", census.max_depth);
    println!(
        "Total time: {:.1}s",
        stats.start_time.elapsed().as_secs_f64()
    );

    if complete {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(130)
    }
}
