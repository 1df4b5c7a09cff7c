//! Peg Solitaire Solver
//!
//! Runs the resumable search tick by tick, printing progress as it goes.
//! Ctrl-C cancels the search at the next tick boundary.

mod logger;
mod stats;

use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::LevelFilter;
use peg_core::{now_millis, Board, BoardConfig, BoardState, Move, PegError, Topology};
use thiserror::Error;

use crate::stats::ProgressLog;

const USAGE: &str = "usage: solver [--rows N] [--hole R,C] [--budget-ms M] [--log-interval S] [--all-holes] [--verbose]";

/// Errors reported to the user before exiting.
#[derive(Debug, Error)]
enum CliError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("invalid value '{value}' for {flag}")]
    BadValue { flag: String, value: String },

    #[error("unknown argument '{0}'")]
    UnknownArgument(String),

    #[error(transparent)]
    Peg(#[from] PegError),
}

/// Command line options.
#[derive(Clone, Debug, PartialEq)]
struct Options {
    config: BoardConfig,
    /// Time slice handed to each tick
    budget_ms: f64,
    /// Seconds between progress lines, 0 to disable
    log_interval_secs: u64,
    /// Solve every starting hole instead of just one
    all_holes: bool,
    /// Level for search events from the library
    log_level: LevelFilter,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: BoardConfig::default(),
            budget_ms: peg_core::SOLVE_TIME_PER_FRAME_MS,
            log_interval_secs: 5,
            all_holes: false,
            log_level: LevelFilter::Info,
        }
    }
}

impl Options {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Options, CliError> {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(flag) = args.next() {
            match flag.as_str() {
                "--all-holes" => {
                    options.all_holes = true;
                    continue;
                }
                "--verbose" => {
                    options.log_level = LevelFilter::Debug;
                    continue;
                }
                _ => {}
            }

            let value = match flag.as_str() {
                "--rows" | "--hole" | "--budget-ms" | "--log-interval" => {
                    args.next().ok_or_else(|| CliError::MissingValue(flag.clone()))?
                }
                _ => return Err(CliError::UnknownArgument(flag)),
            };
            let bad = || CliError::BadValue {
                flag: flag.clone(),
                value: value.clone(),
            };

            match flag.as_str() {
                "--rows" => options.config.rows = value.parse().map_err(|_| bad())?,
                "--hole" => {
                    let (row, col) = value.split_once(',').ok_or_else(bad)?;
                    options.config.empty_row = row.trim().parse().map_err(|_| bad())?;
                    options.config.empty_col = col.trim().parse().map_err(|_| bad())?;
                }
                "--budget-ms" => {
                    options.budget_ms = value.parse().map_err(|_| bad())?;
                    if options.budget_ms <= 0.0 {
                        return Err(bad());
                    }
                }
                _ => options.log_interval_secs = value.parse().map_err(|_| bad())?,
            }
        }

        Ok(options)
    }
}

/// How a single solve ended.
#[derive(Debug)]
enum Outcome {
    Solved(Vec<u64>),
    NoSolution,
    Interrupted,
}

/// Drive one search to completion, a tick at a time.
fn run_search(board: &mut Board, options: &Options, running: &AtomicBool) -> Result<Outcome, CliError> {
    let mut progress = ProgressLog::new(options.log_interval_secs);
    board.solve()?;

    let result = loop {
        if !running.load(Ordering::SeqCst) {
            board.cancel_solve();
            progress.print_summary(board.search_stats());
            return Ok(Outcome::Interrupted);
        }

        let result = board.tick(now_millis(), options.budget_ms);
        if result.done {
            break result;
        }
        if progress.should_log() {
            progress.log_progress(board.search_stats());
        }
    };

    progress.print_summary(board.search_stats());
    Ok(match result.sequence {
        Some(sequence) if result.found => Outcome::Solved(sequence),
        _ => Outcome::NoSolution,
    })
}

/// One line per move, as (row, col) coordinates.
fn print_solution(topology: &Topology, sequence: &[u64]) {
    for (i, pair) in sequence.windows(2).enumerate() {
        let before = BoardState(pair[0]);
        let after = BoardState(pair[1]);
        match Move::between(topology, before, after) {
            Some(mov) => {
                let (sr, sc) = topology.row_col(mov.src);
                let (jr, jc) = topology.row_col(mov.jump);
                let (dr, dc) = topology.row_col(mov.dest);
                println!(
                    "{:3}. ({},{}) over ({},{}) to ({},{})",
                    i + 1,
                    sr,
                    sc,
                    jr,
                    jc,
                    dr,
                    dc
                );
            }
            None => println!("{:3}. {:#x} -> {:#x}", i + 1, pair[0], pair[1]),
        }
    }
}

fn solve_one(options: &Options, running: &AtomicBool) -> Result<Outcome, CliError> {
    let mut board = Board::with_config(options.config)?;
    println!(
        "Start: {} rows, hole at ({},{}), {} pegs",
        board.rows(),
        options.config.empty_row,
        options.config.empty_col,
        board.state().peg_count()
    );
    println!("{}", board);

    let outcome = run_search(&mut board, options, running)?;
    match &outcome {
        Outcome::Solved(sequence) => {
            println!("\nSolved in {} moves:", sequence.len() - 1);
            print_solution(board.topology(), sequence);
            if board.start_best_playback() {
                while board.hint().is_some() {}
            }
            println!("\n{}", board);
        }
        Outcome::NoSolution => println!("\nNo solution from this start."),
        Outcome::Interrupted => println!("\nSearch was interrupted before completion."),
    }
    Ok(outcome)
}

/// Solve every starting hole on the board and print a table.
fn solve_all_holes(options: &Options, running: &AtomicBool) -> Result<(), CliError> {
    let topology = Topology::build(options.config.rows)?;
    let mut table = Vec::new();

    for slot in topology.slots() {
        let (row, col) = topology.row_col(slot);
        let hole_options = Options {
            config: BoardConfig {
                rows: options.config.rows,
                empty_row: row,
                empty_col: col,
            },
            log_interval_secs: 0,
            ..options.clone()
        };

        let mut board = Board::with_config(hole_options.config)?;
        let outcome = run_search(&mut board, &hole_options, running)?;
        let attempts = board.search_stats().attempts;
        println!(
            "hole ({},{}): {} after {} moves tried\n",
            row,
            col,
            outcome_label(&outcome),
            attempts
        );
        if matches!(outcome, Outcome::Interrupted) {
            break;
        }
        table.push(((row, col), outcome));
    }

    println!("==========================");
    for ((row, col), outcome) in &table {
        println!("({},{}) {}", row, col, outcome_label(outcome));
    }
    let solvable = table
        .iter()
        .filter(|(_, outcome)| matches!(outcome, Outcome::Solved(_)))
        .count();
    println!("{} of {} holes solvable", solvable, topology.total_slots());
    Ok(())
}

fn outcome_label(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Solved(_) => "solved",
        Outcome::NoSolution => "no solution",
        Outcome::Interrupted => "interrupted",
    }
}

fn main() -> ExitCode {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    logger::init(options.log_level);

    println!("Peg Solitaire Solver");
    println!("====================");
    println!("Budget per tick: {}ms", options.budget_ms);
    println!();

    // Set up SIGINT handler for cancellation at the next tick
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\n\nInterrupt received, cancelling search...");
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    let result = if options.all_holes {
        solve_all_holes(&options, &running)
    } else {
        solve_one(&options, &running).map(|_| ())
    };

    match result {
        Ok(()) if running.load(Ordering::SeqCst) => ExitCode::SUCCESS,
        Ok(()) => ExitCode::from(130),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options, CliError> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), Options::default());
    }

    #[test]
    fn test_all_flags() {
        let options = parse(&[
            "--rows", "6", "--hole", "2,1", "--budget-ms", "50", "--log-interval", "0", "--all-holes",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(options.config.rows, 6);
        assert_eq!((options.config.empty_row, options.config.empty_col), (2, 1));
        assert_eq!(options.budget_ms, 50.0);
        assert_eq!(options.log_interval_secs, 0);
        assert!(options.all_holes);
        assert_eq!(options.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(parse(&["--rows"]), Err(CliError::MissingValue(_))));
        assert!(matches!(parse(&["--hole", "3"]), Err(CliError::BadValue { .. })));
        assert!(matches!(parse(&["--budget-ms", "0"]), Err(CliError::BadValue { .. })));
        assert!(matches!(parse(&["--fast"]), Err(CliError::UnknownArgument(_))));
    }

    #[test]
    fn test_search_runs_to_completion() {
        let options = Options {
            config: BoardConfig {
                rows: 4,
                empty_row: 1,
                empty_col: 0,
            },
            log_interval_secs: 0,
            ..Options::default()
        };
        let mut board = Board::with_config(options.config).unwrap();
        let outcome = run_search(&mut board, &options, &AtomicBool::new(true)).unwrap();
        match outcome {
            Outcome::Solved(sequence) => assert_eq!(sequence.len(), 9),
            other => panic!("expected a solution, got {:?}", other),
        }
    }

    #[test]
    fn test_interrupt_cancels_search() {
        let options = Options::default();
        let mut board = Board::with_config(options.config).unwrap();
        let outcome = run_search(&mut board, &options, &AtomicBool::new(false)).unwrap();
        assert!(matches!(outcome, Outcome::Interrupted));
        assert!(!board.is_solving());
        assert_eq!(board.serialize(), 32766);
    }
}
