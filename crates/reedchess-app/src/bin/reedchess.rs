//! Reedchess on a simulated board.
//!
//! Runs the full polling pipeline against in-memory reed switches. Pieces are
//! moved by typing commands on standard input, and every notification is
//! printed to standard output as one JSON object per line.
//!
//! # Usage
//!
//! ```sh
//! cargo run --bin reedchess
//! ```
//!
//! Then type, one per line:
//!
//! ```text
//! lift e2
//! place e4
//! fen
//! reset
//! quit
//! ```
//!
//! Start from a custom position and add contact bounce to every row read:
//!
//! ```sh
//! cargo run --bin reedchess -- --fen "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1" --noise 0.01 --seed 7
//! ```
//!
//! Set `RUST_LOG=debug` to see every scan and diff.

use std::{
    error::Error,
    io::{self, BufRead as _},
    process::ExitCode,
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use clap::Parser;
use log::{info, warn};
use reedchess_app::{BoardService, LoopExit, ServiceError, Settings};
use reedchess_core::{Coordinate, OccupancySet};
use reedchess_engine::{ChessRules, Notification, RulesAdapter as _, squares};
use reedchess_scanner::{ScanConfig, SimulatedBoard};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Pause between two scans, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 100)]
    poll_interval_ms: u64,

    /// Consecutive failed scans before polling gives up.
    #[arg(long, value_name = "COUNT", default_value_t = 5)]
    fault_threshold: u32,

    /// Samples per row; must be odd.
    #[arg(long, value_name = "COUNT", default_value_t = 3)]
    samples: u8,

    /// Settle time after driving a column, in microseconds.
    #[arg(long, value_name = "US", default_value_t = 500)]
    settle_us: u64,

    /// Time between two samples of a row, in microseconds.
    #[arg(long, value_name = "US", default_value_t = 200)]
    sample_gap_us: u64,

    /// Notifications queued before new ones are dropped.
    #[arg(long, value_name = "COUNT", default_value_t = 64)]
    capacity: usize,

    /// Starting position in Forsyth-Edwards Notation.
    #[arg(long, value_name = "FEN")]
    fen: Option<String>,

    /// Probability that a single row read bounces.
    #[arg(long, value_name = "P", default_value_t = 0.0)]
    noise: f64,

    /// Seed for the contact bounce generator.
    #[arg(long, value_name = "SEED", default_value_t = 0)]
    seed: u64,
}

impl Args {
    fn settings(&self) -> Settings {
        Settings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            fault_threshold: self.fault_threshold,
            notification_capacity: self.capacity,
            scan: ScanConfig {
                settle_delay: Duration::from_micros(self.settle_us),
                samples: self.samples,
                inter_sample_delay: Duration::from_micros(self.sample_gap_us),
            },
        }
    }
}

enum Event {
    Line(String),
    Interrupt,
    Eof,
}

enum Input {
    Lift(Coordinate),
    Place(Coordinate),
    Reset,
    Fen,
    State,
    Help,
    Quit,
}

const HELP: &str = "commands: lift <square>, place <square>, reset, fen, state, help, quit";

fn parse_input(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let mut square = || {
        let name = words
            .next()
            .ok_or_else(|| format!("{command} needs a square"))?;
        squares::parse(name).ok_or_else(|| format!("{name:?} is not a square"))
    };
    let input = match command {
        "lift" => Input::Lift(square()?),
        "place" => Input::Place(square()?),
        "reset" => Input::Reset,
        "fen" => Input::Fen,
        "state" => Input::State,
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => return Err(format!("unknown command {command:?}")),
    };
    Ok(Some(input))
}

fn print_notification(notification: &Notification) {
    match serde_json::to_string(notification) {
        Ok(json) => println!("{json}"),
        Err(err) => warn!("failed to serialize {notification:?}: {err}"),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let rules = match &args.fen {
        Some(fen) => ChessRules::from_fen(fen)?,
        None => ChessRules::new(),
    };
    let occupancy: OccupancySet = Coordinate::ALL
        .into_iter()
        .filter(|&coord| rules.is_occupied(coord))
        .collect();
    let board = SimulatedBoard::with_occupancy(occupancy);
    let mut matrix = board.matrix();
    if args.noise > 0.0 {
        matrix = matrix.with_bounce(args.noise, args.seed);
    }

    let settings = args.settings();
    let (mut service, notifications) = BoardService::new(matrix, rules, settings)?;

    let (events_tx, events) = mpsc::channel();
    let interrupt_tx = events_tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Event::Interrupt);
    })?;
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if events_tx.send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = events_tx.send(Event::Eof);
    });
    let printer = thread::spawn(move || {
        for notification in notifications {
            print_notification(&notification);
        }
    });

    print_notification(&Notification::BoardChanged(service.board_state()));
    service.start()?;
    eprintln!("{HELP}");

    loop {
        let event = match events.recv_timeout(settings.poll_interval) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => {
                if service.is_running() {
                    continue;
                }
                break;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };
        let line = match event {
            Event::Line(line) => line,
            Event::Interrupt => {
                info!("interrupted");
                break;
            }
            Event::Eof => break,
        };
        match parse_input(&line) {
            Ok(None) => {}
            Ok(Some(Input::Lift(square))) => board.lift(square),
            Ok(Some(Input::Place(square))) => board.place(square),
            Ok(Some(Input::Reset)) => service.reset_game()?,
            Ok(Some(Input::Fen)) => eprintln!("{}", service.current_fen()),
            Ok(Some(Input::State)) => {
                print_notification(&Notification::BoardChanged(service.board_state()));
            }
            Ok(Some(Input::Help)) => eprintln!("{HELP}"),
            Ok(Some(Input::Quit)) => break,
            Err(message) => eprintln!("{message}; {HELP}"),
        }
        if !service.is_running() {
            break;
        }
    }

    let exit = match service.stop() {
        Ok(exit) => exit,
        Err(ServiceError::NotRunning) => LoopExit::Stopped,
        Err(err) => return Err(err.into()),
    };
    drop(service);
    let _ = printer.join();

    match exit {
        LoopExit::Stopped => Ok(()),
        LoopExit::GameOver(outcome) => {
            eprintln!("game over: {outcome}");
            Ok(())
        }
        LoopExit::Fault(err) => Err(err.into()),
    }
}

fn main() -> ExitCode {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
