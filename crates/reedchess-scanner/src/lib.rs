//! Reed-switch matrix scanning.
//!
//! The board is wired as a matrix of column lines and row lines with one reed
//! switch per square. A magnet in a piece closes the switch, connecting its
//! column to its row. [`MatrixScanner`] drives one column at a time and samples
//! every row to produce an [`OccupancySet`].
//!
//! Hardware is reached only through the [`MatrixLines`] trait, so the scanner
//! runs unchanged against GPIO pins or the in-memory [`SimulatedMatrix`].
//!
//! # Examples
//!
//! ```
//! use reedchess_core::Coordinate;
//! use reedchess_scanner::{Interrupt, MatrixScanner, ScanConfig, SimulatedBoard};
//!
//! let board = SimulatedBoard::new();
//! board.place(Coordinate::new(4, 6));
//!
//! let mut scanner =
//!     MatrixScanner::new(board.matrix(), ScanConfig::immediate(), Interrupt::new())?;
//! let occupancy = scanner.scan()?;
//! assert_eq!(occupancy.single(), Some(Coordinate::new(4, 6)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`OccupancySet`]: reedchess_core::OccupancySet

pub use self::{
    lines::{Interrupt, LineError, MatrixLines},
    scanner::{ConfigError, MatrixScanner, ScanConfig, ScanError},
    simulated::{SimulatedBoard, SimulatedMatrix},
};

mod lines;
mod scanner;
mod simulated;
