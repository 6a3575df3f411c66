use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use reedchess_core::{Coordinate, HEIGHT, OccupancySet, WIDTH};

use crate::{LineError, MatrixLines};

/// In-memory reed switches shared between a [`SimulatedMatrix`] and whoever
/// moves the pieces.
///
/// Clones share the same switches, so a test or a terminal front end can lift
/// and place pieces while the polling thread owns the matrix.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBoard {
    switches: Arc<Mutex<Switches>>,
}

#[derive(Debug, Default)]
struct Switches {
    closed: OccupancySet,
    pending_faults: u32,
}

impl SimulatedBoard {
    /// Creates a board with every switch open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board with the given switches closed.
    #[must_use]
    pub fn with_occupancy(occupancy: OccupancySet) -> Self {
        let board = Self::new();
        board.set_occupancy(occupancy);
        board
    }

    fn switches(&self) -> MutexGuard<'_, Switches> {
        self.switches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Puts a piece on `square`, closing its switch.
    pub fn place(&self, square: Coordinate) {
        self.switches().closed.insert(square);
    }

    /// Lifts the piece on `square`, opening its switch.
    pub fn lift(&self, square: Coordinate) {
        self.switches().closed.remove(square);
    }

    /// Replaces every switch state at once.
    pub fn set_occupancy(&self, occupancy: OccupancySet) {
        self.switches().closed = occupancy;
    }

    /// Returns the squares whose switches are closed.
    #[must_use]
    pub fn occupancy(&self) -> OccupancySet {
        self.switches().closed
    }

    /// Makes the next `count` row reads fail with a line fault.
    pub fn inject_faults(&self, count: u32) {
        self.switches().pending_faults = count;
    }

    /// Creates a full 8x8 matrix reading these switches.
    #[must_use]
    pub fn matrix(&self) -> SimulatedMatrix {
        SimulatedMatrix {
            board: self.clone(),
            driven: 0,
            max_driven: 0,
            release_all_calls: 0,
            bounce: None,
        }
    }
}

#[derive(Debug)]
struct Bounce {
    rng: Pcg64,
    probability: f64,
}

/// A [`MatrixLines`] implementation backed by a [`SimulatedBoard`].
///
/// A row reads active only when exactly the matching column is driven and its
/// switch is closed, like hardware with pull-down rows and high-impedance idle
/// columns. Optional contact bounce flips individual reads at random.
#[derive(Debug)]
pub struct SimulatedMatrix {
    board: SimulatedBoard,
    driven: u8,
    max_driven: u32,
    release_all_calls: usize,
    bounce: Option<Bounce>,
}

impl SimulatedMatrix {
    /// Flips each row read with `probability`, using a generator seeded with
    /// `seed` so runs are reproducible.
    #[must_use]
    pub fn with_bounce(mut self, probability: f64, seed: u64) -> Self {
        self.bounce = Some(Bounce {
            rng: Pcg64::seed_from_u64(seed),
            probability: probability.clamp(0.0, 1.0),
        });
        self
    }

    /// Returns the shared board.
    #[must_use]
    pub fn board(&self) -> &SimulatedBoard {
        &self.board
    }

    /// Returns whether any column is currently driven.
    #[must_use]
    pub fn is_driving(&self) -> bool {
        self.driven != 0
    }

    /// Largest number of columns that were ever driven at the same time.
    #[must_use]
    pub fn max_driven(&self) -> u32 {
        self.max_driven
    }

    /// Number of times every line was released at once.
    #[must_use]
    pub fn release_all_calls(&self) -> usize {
        self.release_all_calls
    }
}

impl MatrixLines for SimulatedMatrix {
    fn column_count(&self) -> u8 {
        WIDTH
    }

    fn row_count(&self) -> u8 {
        HEIGHT
    }

    fn drive_column(&mut self, column: u8) -> Result<(), LineError> {
        if column >= WIDTH {
            return Err(LineError::ColumnUnavailable { column });
        }
        self.driven |= 1 << column;
        self.max_driven = self.max_driven.max(self.driven.count_ones());
        Ok(())
    }

    fn release_column(&mut self, column: u8) -> Result<(), LineError> {
        if column >= WIDTH {
            return Err(LineError::ColumnUnavailable { column });
        }
        self.driven &= !(1 << column);
        Ok(())
    }

    fn read_row(&mut self, row: u8) -> Result<bool, LineError> {
        if row >= HEIGHT {
            return Err(LineError::RowUnavailable { row });
        }
        let closed = {
            let mut switches = self.board.switches();
            if switches.pending_faults > 0 {
                switches.pending_faults -= 1;
                return Err(LineError::Io {
                    message: "simulated fault".to_owned(),
                });
            }
            // Any driven column with a closed switch on this row pulls it up.
            (0..WIDTH)
                .filter(|column| self.driven & (1 << column) != 0)
                .any(|column| switches.closed.contains(Coordinate::new(column, row)))
        };
        let flipped = self
            .bounce
            .as_mut()
            .is_some_and(|bounce| bounce.rng.gen_bool(bounce.probability));
        Ok(closed != flipped)
    }

    fn release_all(&mut self) {
        self.driven = 0;
        self.release_all_calls += 1;
    }
}
