use std::{thread, time::Duration};

use log::{debug, trace};
use reedchess_core::{Coordinate, HEIGHT, OccupancySet, WIDTH};

use crate::{Interrupt, LineError, MatrixLines};

/// Timing and noise-rejection parameters for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Time to wait after driving a column before sampling rows.
    pub settle_delay: Duration,
    /// Samples taken per row; a strict majority must read active.
    pub samples: u8,
    /// Time to wait between two samples of the same row.
    pub inter_sample_delay: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_micros(500),
            samples: 3,
            inter_sample_delay: Duration::from_micros(200),
        }
    }
}

impl ScanConfig {
    /// A configuration without delays, for simulated lines and tests.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            samples: 3,
            inter_sample_delay: Duration::ZERO,
        }
    }

    /// Checks that the sample count allows a strict majority.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSamples`] if `samples` is zero, or
    /// [`ConfigError::EvenSamples`] if it is even.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.samples % 2 == 0 {
            return Err(ConfigError::EvenSamples {
                samples: self.samples,
            });
        }
        Ok(())
    }

    /// Minimum number of active samples for a row to count as closed.
    #[must_use]
    pub const fn majority(&self) -> u8 {
        self.samples / 2 + 1
    }

    /// Upper bound on the time spent waiting during one full scan.
    #[must_use]
    pub fn worst_case_delay(&self, columns: u8, rows: u8) -> Duration {
        let per_row = self.inter_sample_delay * u32::from(self.samples.saturating_sub(1));
        (self.settle_delay + per_row * u32::from(rows)) * u32::from(columns)
    }
}

/// Rejected scanner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    /// At least one sample per row is required.
    #[display("sample count must be at least 1")]
    NoSamples,
    /// An even sample count can tie.
    #[display("sample count must be odd, got {samples}")]
    EvenSamples {
        /// The rejected sample count.
        samples: u8,
    },
    /// The matrix has more lines than the board has squares.
    #[display("matrix of {columns}x{rows} lines exceeds the 8x8 board")]
    MatrixTooLarge {
        /// Column lines reported by the driver.
        columns: u8,
        /// Row lines reported by the driver.
        rows: u8,
    },
}

/// A scan that did not complete.
///
/// A failed scan never yields a partial occupancy set; a partial set would be
/// misread as pieces being lifted.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ScanError {
    /// The interruption flag was raised mid-scan.
    #[display("scan interrupted")]
    Interrupted,
    /// A line operation failed.
    #[display("sensor line fault: {_0}")]
    Line(#[from] LineError),
}

impl ScanError {
    /// Returns whether the scan stopped because it was asked to.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Column-by-column scanner with majority-vote debouncing.
///
/// Only the column being read is ever driven; every other column stays at
/// high impedance so that closed switches sharing a row cannot couple two
/// columns together and light up squares that are empty.
#[derive(Debug)]
pub struct MatrixScanner<L> {
    lines: L,
    config: ScanConfig,
    interrupt: Interrupt,
}

impl<L> MatrixScanner<L>
where
    L: MatrixLines,
{
    /// Creates a scanner over `lines`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`ScanConfig::validate`] or the
    /// matrix is larger than the board.
    pub fn new(lines: L, config: ScanConfig, interrupt: Interrupt) -> Result<Self, ConfigError> {
        config.validate()?;
        let (columns, rows) = (lines.column_count(), lines.row_count());
        if columns > WIDTH || rows > HEIGHT {
            return Err(ConfigError::MatrixTooLarge { columns, rows });
        }
        Ok(Self {
            lines,
            config,
            interrupt,
        })
    }

    /// Returns the scan configuration.
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Returns the interruption flag observed by this scanner.
    #[must_use]
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Returns the underlying lines.
    #[must_use]
    pub fn lines(&self) -> &L {
        &self.lines
    }

    /// Releases every line and returns the underlying driver.
    #[must_use]
    pub fn into_lines(mut self) -> L {
        self.lines.release_all();
        self.lines
    }

    /// Releases every column line to high impedance.
    pub fn release(&mut self) {
        self.lines.release_all();
    }

    /// Reads the whole matrix once.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Interrupted`] if the interruption flag is raised
    /// before the scan completes, or [`ScanError::Line`] on a line fault. In
    /// both cases every line has been released before returning.
    pub fn scan(&mut self) -> Result<OccupancySet, ScanError> {
        match self.scan_columns() {
            Ok(occupancy) => {
                if !occupancy.is_empty() {
                    debug!(
                        "debounced scan: {} squares stable\n{occupancy}",
                        occupancy.len()
                    );
                }
                Ok(occupancy)
            }
            Err(err) => {
                self.lines.release_all();
                debug!("scan abandoned: {err}");
                Err(err)
            }
        }
    }

    fn scan_columns(&mut self) -> Result<OccupancySet, ScanError> {
        let columns = self.lines.column_count();
        for column in 0..columns {
            self.lines.release_column(column)?;
        }

        let mut occupancy = OccupancySet::new();
        for column in 0..columns {
            self.check_interrupt()?;
            self.lines.drive_column(column)?;
            pause(self.config.settle_delay);

            let sampled = self.sample_rows(column, &mut occupancy);
            let released = self.lines.release_column(column);
            sampled?;
            released?;
        }
        Ok(occupancy)
    }

    fn sample_rows(&mut self, column: u8, occupancy: &mut OccupancySet) -> Result<(), ScanError> {
        let majority = self.config.majority();
        for row in 0..self.lines.row_count() {
            self.check_interrupt()?;
            let mut active = 0;
            for sample in 0..self.config.samples {
                if sample > 0 {
                    pause(self.config.inter_sample_delay);
                }
                if self.lines.read_row(row)? {
                    active += 1;
                }
            }
            if active >= majority {
                occupancy.insert(Coordinate::new(column, row));
            } else if active > 0 {
                trace!("rejected noisy read at ({column}, {row}): {active} active samples");
            }
        }
        Ok(())
    }

    fn check_interrupt(&self) -> Result<(), ScanError> {
        if self.interrupt.is_raised() {
            Err(ScanError::Interrupted)
        } else {
            Ok(())
        }
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}
