use std::sync::Arc;

use portable_atomic::{AtomicBool, Ordering};

/// Low-level access to the column and row lines of the switch matrix.
///
/// Column lines are outputs that are either driven to the active level or
/// released to a high-impedance input state. Row lines are inputs that read
/// inactive when no closed switch connects them to the driven column.
pub trait MatrixLines {
    /// Number of column lines wired to the board.
    fn column_count(&self) -> u8;

    /// Number of row lines wired to the board.
    fn row_count(&self) -> u8;

    /// Drives `column` to the active level.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be configured.
    fn drive_column(&mut self, column: u8) -> Result<(), LineError>;

    /// Releases `column` to high impedance.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be configured.
    fn release_column(&mut self, column: u8) -> Result<(), LineError>;

    /// Reads `row`, returning `true` when it is at the active level.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be read.
    fn read_row(&mut self, row: u8) -> Result<bool, LineError>;

    /// Releases every column to high impedance.
    ///
    /// Best effort: this runs on error and shutdown paths and must not fail.
    fn release_all(&mut self);
}

/// A failure reported by a [`MatrixLines`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LineError {
    /// The column line does not exist or could not be claimed.
    #[display("column line {column} is unavailable")]
    ColumnUnavailable {
        /// Column index.
        column: u8,
    },
    /// The row line does not exist or could not be claimed.
    #[display("row line {row} is unavailable")]
    RowUnavailable {
        /// Row index.
        row: u8,
    },
    /// The underlying I/O operation failed.
    #[display("line I/O failed: {message}")]
    Io {
        /// Description from the driver.
        message: String,
    },
}

/// A shared flag that asks an in-progress scan to abandon its work.
///
/// Clones observe the same flag. The polling service raises it on stop so a
/// scan in flight releases its lines and returns promptly.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    /// Creates a lowered flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn raise(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Lowers the flag.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Returns whether the flag is raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
