//! Sensor-space board coordinates.

use std::fmt::{self, Display};

/// Number of column lines on the board.
pub const WIDTH: u8 = 8;

/// Number of row lines on the board.
pub const HEIGHT: u8 = 8;

/// A square addressed by its sensor lines.
///
/// `column` is the driven column line (0 is file "a"), `row` is the sampled
/// row line. Row 0 is the rank farthest from the scanning side, which is
/// rank 8 in the standard orientation.
///
/// # Examples
///
/// ```
/// use reedchess_core::Coordinate;
///
/// let c = Coordinate::new(4, 6);
/// assert_eq!(c.column(), 4);
/// assert_eq!(c.row(), 6);
///
/// assert!(Coordinate::try_new(8, 0).is_none());
/// assert_eq!(Coordinate::ALL.len(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    row: u8,
    column: u8,
}

impl Coordinate {
    /// All coordinates in row-major order.
    pub const ALL: [Self; 64] = {
        let mut all = [Self { row: 0, column: 0 }; 64];
        let mut i = 0;
        while i < WIDTH * HEIGHT {
            all[i as usize] = Self::from_index(i);
            i += 1;
        }
        all
    };

    /// Creates a coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `column >= WIDTH` or `row >= HEIGHT`.
    #[must_use]
    pub const fn new(column: u8, row: u8) -> Self {
        assert!(column < WIDTH && row < HEIGHT);
        Self { row, column }
    }

    /// Creates a coordinate, returning `None` when it falls outside the board.
    #[must_use]
    pub const fn try_new(column: u8, row: u8) -> Option<Self> {
        if column < WIDTH && row < HEIGHT {
            Some(Self { row, column })
        } else {
            None
        }
    }

    /// Returns the column line index.
    #[must_use]
    #[inline]
    pub const fn column(self) -> u8 {
        self.column
    }

    /// Returns the row line index.
    #[must_use]
    #[inline]
    pub const fn row(self) -> u8 {
        self.row
    }

    /// Returns the row-major bit index (`row * WIDTH + column`).
    #[must_use]
    #[inline]
    pub const fn index(self) -> u8 {
        self.row * WIDTH + self.column
    }

    /// Inverse of [`Coordinate::index`].
    ///
    /// # Panics
    ///
    /// Panics if `index >= 64`.
    #[must_use]
    #[inline]
    pub const fn from_index(index: u8) -> Self {
        assert!(index < WIDTH * HEIGHT);
        Self {
            row: index / WIDTH,
            column: index % WIDTH,
        }
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}
