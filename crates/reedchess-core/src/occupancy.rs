//! Occupancy sets and scan-to-scan differences.

use std::{
    fmt::{self, Display},
    iter::FusedIterator,
};

use crate::{Coordinate, HEIGHT, WIDTH};

/// The set of squares detected as covered by a piece.
///
/// Backed by a 64-bit mask with one bit per square, indexed by
/// [`Coordinate::index`]. Iteration yields coordinates in row-major order.
///
/// # Examples
///
/// ```
/// use reedchess_core::{Coordinate, OccupancySet};
///
/// let mut set = OccupancySet::new();
/// set.insert(Coordinate::new(0, 0));
/// set.insert(Coordinate::new(7, 7));
///
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(Coordinate::new(0, 0)));
/// assert!(!set.contains(Coordinate::new(1, 0)));
///
/// let coords: Vec<_> = set.iter().collect();
/// assert_eq!(coords, [Coordinate::new(0, 0), Coordinate::new(7, 7)]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OccupancySet {
    bits: u64,
}

impl OccupancySet {
    /// The empty set.
    pub const EMPTY: Self = Self { bits: 0 };

    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set from its raw mask.
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }

    /// Returns the raw mask.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.bits
    }

    /// Adds a square. Returns `true` if it was not present.
    pub fn insert(&mut self, coord: Coordinate) -> bool {
        let mask = 1u64 << coord.index();
        let inserted = self.bits & mask == 0;
        self.bits |= mask;
        inserted
    }

    /// Removes a square. Returns `true` if it was present.
    pub fn remove(&mut self, coord: Coordinate) -> bool {
        let mask = 1u64 << coord.index();
        let removed = self.bits & mask != 0;
        self.bits &= !mask;
        removed
    }

    /// Returns whether the square is in the set.
    #[must_use]
    pub const fn contains(self, coord: Coordinate) -> bool {
        self.bits & (1u64 << coord.index()) != 0
    }

    /// Returns the number of squares in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns the squares in `self` that are not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Returns the only square of the set, or `None` unless it has exactly one.
    #[must_use]
    pub fn single(self) -> Option<Coordinate> {
        if self.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Returns an iterator over the squares in row-major order.
    #[must_use]
    pub const fn iter(self) -> Iter {
        Iter { bits: self.bits }
    }
}

impl FromIterator<Coordinate> for OccupancySet {
    fn from_iter<T: IntoIterator<Item = Coordinate>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<Coordinate> for OccupancySet {
    fn extend<T: IntoIterator<Item = Coordinate>>(&mut self, iter: T) {
        for coord in iter {
            self.insert(coord);
        }
    }
}

impl IntoIterator for OccupancySet {
    type Item = Coordinate;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the board as eight lines, `#` for covered and `.` for empty,
/// row 0 first.
impl Display for OccupancySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..HEIGHT {
            if row > 0 {
                writeln!(f)?;
            }
            for column in 0..WIDTH {
                let c = if self.contains(Coordinate::new(column, row)) {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Iterator over the squares of an [`OccupancySet`].
#[derive(Debug, Clone)]
pub struct Iter {
    bits: u64,
}

impl Iterator for Iter {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        #[expect(clippy::cast_possible_truncation)]
        let index = self.bits.trailing_zeros() as u8;
        self.bits &= self.bits - 1;
        Some(Coordinate::from_index(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.bits.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl FusedIterator for Iter {}

/// The change between two successive occupancy sets.
///
/// `removed` holds squares covered before but not now, `added` holds squares
/// covered now but not before. In normal play each side has zero to two
/// elements.
///
/// # Examples
///
/// ```
/// use reedchess_core::{Coordinate, Diff, OccupancySet};
///
/// let a = Coordinate::new(0, 6);
/// let b = Coordinate::new(1, 5);
///
/// let diff = Diff::between(OccupancySet::from_iter([a]), OccupancySet::from_iter([b]));
/// assert_eq!(diff.single_removed(), Some(a));
/// assert_eq!(diff.single_added(), Some(b));
/// assert!(!diff.is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diff {
    removed: OccupancySet,
    added: OccupancySet,
}

impl Diff {
    /// Creates a diff from explicit removed and added sets.
    #[must_use]
    pub const fn new(removed: OccupancySet, added: OccupancySet) -> Self {
        Self { removed, added }
    }

    /// Computes the diff that turns `previous` into `current`.
    #[must_use]
    pub const fn between(previous: OccupancySet, current: OccupancySet) -> Self {
        Self {
            removed: previous.difference(current),
            added: current.difference(previous),
        }
    }

    /// Squares that were covered and no longer are.
    #[must_use]
    pub const fn removed(&self) -> OccupancySet {
        self.removed
    }

    /// Squares that are newly covered.
    #[must_use]
    pub const fn added(&self) -> OccupancySet {
        self.added
    }

    /// Returns whether nothing changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Returns the removed square if exactly one was removed.
    #[must_use]
    pub fn single_removed(&self) -> Option<Coordinate> {
        self.removed.single()
    }

    /// Returns the added square if exactly one was added.
    #[must_use]
    pub fn single_added(&self) -> Option<Coordinate> {
        self.added.single()
    }
}

impl Display for Diff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "removed=[")?;
        for (i, c) in self.removed.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "] added=[")?;
        for (i, c) in self.added.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}
