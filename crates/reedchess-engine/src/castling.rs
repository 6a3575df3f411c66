//! Tracking the rook relocation that follows a castling move.
//!
//! The king's move commits castling in the logical position. The rook still
//! has to be moved by hand, and those two diffs must not be read as a second
//! move.

use reedchess_core::{Coordinate, Diff, HEIGHT};

use crate::BoardMove;

const KING_COLUMN: u8 = 4;
const KINGSIDE_KING_COLUMN: u8 = 6;
const QUEENSIDE_KING_COLUMN: u8 = 2;

/// The pending rook relocation after a committed castling move.
///
/// The relocation is complete once the rook has been seen leaving its corner
/// and arriving next to the king, in either order and possibly in separate
/// scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastlingRelocation {
    rook_from: Coordinate,
    rook_to: Coordinate,
    removed_observed: bool,
    placed_observed: bool,
}

impl CastlingRelocation {
    /// Creates a relocation with explicit rook squares.
    #[must_use]
    pub const fn new(rook_from: Coordinate, rook_to: Coordinate) -> Self {
        Self {
            rook_from,
            rook_to,
            removed_observed: false,
            placed_observed: false,
        }
    }

    /// Derives the rook squares from the king's castling move.
    ///
    /// Returns `None` if `king_move` is not a standard castling king move
    /// (from the e-file to the g- or c-file on either back rank).
    ///
    /// # Examples
    ///
    /// ```
    /// use reedchess_core::Coordinate;
    /// use reedchess_engine::{BoardMove, CastlingRelocation};
    ///
    /// // e1g1: rook h1 -> f1
    /// let relocation =
    ///     CastlingRelocation::for_king_move(BoardMove::new(Coordinate::new(4, 7), Coordinate::new(6, 7)))
    ///         .unwrap();
    /// assert_eq!(relocation.rook_from(), Coordinate::new(7, 7));
    /// assert_eq!(relocation.rook_to(), Coordinate::new(5, 7));
    /// ```
    #[must_use]
    pub fn for_king_move(king_move: BoardMove) -> Option<Self> {
        let BoardMove { from, to } = king_move;
        let row = from.row();
        if from.column() != KING_COLUMN || to.row() != row || (row != 0 && row != HEIGHT - 1) {
            return None;
        }
        let (rook_from, rook_to) = match to.column() {
            KINGSIDE_KING_COLUMN => (7, 5),
            QUEENSIDE_KING_COLUMN => (0, 3),
            _ => return None,
        };
        Some(Self::new(
            Coordinate::new(rook_from, row),
            Coordinate::new(rook_to, row),
        ))
    }

    /// Square the rook starts on.
    #[must_use]
    pub const fn rook_from(&self) -> Coordinate {
        self.rook_from
    }

    /// Square the rook must end on.
    #[must_use]
    pub const fn rook_to(&self) -> Coordinate {
        self.rook_to
    }

    /// Whether the rook has been seen leaving its corner.
    #[must_use]
    pub const fn removed_observed(&self) -> bool {
        self.removed_observed
    }

    /// Whether the rook has been seen arriving on its new square.
    #[must_use]
    pub const fn placed_observed(&self) -> bool {
        self.placed_observed
    }

    /// Whether both halves of the relocation have been observed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.removed_observed && self.placed_observed
    }

    /// Records the parts of the relocation visible in `diff`.
    ///
    /// Returns `true` if the diff touched either rook square, meaning it
    /// belongs to the relocation and must not be interpreted further.
    pub fn observe(&mut self, diff: &Diff) -> bool {
        let removed = diff.removed().contains(self.rook_from);
        let placed = diff.added().contains(self.rook_to);
        self.removed_observed |= removed;
        self.placed_observed |= placed;
        removed || placed
    }
}

#[cfg(test)]
mod tests {
    use reedchess_core::OccupancySet;

    use super::*;

    fn c(column: u8, row: u8) -> Coordinate {
        Coordinate::new(column, row)
    }

    fn diff(removed: &[Coordinate], added: &[Coordinate]) -> Diff {
        Diff::new(
            removed.iter().copied().collect(),
            added.iter().copied().collect(),
        )
    }

    #[test]
    fn test_rook_squares_for_each_castle() {
        let cases = [
            // e1g1, e1c1, e8g8, e8c8
            ((4, 7), (6, 7), (7, 7), (5, 7)),
            ((4, 7), (2, 7), (0, 7), (3, 7)),
            ((4, 0), (6, 0), (7, 0), (5, 0)),
            ((4, 0), (2, 0), (0, 0), (3, 0)),
        ];
        for (from, to, rook_from, rook_to) in cases {
            let relocation =
                CastlingRelocation::for_king_move(BoardMove::new(c(from.0, from.1), c(to.0, to.1)))
                    .unwrap();
            assert_eq!(relocation.rook_from(), c(rook_from.0, rook_from.1));
            assert_eq!(relocation.rook_to(), c(rook_to.0, rook_to.1));
            assert!(!relocation.is_complete());
        }
    }

    #[test]
    fn test_not_a_castling_king_move() {
        for (from, to) in [
            ((4, 7), (5, 7)),
            ((4, 6), (6, 6)),
            ((3, 7), (5, 7)),
            ((4, 7), (6, 6)),
        ] {
            assert_eq!(
                CastlingRelocation::for_king_move(BoardMove::new(c(from.0, from.1), c(to.0, to.1))),
                None
            );
        }
    }

    #[test]
    fn test_partial_observation_stays_armed() {
        let mut relocation = CastlingRelocation::new(c(7, 7), c(5, 7));

        assert!(!relocation.observe(&diff(&[c(4, 1)], &[])));
        assert!(!relocation.removed_observed());

        assert!(relocation.observe(&diff(&[c(7, 7)], &[])));
        assert!(relocation.removed_observed());
        assert!(!relocation.is_complete());

        // Putting the rook back on its corner does not complete anything.
        assert!(!relocation.observe(&diff(&[], &[c(7, 7)])));
        assert!(!relocation.is_complete());

        assert!(relocation.observe(&diff(&[], &[c(5, 7)])));
        assert!(relocation.is_complete());
    }

    #[test]
    fn test_single_diff_completes() {
        let mut relocation = CastlingRelocation::new(c(0, 0), c(3, 0));
        assert!(relocation.observe(&diff(&[c(0, 0)], &[c(3, 0)])));
        assert!(relocation.is_complete());
        assert!(!relocation.observe(&Diff::new(OccupancySet::new(), OccupancySet::new())));
    }
}
