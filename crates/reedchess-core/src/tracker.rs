//! Scan-to-scan change detection.

use crate::{Diff, OccupancySet};

/// Result of feeding a fresh scan to an [`OccupancyTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Observation {
    /// The scan matched the previous one.
    NoChange,
    /// Some squares changed; the diff is never empty.
    Changed(Diff),
}

/// Remembers the previous occupancy and reports what changed.
///
/// The baseline is replaced by every changed scan, whether or not the move it
/// implies turns out to be legal. Occupancy tracking follows the physical
/// board, not the game.
#[derive(Debug, Clone, Default)]
pub struct OccupancyTracker {
    previous: OccupancySet,
}

impl OccupancyTracker {
    /// Creates a tracker whose first comparison is against `baseline`.
    #[must_use]
    pub const fn new(baseline: OccupancySet) -> Self {
        Self { previous: baseline }
    }

    /// Returns the most recently observed occupancy.
    #[must_use]
    pub const fn previous(&self) -> OccupancySet {
        self.previous
    }

    /// Replaces the baseline without reporting a change.
    pub fn reset(&mut self, baseline: OccupancySet) {
        self.previous = baseline;
    }

    /// Compares `current` against the previous scan.
    ///
    /// Returns [`Observation::NoChange`] when they are equal. Otherwise the
    /// baseline becomes `current` and the diff is returned.
    pub fn observe(&mut self, current: OccupancySet) -> Observation {
        if current == self.previous {
            return Observation::NoChange;
        }
        let diff = Diff::between(self.previous, current);
        self.previous = current;
        Observation::Changed(diff)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Coordinate;

    #[test]
    fn test_observe_replaces_baseline() {
        let e2 = Coordinate::new(4, 6);
        let e4 = Coordinate::new(4, 4);
        let mut tracker = OccupancyTracker::new(OccupancySet::from_iter([e2]));

        let Observation::Changed(diff) = tracker.observe(OccupancySet::new()) else {
            panic!("lifting a piece must produce a diff");
        };
        assert_eq!(diff.single_removed(), Some(e2));
        assert!(diff.added().is_empty());
        assert!(tracker.previous().is_empty());

        let Observation::Changed(diff) = tracker.observe(OccupancySet::from_iter([e4])) else {
            panic!("placing a piece must produce a diff");
        };
        assert!(diff.removed().is_empty());
        assert_eq!(diff.single_added(), Some(e4));

        assert!(tracker.observe(OccupancySet::from_iter([e4])).is_no_change());
    }

    #[test]
    fn test_reset_does_not_report() {
        let mut tracker = OccupancyTracker::default();
        let full = OccupancySet::from_bits(u64::MAX);
        tracker.reset(full);
        assert!(tracker.observe(full).is_no_change());
    }

    proptest! {
        #[test]
        fn only_non_empty_diffs_are_reported(scans in proptest::collection::vec(any::<u64>(), 1..64)) {
            let mut tracker = OccupancyTracker::default();
            let mut previous = OccupancySet::new();
            for bits in scans {
                let current = OccupancySet::from_bits(bits);
                match tracker.observe(current) {
                    Observation::NoChange => prop_assert_eq!(current, previous),
                    Observation::Changed(diff) => {
                        prop_assert!(!diff.is_empty());
                        prop_assert_eq!(diff, Diff::between(previous, current));
                    }
                }
                prop_assert_eq!(tracker.previous(), current);
                previous = current;
            }
        }

        #[test]
        fn repeated_scans_are_quiet(bits in any::<u64>(), repeats in 1usize..8) {
            let mut tracker = OccupancyTracker::default();
            let set = OccupancySet::from_bits(bits);
            let _ = tracker.observe(set);
            for _ in 0..repeats {
                prop_assert!(tracker.observe(set).is_no_change());
            }
        }
    }
}
