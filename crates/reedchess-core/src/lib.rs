//! Core data structures for the reed-switch chessboard.
//!
//! This crate holds the hardware-independent vocabulary shared by the scanner,
//! the reconciliation engine, and the polling service.
//!
//! # Overview
//!
//! - [`coordinate`]: [`Coordinate`], a square in sensor space (column, row)
//! - [`occupancy`]: [`OccupancySet`], the squares a scan found covered, and
//!   [`Diff`], the change between two successive scans
//! - [`tracker`]: [`OccupancyTracker`], which remembers the previous scan and
//!   reports a [`Diff`] only when something moved
//!
//! # Examples
//!
//! ```
//! use reedchess_core::{Coordinate, Observation, OccupancySet, OccupancyTracker};
//!
//! let e2 = Coordinate::new(4, 6);
//! let e4 = Coordinate::new(4, 4);
//!
//! let mut tracker = OccupancyTracker::new(OccupancySet::from_iter([e2]));
//!
//! // Same occupancy: nothing to reconcile.
//! assert!(tracker.observe(OccupancySet::from_iter([e2])).is_no_change());
//!
//! // The piece moved from e2 to e4.
//! let Observation::Changed(diff) = tracker.observe(OccupancySet::from_iter([e4])) else {
//!     panic!("expected a diff");
//! };
//! assert_eq!(diff.single_removed(), Some(e2));
//! assert_eq!(diff.single_added(), Some(e4));
//! ```

pub mod coordinate;
pub mod occupancy;
pub mod tracker;

pub use self::{
    coordinate::{Coordinate, HEIGHT, WIDTH},
    occupancy::{Diff, OccupancySet},
    tracker::{Observation, OccupancyTracker},
};
