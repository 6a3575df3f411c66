//! Physical-to-logical board reconciliation.
//!
//! The scanner only knows which squares are covered. This crate turns the
//! stream of occupancy diffs into chess moves: a lifted piece becomes a
//! selection with highlighted destinations, a placement commits a move, a
//! capture is a lift of the opponent's piece followed by a placement, and the
//! rook relocation after castling is tracked so it is not mistaken for a move.
//!
//! # Overview
//!
//! - [`rules`]: [`RulesAdapter`], the interface to the chess rules, and
//!   [`ChessRules`], its implementation on top of `shakmaty`
//! - [`squares`]: conversions between sensor coordinates and chess squares
//! - [`reconciler`]: [`Reconciler`], the move-inference state machine
//! - [`notification`]: the events the reconciler publishes to viewers
//!
//! # Examples
//!
//! ```
//! use reedchess_core::Diff;
//! use reedchess_engine::{
//!     ChessRules, Notification, Reaction, Reconciler, RulesAdapter as _, squares,
//! };
//!
//! let mut rules = ChessRules::new();
//! let mut reconciler = Reconciler::new();
//! let mut sink = Vec::<Notification>::new();
//!
//! let e2 = squares::parse("e2").unwrap();
//! let e4 = squares::parse("e4").unwrap();
//!
//! let lift = Diff::new([e2].into_iter().collect(), Default::default());
//! assert!(reconciler.reconcile(&lift, &mut rules, &mut sink).is_selection_changed());
//!
//! let place = Diff::new(Default::default(), [e4].into_iter().collect());
//! let Reaction::MoveCommitted(committed) = reconciler.reconcile(&place, &mut rules, &mut sink)
//! else {
//!     panic!("e2e4 is legal");
//! };
//! assert_eq!(committed.uci(), "e2e4");
//! assert_eq!(
//!     rules.fen(),
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
//! );
//! ```

pub mod castling;
pub mod notification;
pub mod reconciler;
pub mod rules;
pub mod selection;
pub mod squares;

pub use self::{
    castling::CastlingRelocation,
    notification::{ChannelSink, HighlightEvent, Notification, NotificationSink},
    reconciler::{CommittedMove, Reaction, Reconciler},
    rules::{
        BoardMove, BoardState, ChessRules, Destination, GameOutcome, IllegalMoveError,
        RulesAdapter, RulesError, Side,
    },
    selection::Selection,
};

#[cfg(test)]
mod testing;
