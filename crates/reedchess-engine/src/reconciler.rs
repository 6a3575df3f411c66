//! Inferring chess moves from occupancy diffs.
//!
//! Each diff is matched against the rules below, in order, and the first one
//! that applies decides the reaction:
//!
//! 1. While a castling rook relocation is pending, a diff touching either rook
//!    square belongs to it and is consumed.
//! 2. One square emptied and one filled while the position has pieces on both
//!    is ambiguous and ignored.
//! 3. A single lift with nothing selected selects that piece and highlights
//!    its destinations. A placement seen in the same diff completes the move.
//! 4. Putting the lifted piece back where it came from cancels the selection.
//! 5. Placing the lifted piece elsewhere commits the move.
//! 6. Lifting a second piece while one is held starts a capture.
//! 7. A single placement while a piece is held commits the move, capturing.
//! 8. An empty diff resets the selection.
//!
//! Anything else is ignored.

use log::{debug, info, warn};
use reedchess_core::{Coordinate, Diff};

use crate::{
    BoardMove, CastlingRelocation, HighlightEvent, Notification, NotificationSink, RulesAdapter,
    Selection, squares::square_name,
};

/// A move accepted by the rules and applied to the position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedMove {
    /// The physical movement.
    pub mv: BoardMove,
    /// Position after the move.
    pub fen: String,
    /// Whether the move castled, so a rook relocation is now expected.
    pub castling: bool,
}

impl CommittedMove {
    /// Returns the origin and target squares in UCI form, such as `"e2e4"`.
    #[must_use]
    pub fn uci(&self) -> String {
        self.mv.to_string()
    }
}

/// What the reconciler did with a diff.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum Reaction {
    /// The diff was ignored.
    NoOp,
    /// A piece was selected, a capture began, or a selection was cancelled.
    SelectionChanged,
    /// A move was applied.
    MoveCommitted(CommittedMove),
    /// The inferred move is illegal and the position is unchanged.
    MoveRejected(BoardMove),
    /// The diff was part of the rook relocation after castling.
    CastlingRookTracking {
        /// Whether the relocation is now complete.
        completed: bool,
    },
}

/// The move-inference state machine.
///
/// The reconciler keeps only the selection and the pending castling
/// relocation. The position itself lives in the [`RulesAdapter`], and the
/// physical occupancy in the caller's tracker.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    selection: Selection,
    castling: Option<CastlingRelocation>,
}

impl Reconciler {
    /// Creates an idle reconciler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current selection.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Returns the pending castling relocation, if any.
    #[must_use]
    pub fn castling(&self) -> Option<&CastlingRelocation> {
        self.castling.as_ref()
    }

    /// Drops the selection and any pending castling relocation.
    pub fn reset(&mut self) {
        self.selection = Selection::Idle;
        self.castling = None;
    }

    /// Interprets `diff`, updating `rules` and publishing to `sink`.
    pub fn reconcile<R, S>(&mut self, diff: &Diff, rules: &mut R, sink: &mut S) -> Reaction
    where
        R: RulesAdapter + ?Sized,
        S: NotificationSink + ?Sized,
    {
        debug!("reconciling {diff} with {:?}", self.selection);

        if let Some(relocation) = &mut self.castling
            && relocation.observe(diff)
        {
            if !relocation.is_complete() {
                debug!("castling rook relocation in progress: {relocation:?}");
                return Reaction::CastlingRookTracking { completed: false };
            }
            info!("castling rook relocation complete");
            self.castling = None;
            self.selection = Selection::Idle;
            sink.notify(Notification::Resynchronized);
            return Reaction::CastlingRookTracking { completed: true };
        }

        let removed = diff.single_removed();
        let added = diff.single_added();

        if let (Some(from), Some(to)) = (removed, added)
            && rules.is_occupied(from)
            && rules.is_occupied(to)
        {
            debug!("ignoring ambiguous diff {diff}");
            return Reaction::NoOp;
        }

        if let Some(origin) = removed
            && self.selection.is_idle()
        {
            self.lift(origin, rules, sink);
            return match added {
                Some(target) => self.commit(origin, target, rules, sink),
                None => Reaction::SelectionChanged,
            };
        }

        if diff.removed().is_empty()
            && let Some(target) = added
            && self.selection.origin() == Some(target)
        {
            debug!("lift from {} cancelled", square_name(target));
            self.selection = Selection::Idle;
            sink.notify(Notification::Highlight(HighlightEvent::cleared()));
            return Reaction::SelectionChanged;
        }

        match (self.selection, removed, added) {
            (Selection::Lifted(origin), None, Some(target)) if diff.removed().is_empty() => {
                return self.commit(origin, target, rules, sink);
            }
            (Selection::Lifted(origin), Some(captured), _) => {
                debug!(
                    "capture of {} by {} pending",
                    square_name(captured),
                    square_name(origin)
                );
                self.selection = Selection::CapturePending { origin, captured };
                return Reaction::SelectionChanged;
            }
            (
                Selection::Lifted(origin) | Selection::CapturePending { origin, .. },
                _,
                Some(target),
            ) => {
                return self.commit(origin, target, rules, sink);
            }
            _ => {}
        }

        if diff.is_empty() {
            self.selection = Selection::Idle;
            return Reaction::NoOp;
        }

        debug!("ignoring diff {diff}");
        Reaction::NoOp
    }

    fn lift<R, S>(&mut self, origin: Coordinate, rules: &R, sink: &mut S)
    where
        R: RulesAdapter + ?Sized,
        S: NotificationSink + ?Sized,
    {
        self.selection = Selection::Lifted(origin);
        let destinations = rules.legal_destinations(origin);
        debug!(
            "lifted {}, {} legal destinations",
            square_name(origin),
            destinations.len()
        );
        sink.notify(Notification::Highlight(HighlightEvent::new(
            origin,
            &destinations,
        )));
    }

    fn commit<R, S>(
        &mut self,
        from: Coordinate,
        to: Coordinate,
        rules: &mut R,
        sink: &mut S,
    ) -> Reaction
    where
        R: RulesAdapter + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let mv = BoardMove::new(from, to);
        let castling = rules.is_castling(mv);
        self.selection = Selection::Idle;

        let reaction = match rules.apply(mv) {
            Ok(fen) => {
                info!("committed {mv}");
                sink.notify(Notification::BoardChanged(rules.state()));
                if castling {
                    self.castling = CastlingRelocation::for_king_move(mv);
                    match &self.castling {
                        Some(relocation) => info!(
                            "waiting for the rook to move from {} to {}",
                            square_name(relocation.rook_from()),
                            square_name(relocation.rook_to())
                        ),
                        None => warn!("castling move {mv} has no standard rook relocation"),
                    }
                }
                Reaction::MoveCommitted(CommittedMove { mv, fen, castling })
            }
            Err(err) => {
                warn!("{err}, position unchanged");
                Reaction::MoveRejected(mv)
            }
        };
        sink.notify(Notification::Highlight(HighlightEvent::cleared()));
        reaction
    }
}
