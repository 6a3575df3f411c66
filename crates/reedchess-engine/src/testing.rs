//! Test utilities for the reconciler.
//!
//! This module provides [`ReconcileTester`], a harness that plays physical
//! piece movements against a [`Reconciler`], and [`ScriptedRules`], a
//! deterministic [`RulesAdapter`] whose legal moves are listed by hand.
//!
//! # Example
//!
//! ```ignore
//! ReconcileTester::start()
//!     .lift("e2")
//!     .assert_highlight(&["e3", "e4"], &[])
//!     .place("e4")
//!     .assert_committed("e2e4");
//! ```

use reedchess_core::{Coordinate, Diff, Observation, OccupancySet, OccupancyTracker};

use crate::{
    BoardMove, BoardState, ChessRules, Destination, GameOutcome, IllegalMoveError, Notification,
    Reaction, Reconciler, RulesAdapter, Selection, Side, squares,
};

/// Parses a square name, panicking on typos in test code.
#[track_caller]
fn sq(name: &str) -> Coordinate {
    squares::parse(name).unwrap_or_else(|| panic!("invalid square name {name:?}"))
}

/// A test harness for the reconciler.
///
/// The tester keeps a physical occupancy, starting from the pieces the rules
/// report, and feeds every change through an [`OccupancyTracker`] just like
/// the polling loop does. Notifications and the reaction of the last step are
/// kept for assertions.
///
/// # Method Chaining
///
/// All methods return `self`, enabling fluent method chaining for readable tests.
///
/// # Panics
///
/// All assertion methods panic with detailed messages on failure, using
/// `#[track_caller]` to report the correct source location.
#[derive(Debug)]
pub struct ReconcileTester<R = ChessRules> {
    rules: R,
    reconciler: Reconciler,
    board: OccupancySet,
    tracker: OccupancyTracker,
    initial_fen: String,
    notifications: Vec<Notification>,
    reaction: Option<Reaction>,
}

impl ReconcileTester {
    /// Creates a tester at the standard starting position.
    pub fn start() -> Self {
        Self::new(ChessRules::new())
    }

    /// Creates a tester from a FEN string.
    ///
    /// # Panics
    ///
    /// Panics if `fen` is not a legal position.
    #[track_caller]
    pub fn from_fen(fen: &str) -> Self {
        Self::new(ChessRules::from_fen(fen).unwrap())
    }
}

impl<R> ReconcileTester<R>
where
    R: RulesAdapter,
{
    /// Creates a tester whose physical board matches `rules`.
    pub fn new(rules: R) -> Self {
        let board = Coordinate::ALL
            .into_iter()
            .filter(|&coord| rules.is_occupied(coord))
            .collect();
        let initial_fen = rules.fen();
        Self {
            rules,
            reconciler: Reconciler::new(),
            board,
            tracker: OccupancyTracker::new(board),
            initial_fen,
            notifications: Vec::new(),
            reaction: None,
        }
    }

    /// Replaces the physical board so it disagrees with the rules.
    #[must_use]
    pub fn with_physical(mut self, occupied: &[&str]) -> Self {
        self.board = occupied.iter().map(|name| sq(name)).collect();
        self.tracker.reset(self.board);
        self
    }

    /// Returns the rules adapter.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Lifts the piece on `square`.
    #[track_caller]
    pub fn lift(self, square: &str) -> Self {
        self.change(&[square], &[])
    }

    /// Places a piece on `square`.
    #[track_caller]
    pub fn place(self, square: &str) -> Self {
        self.change(&[], &[square])
    }

    /// Lifts and places pieces within a single scan.
    #[track_caller]
    pub fn change(mut self, removed: &[&str], added: &[&str]) -> Self {
        for name in removed {
            self.board.remove(sq(name));
        }
        for name in added {
            self.board.insert(sq(name));
        }
        self.notifications.clear();
        self.reaction = match self.tracker.observe(self.board) {
            Observation::NoChange => None,
            Observation::Changed(diff) => Some(self.reconciler.reconcile(
                &diff,
                &mut self.rules,
                &mut self.notifications,
            )),
        };
        self
    }

    /// Feeds `diff` to the reconciler directly, bypassing the tracker.
    pub fn reconcile(mut self, diff: Diff) -> Self {
        self.notifications.clear();
        self.reaction = Some(
            self.reconciler
                .reconcile(&diff, &mut self.rules, &mut self.notifications),
        );
        self
    }

    #[track_caller]
    fn last_reaction(&self) -> &Reaction {
        self.reaction
            .as_ref()
            .unwrap_or_else(|| panic!("Expected a reaction, but the last step produced no diff"))
    }

    /// Asserts that the last step was ignored.
    #[track_caller]
    pub fn assert_no_op(self) -> Self {
        let reaction = self.last_reaction();
        assert!(reaction.is_no_op(), "Expected NoOp, got {reaction:?}");
        self
    }

    /// Asserts that the last step changed the selection only.
    #[track_caller]
    pub fn assert_selection_changed(self) -> Self {
        let reaction = self.last_reaction();
        assert!(
            reaction.is_selection_changed(),
            "Expected SelectionChanged, got {reaction:?}"
        );
        self
    }

    /// Asserts that the last step committed `uci`.
    #[track_caller]
    pub fn assert_committed(self, uci: &str) -> Self {
        match self.last_reaction() {
            Reaction::MoveCommitted(committed) => {
                assert_eq!(committed.uci(), uci, "Committed the wrong move");
                assert_eq!(committed.fen, self.rules.fen());
            }
            reaction => panic!("Expected {uci} to be committed, got {reaction:?}"),
        }
        self
    }

    /// Asserts that the last step inferred `uci` and the rules rejected it.
    #[track_caller]
    pub fn assert_rejected(self, uci: &str) -> Self {
        match self.last_reaction() {
            Reaction::MoveRejected(mv) => assert_eq!(mv.to_string(), uci),
            reaction => panic!("Expected {uci} to be rejected, got {reaction:?}"),
        }
        self
    }

    /// Asserts that the last step belonged to the castling rook relocation.
    #[track_caller]
    pub fn assert_castling_tracking(self, completed: bool) -> Self {
        let reaction = self.last_reaction();
        assert_eq!(
            reaction,
            &Reaction::CastlingRookTracking { completed },
            "Expected castling rook tracking"
        );
        self
    }

    /// Asserts the current selection.
    #[track_caller]
    pub fn assert_selection(self, expected: Selection) -> Self {
        assert_eq!(self.reconciler.selection(), expected);
        self
    }

    /// Asserts that the piece from `square` is held.
    #[track_caller]
    pub fn assert_selected(self, square: &str) -> Self {
        let expected = Selection::Lifted(sq(square));
        self.assert_selection(expected)
    }

    /// Asserts that nothing is selected.
    #[track_caller]
    pub fn assert_idle(self) -> Self {
        self.assert_selection(Selection::Idle)
    }

    /// Asserts that a rook relocation from `rook_from` to `rook_to` is pending.
    #[track_caller]
    pub fn assert_castling_armed(self, rook_from: &str, rook_to: &str) -> Self {
        let relocation = self
            .reconciler
            .castling()
            .unwrap_or_else(|| panic!("Expected a pending castling relocation"));
        assert_eq!(relocation.rook_from(), sq(rook_from));
        assert_eq!(relocation.rook_to(), sq(rook_to));
        self
    }

    /// Asserts that no rook relocation is pending.
    #[track_caller]
    pub fn assert_castling_idle(self) -> Self {
        assert_eq!(self.reconciler.castling(), None);
        self
    }

    /// Asserts that the last step highlighted exactly these squares.
    #[track_caller]
    pub fn assert_highlight(self, destinations: &[&str], captures: &[&str]) -> Self {
        let event = self
            .notifications
            .iter()
            .find_map(|n| match n {
                Notification::Highlight(event) if !event.is_cleared() => Some(event),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Expected a highlight, got {:?}", self.notifications));
        assert_eq!(event.destinations, destinations, "Wrong destinations");
        assert_eq!(event.capture_destinations, captures, "Wrong captures");
        self
    }

    /// Asserts that the last highlight of the step cleared all highlights.
    #[track_caller]
    pub fn assert_highlight_cleared(self) -> Self {
        let event = self
            .notifications
            .iter()
            .rev()
            .find_map(|n| match n {
                Notification::Highlight(event) => Some(event),
                _ => None,
            })
            .unwrap_or_else(|| panic!("Expected a highlight, got {:?}", self.notifications));
        assert!(event.is_cleared(), "Expected highlights to be cleared, got {event:?}");
        self
    }

    /// Asserts that the last step published a new board state.
    #[track_caller]
    pub fn assert_board_changed(self) -> Self {
        assert!(
            self.notifications
                .iter()
                .any(|n| matches!(n, Notification::BoardChanged(_))),
            "Expected BoardChanged, got {:?}",
            self.notifications
        );
        self
    }

    /// Asserts that the last step did not publish a board state.
    #[track_caller]
    pub fn assert_no_board_change(self) -> Self {
        assert!(
            !self
                .notifications
                .iter()
                .any(|n| matches!(n, Notification::BoardChanged(_))),
            "Expected no BoardChanged, got {:?}",
            self.notifications
        );
        self
    }

    /// Asserts that the last step published `expected`.
    #[track_caller]
    pub fn assert_notified(self, expected: &Notification) -> Self {
        assert!(
            self.notifications.contains(expected),
            "Expected {expected:?}, got {:?}",
            self.notifications
        );
        self
    }

    /// Asserts how many notifications the last step published.
    #[track_caller]
    pub fn assert_notification_count(self, expected: usize) -> Self {
        assert_eq!(
            self.notifications.len(),
            expected,
            "Unexpected notifications {:?}",
            self.notifications
        );
        self
    }

    /// Asserts the current FEN.
    #[track_caller]
    pub fn assert_fen(self, expected: &str) -> Self {
        assert_eq!(self.rules.fen(), expected);
        self
    }

    /// Asserts that the position is the one the tester started from.
    #[track_caller]
    pub fn assert_fen_unchanged(self) -> Self {
        assert_eq!(self.rules.fen(), self.initial_fen);
        self
    }

    /// Asserts the side to move.
    #[track_caller]
    pub fn assert_turn(self, expected: Side) -> Self {
        assert_eq!(self.rules.state().turn, expected);
        self
    }
}

/// A [`RulesAdapter`] with a hand-written list of legal moves.
///
/// Applying a legal move moves the piece and nothing else. There is no turn
/// order, so any listed move stays legal while its origin is occupied.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRules {
    initial: OccupancySet,
    occupied: OccupancySet,
    moves: Vec<(BoardMove, bool)>,
    applied: Vec<BoardMove>,
}

impl ScriptedRules {
    /// Creates an empty board with no legal moves.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts pieces on the given squares.
    #[track_caller]
    pub fn with_pieces(mut self, squares: &[&str]) -> Self {
        self.occupied.extend(squares.iter().map(|name| sq(name)));
        self.initial = self.occupied;
        self
    }

    /// Makes `from` to `to` a legal move.
    #[track_caller]
    pub fn with_move(mut self, from: &str, to: &str) -> Self {
        self.moves.push((BoardMove::new(sq(from), sq(to)), false));
        self
    }

    /// Makes `from` to `to` a legal castling move.
    #[track_caller]
    pub fn with_castling(mut self, from: &str, to: &str) -> Self {
        self.moves.push((BoardMove::new(sq(from), sq(to)), true));
        self
    }

    /// Returns the moves applied so far.
    pub fn applied(&self) -> &[BoardMove] {
        &self.applied
    }

    fn find(&self, mv: BoardMove) -> Option<bool> {
        if !self.occupied.contains(mv.from) {
            return None;
        }
        self.moves
            .iter()
            .find(|(candidate, _)| *candidate == mv)
            .map(|&(_, castling)| castling)
    }
}

impl RulesAdapter for ScriptedRules {
    fn legal_destinations(&self, from: Coordinate) -> Vec<Destination> {
        if !self.occupied.contains(from) {
            return Vec::new();
        }
        self.moves
            .iter()
            .filter(|(mv, _)| mv.from == from)
            .map(|(mv, _)| Destination {
                square: mv.to,
                capture: self.occupied.contains(mv.to),
            })
            .collect()
    }

    fn is_occupied(&self, square: Coordinate) -> bool {
        self.occupied.contains(square)
    }

    fn is_castling(&self, mv: BoardMove) -> bool {
        self.find(mv) == Some(true)
    }

    fn is_legal(&self, mv: BoardMove) -> bool {
        self.find(mv).is_some()
    }

    fn apply(&mut self, mv: BoardMove) -> Result<String, IllegalMoveError> {
        if !self.is_legal(mv) {
            return Err(IllegalMoveError { mv });
        }
        self.occupied.remove(mv.from);
        self.occupied.insert(mv.to);
        self.applied.push(mv);
        Ok(self.fen())
    }

    fn outcome(&self) -> Option<GameOutcome> {
        None
    }

    fn state(&self) -> BoardState {
        BoardState {
            fen: self.fen(),
            last_move: self.applied.last().map(ToString::to_string),
            is_check: false,
            is_checkmate: false,
            is_stalemate: false,
            turn: if self.applied.len() % 2 == 0 {
                Side::White
            } else {
                Side::Black
            },
        }
    }

    fn fen(&self) -> String {
        format!("scripted:{:016x}", self.occupied.bits())
    }

    fn reset(&mut self) {
        self.occupied = self.initial;
        self.applied.clear();
    }
}
