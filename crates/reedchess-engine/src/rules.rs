//! The logical chess position behind the physical board.
//!
//! The reconciler never inspects pieces or rules directly. It asks a
//! [`RulesAdapter`] what a lifted piece may do, whether an inferred move is
//! legal, and what the position looks like after applying it.

use std::fmt::{self, Display};

use reedchess_core::Coordinate;
use serde::Serialize;
use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, File, Move, Outcome, Position as _, PositionError,
    Role, Square,
    fen::{Fen, ParseFenError},
};

use crate::squares::{self, from_square, to_square};

/// A piece movement expressed in sensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardMove {
    /// Square the piece was lifted from.
    pub from: Coordinate,
    /// Square the piece was placed on.
    pub to: Coordinate,
}

impl BoardMove {
    /// Creates a move from `from` to `to`.
    #[must_use]
    pub const fn new(from: Coordinate, to: Coordinate) -> Self {
        Self { from, to }
    }
}

impl Display for BoardMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", to_square(self.from), to_square(self.to))
    }
}

/// A square a lifted piece may move to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination {
    /// Target square.
    pub square: Coordinate,
    /// Whether the target is occupied, so landing there captures.
    pub capture: bool,
}

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The player with the white pieces.
    #[display("white")]
    White,
    /// The player with the black pieces.
    #[display("black")]
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum GameOutcome {
    /// One side won.
    #[display("{winner} wins")]
    Decisive {
        /// The winning side.
        winner: Side,
    },
    /// Nobody won.
    #[display("draw")]
    Draw,
}

/// A snapshot of the logical position for viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    /// Position in Forsyth-Edwards Notation.
    pub fen: String,
    /// The most recent move in UCI notation, if any move has been played.
    pub last_move: Option<String>,
    /// Whether the side to move is in check.
    pub is_check: bool,
    /// Whether the side to move is checkmated.
    pub is_checkmate: bool,
    /// Whether the side to move is stalemated.
    pub is_stalemate: bool,
    /// The side to move.
    pub turn: Side,
}

/// An inferred move that the rules do not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("illegal move {mv}")]
pub struct IllegalMoveError {
    /// The rejected move.
    pub mv: BoardMove,
}

/// An error constructing a position.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum RulesError {
    /// The FEN string could not be parsed.
    #[display("invalid FEN: {_0}")]
    Fen(ParseFenError),
    /// The FEN parsed but does not describe a legal position.
    #[display("invalid position: {_0}")]
    Position(PositionError<Chess>),
}

/// Queries and updates the logical position.
///
/// All squares are sensor coordinates; implementations map them to whatever
/// their rules engine uses.
pub trait RulesAdapter {
    /// Returns the legal destinations of the piece on `from`, without
    /// duplicates. Castling is reported at the king's target square.
    fn legal_destinations(&self, from: Coordinate) -> Vec<Destination>;

    /// Returns whether the logical position has a piece on `square`.
    fn is_occupied(&self, square: Coordinate) -> bool;

    /// Returns whether `mv` is a legal castling move.
    fn is_castling(&self, mv: BoardMove) -> bool;

    /// Returns whether `mv` is legal.
    fn is_legal(&self, mv: BoardMove) -> bool;

    /// Applies `mv` and returns the resulting FEN.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalMoveError`] and leaves the position untouched if the
    /// move is not legal.
    fn apply(&mut self, mv: BoardMove) -> Result<String, IllegalMoveError>;

    /// Returns the outcome if the game is over.
    fn outcome(&self) -> Option<GameOutcome>;

    /// Returns a snapshot of the position.
    fn state(&self) -> BoardState;

    /// Returns the position in Forsyth-Edwards Notation.
    fn fen(&self) -> String;

    /// Restores the starting position.
    fn reset(&mut self);
}

/// [`RulesAdapter`] implementation for standard chess.
#[derive(Debug, Clone, Default)]
pub struct ChessRules {
    start: Chess,
    position: Chess,
    last_move: Option<String>,
}

impl ChessRules {
    /// Creates a game at the standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a game that starts from `fen`.
    ///
    /// [`RulesAdapter::reset`] returns to this position.
    ///
    /// # Errors
    ///
    /// Returns an error if `fen` cannot be parsed or is not a legal position.
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let position: Chess = fen
            .trim()
            .parse::<Fen>()?
            .into_position(CastlingMode::Standard)?;
        Ok(Self {
            start: position.clone(),
            position,
            last_move: None,
        })
    }

    /// Returns the current position.
    #[must_use]
    pub fn position(&self) -> &Chess {
        &self.position
    }

    fn find_move(&self, mv: BoardMove) -> Option<Move> {
        let from = to_square(mv.from);
        let to = to_square(mv.to);
        // A physical board cannot tell which piece was chosen on promotion.
        self.position.legal_moves().into_iter().find(|m| {
            m.from() == Some(from)
                && destination(m) == to
                && matches!(m.promotion(), None | Some(Role::Queen))
        })
    }
}

/// Returns where the moving piece lands. For castling that is the king's
/// target square, not the rook square `shakmaty` encodes.
fn destination(m: &Move) -> Square {
    match *m {
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Square::from_coords(file, king.rank())
        }
        _ => m.to(),
    }
}

fn uci(m: &Move) -> String {
    let mut uci = String::with_capacity(5);
    if let Some(from) = m.from() {
        uci.push_str(&from.to_string());
    }
    uci.push_str(&destination(m).to_string());
    if let Some(role) = m.promotion() {
        uci.push(role.char());
    }
    uci
}

impl RulesAdapter for ChessRules {
    fn legal_destinations(&self, from: Coordinate) -> Vec<Destination> {
        let from = to_square(from);
        let board = self.position.board();
        let mut destinations: Vec<Destination> = Vec::new();
        for m in self.position.legal_moves() {
            if m.from() != Some(from) {
                continue;
            }
            let target = destination(&m);
            let square = from_square(target);
            if destinations.iter().any(|d| d.square == square) {
                continue;
            }
            destinations.push(Destination {
                square,
                capture: board.piece_at(target).is_some(),
            });
        }
        destinations.sort_by_key(|d| squares::square_name(d.square));
        destinations
    }

    fn is_occupied(&self, square: Coordinate) -> bool {
        self.position.board().piece_at(to_square(square)).is_some()
    }

    fn is_castling(&self, mv: BoardMove) -> bool {
        self.find_move(mv).is_some_and(|m| m.is_castle())
    }

    fn is_legal(&self, mv: BoardMove) -> bool {
        self.find_move(mv).is_some()
    }

    fn apply(&mut self, mv: BoardMove) -> Result<String, IllegalMoveError> {
        let m = self.find_move(mv).ok_or(IllegalMoveError { mv })?;
        self.position.play_unchecked(&m);
        self.last_move = Some(uci(&m));
        Ok(self.fen())
    }

    fn outcome(&self) -> Option<GameOutcome> {
        self.position.outcome().map(|outcome| match outcome {
            Outcome::Decisive { winner } => GameOutcome::Decisive {
                winner: winner.into(),
            },
            Outcome::Draw => GameOutcome::Draw,
        })
    }

    fn state(&self) -> BoardState {
        BoardState {
            fen: self.fen(),
            last_move: self.last_move.clone(),
            is_check: self.position.is_check(),
            is_checkmate: self.position.is_checkmate(),
            is_stalemate: self.position.is_stalemate(),
            turn: self.position.turn().into(),
        }
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    fn reset(&mut self) {
        self.position = self.start.clone();
        self.last_move = None;
    }
}
