//! Conversions between sensor coordinates and chess squares.
//!
//! The sensor matrix is wired with row 0 on the far side of the board from
//! white, so row 0 is rank 8 and row 7 is rank 1. Column 0 is file a. Every
//! mapping between the two spaces goes through this module.

use reedchess_core::{Coordinate, HEIGHT};
use shakmaty::{File, Rank, Square};

/// Converts a sensor coordinate to a chess square.
///
/// # Examples
///
/// ```
/// use reedchess_core::Coordinate;
/// use reedchess_engine::squares;
/// use shakmaty::Square;
///
/// assert_eq!(squares::to_square(Coordinate::new(4, 6)), Square::E2);
/// assert_eq!(squares::to_square(Coordinate::new(0, 0)), Square::A8);
/// ```
#[must_use]
pub fn to_square(coord: Coordinate) -> Square {
    let file = File::new(u32::from(coord.column()));
    let rank = Rank::new(u32::from(HEIGHT - 1 - coord.row()));
    Square::from_coords(file, rank)
}

/// Converts a chess square to a sensor coordinate.
#[must_use]
pub fn from_square(square: Square) -> Coordinate {
    let column = square.file() as u8;
    let row = HEIGHT - 1 - square.rank() as u8;
    Coordinate::new(column, row)
}

/// Returns the algebraic name of a sensor coordinate, such as `"e2"`.
#[must_use]
pub fn square_name(coord: Coordinate) -> String {
    to_square(coord).to_string()
}

/// Parses an algebraic square name, such as `"e2"`, into a sensor coordinate.
///
/// Returns `None` if `name` is not a square.
#[must_use]
pub fn parse(name: &str) -> Option<Coordinate> {
    name.trim().parse::<Square>().ok().map(from_square)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners() {
        assert_eq!(to_square(Coordinate::new(0, 0)), Square::A8);
        assert_eq!(to_square(Coordinate::new(7, 0)), Square::H8);
        assert_eq!(to_square(Coordinate::new(0, 7)), Square::A1);
        assert_eq!(to_square(Coordinate::new(7, 7)), Square::H1);
    }

    #[test]
    fn test_round_trip_all_squares() {
        for coord in Coordinate::ALL {
            assert_eq!(from_square(to_square(coord)), coord);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(square_name(Coordinate::new(4, 6)), "e2");
        assert_eq!(square_name(Coordinate::new(6, 7)), "g1");
        assert_eq!(parse("e4"), Some(Coordinate::new(4, 4)));
        assert_eq!(parse(" h8 "), Some(Coordinate::new(7, 0)));
        assert_eq!(parse("i9"), None);
        assert_eq!(parse(""), None);
    }
}
