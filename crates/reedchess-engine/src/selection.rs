//! Which piece, if any, the player currently holds.

use reedchess_core::Coordinate;

/// The lifted-piece state of the board.
///
/// At most one origin is ever selected. A diff that would lift a second piece
/// of the mover's own is not representable here and is ignored by the
/// reconciler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Selection {
    /// No piece is lifted.
    #[default]
    Idle,
    /// A piece was lifted from the square and not yet placed.
    Lifted(Coordinate),
    /// After lifting the piece on `origin`, the player also removed the piece
    /// on `captured`, presumably to capture it.
    CapturePending {
        /// Square of the moving piece.
        origin: Coordinate,
        /// Square of the piece being captured.
        captured: Coordinate,
    },
}

impl Selection {
    /// Returns the square of the moving piece, if one is lifted.
    #[must_use]
    pub const fn origin(self) -> Option<Coordinate> {
        match self {
            Self::Idle => None,
            Self::Lifted(origin) | Self::CapturePending { origin, .. } => Some(origin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let e2 = Coordinate::new(4, 6);
        let d3 = Coordinate::new(3, 5);
        assert_eq!(Selection::Idle.origin(), None);
        assert_eq!(Selection::Lifted(e2).origin(), Some(e2));
        assert_eq!(
            Selection::CapturePending {
                origin: e2,
                captured: d3,
            }
            .origin(),
            Some(e2)
        );
        assert!(Selection::default().is_idle());
    }
}
