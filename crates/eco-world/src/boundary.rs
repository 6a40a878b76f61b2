//! Map edge topologies.

use eco_core::{MapKind, Position};

/// Decides where a step may go and how raw coordinates map onto the grid.
pub trait MoveLimiter {
    /// Map a raw position to its in-grid representative
    fn canonicalize(&self, position: Position) -> Position;

    /// Whether an animal may step onto `position`
    fn can_move_to(&self, position: Position) -> bool;
}

/// Toroidal map: leaving one edge re-enters on the opposite edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappedBoundary {
    pub width: i32,
    pub height: i32,
}

impl MoveLimiter for WrappedBoundary {
    fn canonicalize(&self, position: Position) -> Position {
        position.wrap(self.width, self.height)
    }

    fn can_move_to(&self, _position: Position) -> bool {
        true
    }
}

/// Walled map: steps past an edge are refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderedBoundary {
    pub width: i32,
    pub height: i32,
}

impl MoveLimiter for BorderedBoundary {
    fn canonicalize(&self, position: Position) -> Position {
        position
    }

    fn can_move_to(&self, position: Position) -> bool {
        position.within(self.width, self.height)
    }
}

/// The boundary a world was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Wrapped(WrappedBoundary),
    Bordered(BorderedBoundary),
}

impl Boundary {
    pub fn new(kind: MapKind, width: i32, height: i32) -> Self {
        match kind {
            MapKind::Wrapped => Boundary::Wrapped(WrappedBoundary { width, height }),
            MapKind::Bordered => Boundary::Bordered(BorderedBoundary { width, height }),
        }
    }

    pub fn kind(&self) -> MapKind {
        match self {
            Boundary::Wrapped(_) => MapKind::Wrapped,
            Boundary::Bordered(_) => MapKind::Bordered,
        }
    }
}

impl MoveLimiter for Boundary {
    fn canonicalize(&self, position: Position) -> Position {
        match self {
            Boundary::Wrapped(b) => b.canonicalize(position),
            Boundary::Bordered(b) => b.canonicalize(position),
        }
    }

    fn can_move_to(&self, position: Position) -> bool {
        match self {
            Boundary::Wrapped(b) => b.can_move_to(position),
            Boundary::Bordered(b) => b.can_move_to(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrapped_crosses_edges() {
        let boundary = Boundary::new(MapKind::Wrapped, 15, 10);
        assert_eq!(boundary.kind(), MapKind::Wrapped);
        assert!(boundary.can_move_to(Position::new(-1, 10)));
        assert_eq!(boundary.canonicalize(Position::new(-1, 10)), Position::new(14, 0));
        assert_eq!(boundary.canonicalize(Position::new(15, -1)), Position::new(0, 9));
    }

    #[test]
    fn test_bordered_refuses_edges() {
        let boundary = Boundary::new(MapKind::Bordered, 15, 10);
        assert_eq!(boundary.kind(), MapKind::Bordered);
        assert!(boundary.can_move_to(Position::new(0, 0)));
        assert!(boundary.can_move_to(Position::new(14, 9)));
        assert!(!boundary.can_move_to(Position::new(-1, 5)));
        assert!(!boundary.can_move_to(Position::new(15, 5)));
        assert!(!boundary.can_move_to(Position::new(3, 10)));
        assert_eq!(boundary.canonicalize(Position::new(-1, 5)), Position::new(-1, 5));
    }

    proptest! {
        #[test]
        fn wrapped_canonicalize_is_idempotent(
            x in -500i32..500,
            y in -500i32..500,
            width in 1i32..40,
            height in 1i32..40,
        ) {
            let boundary = WrappedBoundary { width, height };
            let once = boundary.canonicalize(Position::new(x, y));
            prop_assert_eq!(boundary.canonicalize(once), once);
            prop_assert!(once.within(width, height));
        }

        #[test]
        fn bordered_accepts_exactly_the_grid(
            x in -50i32..50,
            y in -50i32..50,
            width in 1i32..40,
            height in 1i32..40,
        ) {
            let boundary = BorderedBoundary { width, height };
            let inside = x >= 0 && y >= 0 && x < width && y < height;
            prop_assert_eq!(boundary.can_move_to(Position::new(x, y)), inside);
        }
    }
}
