//! Move validation rules.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::types::{Cell, Grid, Position};
use crate::error::GameError;

/// Result of validating a proposed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum MoveOutcome {
    /// The step is legal.
    Accepted,
    /// Target outside the grid.
    OutOfBounds,
    /// Target cell is an obstacle.
    Obstacle,
    /// Not exactly one orthogonal unit step.
    IllegalStep,
}

impl MoveOutcome {
    /// Converts a rejection into its error, `None` for [`MoveOutcome::Accepted`].
    pub fn into_error(self, from: Position, to: Position) -> Option<GameError> {
        match self {
            Self::Accepted => None,
            Self::OutOfBounds => Some(GameError::OutOfBounds(to)),
            Self::Obstacle => Some(GameError::Obstacle(to)),
            Self::IllegalStep => Some(GameError::IllegalStep { from, to }),
        }
    }
}

/// Decides whether stepping from `current` to `target` is legal.
///
/// Checks run bounds, then obstacle, then step shape, so a diagonal jump onto
/// a wall reports `Obstacle`.
#[instrument(skip(grid), fields(size = grid.size()))]
pub fn validate(grid: &Grid, current: Position, target: Position) -> MoveOutcome {
    let Some(cell) = grid.get(target) else {
        return MoveOutcome::OutOfBounds;
    };
    if cell == Cell::Obstacle {
        return MoveOutcome::Obstacle;
    }
    if !is_unit_step(current, target) {
        return MoveOutcome::IllegalStep;
    }
    MoveOutcome::Accepted
}

/// True when exactly one axis changes by exactly one.
pub fn is_unit_step(from: Position, to: Position) -> bool {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    (dx == 1 && dy == 0) || (dx == 0 && dy == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_steps() {
        let o = Position::new(1, 1);
        assert!(is_unit_step(o, Position::new(2, 1)));
        assert!(is_unit_step(o, Position::new(1, 0)));
        assert!(!is_unit_step(o, o));
        assert!(!is_unit_step(o, Position::new(2, 2)));
        assert!(!is_unit_step(o, Position::new(1, 3)));
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let grid = Grid::filled(3);
        let outcome = validate(&grid, Position::new(0, 0), Position::new(i32::MIN, i32::MAX));
        assert_eq!(outcome, MoveOutcome::OutOfBounds);
    }
}
