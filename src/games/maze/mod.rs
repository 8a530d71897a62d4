//! Maze game: grid types, generation, move rules and the match engine.

mod engine;
mod game;
mod generator;
mod random;
mod rules;
mod types;

pub use engine::{
    GridLimits, MAX_GRID_SIZE, MAX_PLAYER_NAME_CHARS, MIN_GRID_SIZE, MOVE_SUCCESS_MESSAGE,
    MatchEngine, MoveApplied,
};
pub use game::{Match, MatchId, MatchState, NewMatch, PlayerId};
pub use generator::{
    DEFAULT_MAX_INTERIOR_FILL, MazeGenerator, interior_cells, obstacle_target, raw_obstacle_target,
};
pub use random::{RandomSource, SeededRandom, SystemRandom};
pub use rules::{MoveOutcome, is_unit_step, validate};
pub use types::{Cell, Grid, GridShapeError, Position};
