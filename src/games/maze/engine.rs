//! Match engine: builds new matches and applies moves.
//!
//! The engine holds only immutable limits. Every operation takes the match it
//! works on and returns a new value, so one engine is shared by all requests.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::game::{Match, MatchState, NewMatch, PlayerId};
use super::generator::{DEFAULT_MAX_INTERIOR_FILL, MazeGenerator, obstacle_target};
use super::random::RandomSource;
use super::rules::{MoveOutcome, validate};
use super::types::Position;
use crate::error::GameError;

/// Smallest grid side a match may use.
pub const MIN_GRID_SIZE: usize = 3;

/// Largest grid side a match may use.
pub const MAX_GRID_SIZE: usize = 50;

/// Longest accepted player name, in characters.
pub const MAX_PLAYER_NAME_CHARS: usize = 100;

/// Message returned for an ordinary accepted move.
pub const MOVE_SUCCESS_MESSAGE: &str = "Move successful";

/// Size and density limits for new matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Getters)]
pub struct GridLimits {
    min_size: usize,
    max_size: usize,
    max_interior_fill: f64,
}

impl GridLimits {
    /// Creates limits. Callers validate ranges (see `ServerConfig`).
    pub fn new(min_size: usize, max_size: usize, max_interior_fill: f64) -> Self {
        Self {
            min_size,
            max_size,
            max_interior_fill,
        }
    }
}

impl Default for GridLimits {
    fn default() -> Self {
        Self::new(MIN_GRID_SIZE, MAX_GRID_SIZE, DEFAULT_MAX_INTERIOR_FILL)
    }
}

/// An accepted move: the updated match and whether it just finished.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct MoveApplied {
    updated: Match,
    finished_now: bool,
}

impl MoveApplied {
    /// Human-readable outcome.
    pub fn message(&self) -> String {
        if self.finished_now {
            format!(
                "Congratulations! You finished the maze in {:.1} seconds",
                self.updated.elapsed_seconds()
            )
        } else {
            MOVE_SUCCESS_MESSAGE.to_string()
        }
    }

    /// Consumes the result, returning the updated match.
    pub fn into_match(self) -> Match {
        self.updated
    }
}

/// Stateless match engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    limits: GridLimits,
}

impl MatchEngine {
    /// Creates an engine with the given limits.
    pub fn new(limits: GridLimits) -> Self {
        Self { limits }
    }

    /// Returns the grid limits.
    pub fn limits(&self) -> &GridLimits {
        &self.limits
    }

    /// Checks a requested side against the limits.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidDimension`] outside `min_size..=max_size`.
    pub fn check_size(&self, n: i64) -> Result<usize, GameError> {
        // Smaller grids have no interior; a 1×1 match would start on the goal.
        let min = self.limits.min_size.max(MIN_GRID_SIZE);
        let max = self.limits.max_size;
        match usize::try_from(n) {
            Ok(size) if (min..=max).contains(&size) => Ok(size),
            _ => Err(GameError::InvalidDimension { size: n, min, max }),
        }
    }

    /// Trims and checks a player name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayerName`] for empty or over-long names.
    pub fn check_player_name(&self, name: &str) -> Result<String, GameError> {
        let trimmed = name.trim();
        let chars = trimmed.chars().count();
        if chars == 0 || chars > MAX_PLAYER_NAME_CHARS {
            return Err(GameError::InvalidPlayerName {
                max: MAX_PLAYER_NAME_CHARS,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Validates init input and generates the grid for a new match.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayerName`] or [`GameError::InvalidDimension`].
    #[instrument(skip(self, rng))]
    pub fn prepare_match(
        &self,
        player_name: &str,
        player_id: Option<PlayerId>,
        n: i64,
        rng: &mut dyn RandomSource,
    ) -> Result<NewMatch, GameError> {
        let name = self.check_player_name(player_name)?;
        let size = self.check_size(n)?;
        let target = obstacle_target(size, self.limits.max_interior_fill);
        let grid = MazeGenerator::generate(n, target, rng)?;
        info!(player = %name, size, obstacles = target, "Prepared new match");
        Ok(NewMatch::new(player_id, name, grid))
    }

    /// Applies a move to a match, returning the updated copy.
    ///
    /// `now` is the wall-clock time of the move; elapsed time is recomputed
    /// from it rather than accumulated.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AlreadyFinished`], [`GameError::OutOfBounds`],
    /// [`GameError::Obstacle`] or [`GameError::IllegalStep`]. The input match
    /// is never modified.
    #[instrument(skip(self, current), fields(match_id = %current.match_id(), from = %current.current_position()))]
    pub fn apply_move(
        &self,
        current: &Match,
        target: Position,
        now: DateTime<Utc>,
    ) -> Result<MoveApplied, GameError> {
        if current.state() == MatchState::Finished {
            debug!("Move on finished match ignored");
            return Err(GameError::AlreadyFinished);
        }

        let from = *current.current_position();
        let outcome = validate(current.grid(), from, target);
        if let Some(err) = outcome.into_error(from, target) {
            warn!(%target, %outcome, "Move rejected");
            return Err(err);
        }
        debug_assert_eq!(outcome, MoveOutcome::Accepted);

        let mut updated = current.clone();
        updated.set_position(target);

        let since_start = (now - *current.created_at()).num_milliseconds() as f64 / 1000.0;
        // Clock steps backwards must not shrink the timer.
        let elapsed = since_start.max(*current.elapsed_seconds()).max(0.0);
        updated.set_elapsed_seconds(elapsed);

        let finished_now = target == current.grid().goal();
        if finished_now {
            updated.mark_finished();
            info!(elapsed, "Match finished");
        } else {
            debug!(%target, elapsed, "Move accepted");
        }

        Ok(MoveApplied {
            updated,
            finished_now,
        })
    }
}
