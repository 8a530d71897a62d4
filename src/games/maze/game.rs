//! Match records and lifecycle states.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{Grid, Position};

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// Lifecycle state of a match. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum MatchState {
    /// Moves are accepted.
    InProgress,
    /// The goal was reached.
    Finished,
}

/// One play session: grid, position, timer and completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, new)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    match_id: MatchId,
    player_id: PlayerId,
    player_name: String,
    grid: Grid,
    current_position: Position,
    finished: bool,
    elapsed_seconds: f64,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Match {
    /// Current lifecycle state.
    pub fn state(&self) -> MatchState {
        if self.finished {
            MatchState::Finished
        } else {
            MatchState::InProgress
        }
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.current_position = position;
    }

    pub(crate) fn set_elapsed_seconds(&mut self, elapsed: f64) {
        self.elapsed_seconds = elapsed;
    }

    pub(crate) fn mark_finished(&mut self) {
        self.finished = true;
    }

    /// Bumps the version and updated timestamp; used by stores on write.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// A match that has not been stored yet. Stores assign ids and timestamps.
#[derive(Debug, Clone, PartialEq, Getters, new)]
pub struct NewMatch {
    /// Existing player to attach to, if the caller supplied one.
    player_id: Option<PlayerId>,
    player_name: String,
    grid: Grid,
}

impl NewMatch {
    /// Builds the stored match once the store has resolved ids and time.
    pub fn into_match(self, match_id: MatchId, player_id: PlayerId, player_name: String, now: DateTime<Utc>) -> Match {
        Match::new(
            match_id,
            player_id,
            player_name,
            self.grid,
            Position::ORIGIN,
            false,
            0.0,
            0,
            now,
            now,
        )
    }
}
