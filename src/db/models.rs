//! Database models and conversions to domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;
use uuid::Uuid;

use crate::db::{DbError, schema};
use crate::games::maze::{Grid, Match, Position};

/// Player database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::players)]
pub struct Player {
    id: String,
    name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Insertable player model.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::players)]
pub struct NewPlayer {
    id: String,
    name: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Match database model. The maze is stored as JSON of cell codes.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::matches)]
pub struct MatchRecord {
    id: String,
    player_id: String,
    maze: String,
    current_x: i32,
    current_y: i32,
    finished: bool,
    elapsed_seconds: f64,
    version: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl MatchRecord {
    /// Converts the record and its owning player into a domain [`Match`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if an id or the stored maze cannot be decoded.
    #[instrument(skip(self, player), fields(match_id = %self.id))]
    pub fn into_domain(self, player: &Player) -> Result<Match, DbError> {
        let grid: Grid = serde_json::from_str(&self.maze)?;
        Ok(Match::new(
            parse_id(&self.id)?,
            parse_id(&self.player_id)?,
            player.name.clone(),
            grid,
            Position::new(self.current_x, self.current_y),
            self.finished,
            self.elapsed_seconds,
            self.version,
            self.created_at.and_utc(),
            self.updated_at.and_utc(),
        ))
    }
}

/// Insertable match model.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::matches)]
pub struct NewMatchRecord {
    id: String,
    player_id: String,
    maze: String,
    current_x: i32,
    current_y: i32,
    finished: bool,
    elapsed_seconds: f64,
    version: i64,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewMatchRecord {
    /// Builds an insertable row from a domain match.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the grid cannot be serialized.
    #[instrument(skip(m), fields(match_id = %m.match_id()))]
    pub fn from_domain(m: &Match) -> Result<Self, DbError> {
        Ok(Self {
            id: m.match_id().to_string(),
            player_id: m.player_id().to_string(),
            maze: serde_json::to_string(m.grid())?,
            current_x: m.current_position().x,
            current_y: m.current_position().y,
            finished: *m.finished(),
            elapsed_seconds: *m.elapsed_seconds(),
            version: *m.version(),
            created_at: m.created_at().naive_utc(),
            updated_at: m.updated_at().naive_utc(),
        })
    }
}

/// Mutable match columns written by a move. Grid and creation time never change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::matches)]
pub struct MatchUpdate {
    current_x: i32,
    current_y: i32,
    finished: bool,
    elapsed_seconds: f64,
    version: i64,
    updated_at: NaiveDateTime,
}

impl MatchUpdate {
    /// Captures the mutable state of a match, already bumped to its new version.
    pub fn from_domain(m: &Match) -> Self {
        Self {
            current_x: m.current_position().x,
            current_y: m.current_position().y,
            finished: *m.finished(),
            elapsed_seconds: *m.elapsed_seconds(),
            version: *m.version(),
            updated_at: m.updated_at().naive_utc(),
        }
    }
}

/// Parses a stored UUID column.
#[instrument]
fn parse_id(raw: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::new(format!("Invalid stored id '{}': {}", raw, e)))
}
