//! SQLite repository for players and matches.

use chrono::{NaiveDateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::{DbError, MatchRecord, MatchUpdate, NewMatchRecord, NewPlayer, Player, schema};
use crate::games::maze::{Match, MatchId, NewMatch, PlayerId};
use crate::store::MatchStore;

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for player and match operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// Each operation opens its own connection, so use a file path rather than
    /// `":memory:"`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Opens the repository and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        repo.run_migrations()?;
        Ok(repo)
    }

    /// Applies pending migrations, returning how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(applied.len())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))?;
        conn.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            BUSY_TIMEOUT_MS
        ))?;
        Ok(conn)
    }

    /// Gets a player by name. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_player_by_name(&self, name: &str) -> Result<Option<Player>, DbError> {
        let mut conn = self.connection()?;
        let player = schema::players::table
            .filter(schema::players::name.eq(name))
            .select(Player::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(player)
    }

    /// Finds the player a new match belongs to, creating it when needed.
    ///
    /// A known `player_id` wins; otherwise the player is looked up by name and
    /// created if missing.
    #[instrument(skip(conn, now))]
    fn resolve_player(
        conn: &mut SqliteConnection,
        player_id: Option<PlayerId>,
        name: &str,
        now: NaiveDateTime,
    ) -> Result<Player, DbError> {
        if let Some(id) = player_id {
            let existing = schema::players::table
                .find(id.to_string())
                .select(Player::as_select())
                .first(conn)
                .optional()?;
            match existing {
                Some(player) => {
                    debug!(player_id = %id, "Attaching match to existing player");
                    return Ok(player);
                }
                None => warn!(player_id = %id, "Unknown player id, resolving by name"),
            }
        }

        let by_name = schema::players::table
            .filter(schema::players::name.eq(name))
            .select(Player::as_select())
            .first(conn)
            .optional()?;
        if let Some(player) = by_name {
            debug!(player_id = %player.id(), "Existing player found by name");
            return Ok(player);
        }

        let new_player = NewPlayer::new(Uuid::new_v4().to_string(), name.to_string(), now, now);
        let player = diesel::insert_into(schema::players::table)
            .values(&new_player)
            .returning(Player::as_returning())
            .get_result(conn)?;
        info!(player_id = %player.id(), name = %player.name(), "Player created");
        Ok(player)
    }
}

impl MatchStore for GameRepository {
    #[instrument(skip(self, new_match), fields(player = %new_match.player_name()))]
    fn create_match(&self, new_match: NewMatch) -> Result<Match, DbError> {
        let mut conn = self.connection()?;
        let now = Utc::now();

        let created = conn.immediate_transaction(|conn| {
            let player = Self::resolve_player(
                conn,
                *new_match.player_id(),
                new_match.player_name(),
                now.naive_utc(),
            )?;
            let player_id = Uuid::parse_str(player.id())
                .map_err(|e| DbError::new(format!("Invalid stored player id: {}", e)))?;
            let created = new_match.into_match(Uuid::new_v4(), player_id, player.name().clone(), now);
            let record = NewMatchRecord::from_domain(&created)?;
            diesel::insert_into(schema::matches::table)
                .values(&record)
                .execute(conn)?;
            Ok::<_, DbError>(created)
        })?;

        info!(match_id = %created.match_id(), player_id = %created.player_id(), "Match created");
        Ok(created)
    }

    #[instrument(skip(self))]
    fn get_match_by_id(&self, id: &MatchId) -> Result<Option<Match>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::matches::table
            .inner_join(schema::players::table)
            .filter(schema::matches::id.eq(id.to_string()))
            .select((MatchRecord::as_select(), Player::as_select()))
            .first::<(MatchRecord, Player)>(&mut conn)
            .optional()?;

        match row {
            Some((record, player)) => Ok(Some(record.into_domain(&player)?)),
            None => {
                debug!("Match not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    fn get_match_by_name(&self, player_name: &str) -> Result<Option<Match>, DbError> {
        let mut conn = self.connection()?;
        let row = schema::matches::table
            .inner_join(schema::players::table)
            .filter(schema::players::name.eq(player_name))
            .order(schema::matches::created_at.desc())
            .select((MatchRecord::as_select(), Player::as_select()))
            .first::<(MatchRecord, Player)>(&mut conn)
            .optional()?;

        row.map(|(record, player)| record.into_domain(&player))
            .transpose()
    }

    #[instrument(skip(self, updated), fields(match_id = %updated.match_id(), version = updated.version()))]
    fn update_match(&self, updated: &Match) -> Result<Option<Match>, DbError> {
        let mut conn = self.connection()?;
        let mut next = updated.clone();
        next.touch(Utc::now());
        let changes = MatchUpdate::from_domain(&next);

        let rows = conn.immediate_transaction(|conn| {
            diesel::update(
                schema::matches::table
                    .filter(schema::matches::id.eq(updated.match_id().to_string()))
                    .filter(schema::matches::version.eq(*updated.version())),
            )
            .set(&changes)
            .execute(conn)
        })?;

        if rows == 0 {
            warn!("Update matched no row (missing or stale version)");
            return Ok(None);
        }
        debug!(version = next.version(), "Match updated");
        Ok(Some(next))
    }

    #[instrument(skip(self))]
    fn list_all_matches(&self) -> Result<Vec<Match>, DbError> {
        let mut conn = self.connection()?;
        let rows = schema::matches::table
            .inner_join(schema::players::table)
            .order(schema::matches::created_at.desc())
            .select((MatchRecord::as_select(), Player::as_select()))
            .load::<(MatchRecord, Player)>(&mut conn)?;

        let matches = rows
            .into_iter()
            .map(|(record, player)| record.into_domain(&player))
            .collect::<Result<Vec<_>, _>>()?;
        info!(count = matches.len(), "Matches loaded");
        Ok(matches)
    }
}
