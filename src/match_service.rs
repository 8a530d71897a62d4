//! Match orchestration: persistence, locking and error mapping around the engine.

use chrono::Utc;
use derive_getters::Getters;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::GameError;
use crate::games::maze::{Match, MatchEngine, MatchId, Position, RandomSource, SystemRandom};
use crate::locks::MatchLocks;
use crate::store::MatchStore;

/// Produces a fresh random source for each generated maze.
pub type RandomFactory = Arc<dyn Fn() -> Box<dyn RandomSource> + Send + Sync>;

/// An accepted move as seen by the caller.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct MoveReport {
    updated: Match,
    message: String,
}

/// A move that was not applied.
///
/// `current` is present when the request resolved to a match (validation
/// rejections and finished matches) and absent otherwise.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct MoveFailure {
    error: GameError,
    current: Option<Match>,
}

impl MoveFailure {
    fn rejected(error: GameError, current: Match) -> Self {
        Self {
            error,
            current: Some(current),
        }
    }

    fn unresolved(error: impl Into<GameError>) -> Self {
        Self {
            error: error.into(),
            current: None,
        }
    }
}

/// Service layer for match operations.
///
/// Wraps a [`MatchStore`] with the engine, per-match locking and blocking-task
/// dispatch. Cloning is cheap and clones share locks and store.
#[derive(Clone)]
pub struct MatchService {
    store: Arc<dyn MatchStore>,
    engine: MatchEngine,
    locks: MatchLocks,
    random: RandomFactory,
}

impl MatchService {
    /// Creates a service using OS-seeded randomness.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn MatchStore>, engine: MatchEngine) -> Self {
        info!("Creating MatchService");
        Self {
            store,
            engine,
            locks: MatchLocks::new(),
            random: Arc::new(|| Box::new(SystemRandom::new()) as Box<dyn RandomSource>),
        }
    }

    /// Replaces the random source factory (seeded mazes in tests).
    pub fn with_random(mut self, random: RandomFactory) -> Self {
        self.random = random;
        self
    }

    /// Returns the engine.
    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Starts a new match for a player.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayerName`], [`GameError::InvalidDimension`],
    /// [`GameError::InvalidIdFormat`] for a malformed `player_id`, or
    /// [`GameError::PersistenceFailure`].
    #[instrument(skip(self))]
    pub async fn init_match(
        &self,
        player_name: String,
        rows_columns: i64,
        player_id: Option<String>,
    ) -> Result<Match, GameError> {
        let player_id = player_id
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_id)
            .transpose()?;

        let mut rng = (self.random)();
        let new_match =
            self.engine
                .prepare_match(&player_name, player_id, rows_columns, rng.as_mut())?;

        let store = Arc::clone(&self.store);
        let created = tokio::task::spawn_blocking(move || store.create_match(new_match))
            .await?
            .map_err(|e| log_internal(e.into()))?;

        info!(
            match_id = %created.match_id(),
            player_id = %created.player_id(),
            size = created.grid().size(),
            "Match initialized"
        );
        Ok(created)
    }

    /// Applies one step to a match.
    ///
    /// The per-match lock guard is moved into the blocking task, so the stored
    /// record is either untouched or fully updated even if the caller goes
    /// away mid-move.
    ///
    /// # Errors
    ///
    /// Returns a [`MoveFailure`]; see its docs for when it carries the match.
    #[instrument(skip(self))]
    pub async fn make_move(&self, match_id: &str, target: Position) -> Result<MoveReport, MoveFailure> {
        let id = parse_id(match_id).map_err(MoveFailure::unresolved)?;

        let guard = self.locks.acquire(id).await;
        let store = Arc::clone(&self.store);
        let engine = self.engine;
        let result = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            apply_locked(store.as_ref(), &engine, id, target)
        })
        .await
        .unwrap_or_else(|join| Err(MoveFailure::unresolved(join)));

        match &result {
            Ok(report) => debug!(message = %report.message, "Move applied"),
            Err(failure) if failure.error.is_rejection() => {
                debug!(kind = %failure.error.kind(), "Move rejected")
            }
            Err(failure) => {
                log_internal(failure.error.clone());
            }
        }
        result
    }

    /// Loads a match by id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidIdFormat`], [`GameError::NotFound`] or
    /// [`GameError::PersistenceFailure`].
    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: &str) -> Result<Match, GameError> {
        let id = parse_id(match_id)?;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.get_match_by_id(&id))
            .await?
            .map_err(|e| log_internal(e.into()))?
            .ok_or_else(|| GameError::NotFound(id.to_string()))
    }

    /// Loads the most recent match of a player, by name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::NotFound`] or [`GameError::PersistenceFailure`].
    #[instrument(skip(self))]
    pub async fn latest_match_for(&self, player_name: &str) -> Result<Match, GameError> {
        let name = player_name.trim().to_string();
        let store = Arc::clone(&self.store);
        let lookup = name.clone();
        tokio::task::spawn_blocking(move || store.get_match_by_name(&lookup))
            .await?
            .map_err(|e| log_internal(e.into()))?
            .ok_or(GameError::NotFound(name))
    }

    /// Lists every match, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::PersistenceFailure`].
    #[instrument(skip(self))]
    pub async fn list_matches(&self) -> Result<Vec<Match>, GameError> {
        let store = Arc::clone(&self.store);
        let matches = tokio::task::spawn_blocking(move || store.list_all_matches())
            .await?
            .map_err(|e| log_internal(e.into()))?;
        debug!(count = matches.len(), "Listed matches");
        Ok(matches)
    }
}

/// Load, validate and persist while holding the match lock.
fn apply_locked(
    store: &dyn MatchStore,
    engine: &MatchEngine,
    id: MatchId,
    target: Position,
) -> Result<MoveReport, MoveFailure> {
    let current = store
        .get_match_by_id(&id)
        .map_err(MoveFailure::unresolved)?
        .ok_or_else(|| MoveFailure::unresolved(GameError::NotFound(id.to_string())))?;

    let applied = match engine.apply_move(&current, target, Utc::now()) {
        Ok(applied) => applied,
        Err(err) => return Err(MoveFailure::rejected(err, current)),
    };
    let message = applied.message();

    let stored = store
        .update_match(applied.updated())
        .map_err(MoveFailure::unresolved)?
        .ok_or_else(|| {
            warn!(match_id = %id, "Match changed or removed during move");
            MoveFailure::unresolved(GameError::PersistenceFailure(format!(
                "Match {} was changed or removed during the move",
                id
            )))
        })?;

    Ok(MoveReport {
        updated: stored,
        message,
    })
}

/// Parses a client-supplied identifier.
fn parse_id(raw: &str) -> Result<Uuid, GameError> {
    Uuid::parse_str(raw.trim()).map_err(|_| GameError::InvalidIdFormat(raw.to_string()))
}

/// Logs internal failures with full context and passes the error through.
fn log_internal(err: GameError) -> GameError {
    if !err.is_rejection() {
        error!(kind = %err.kind(), error = %err, "Match operation failed");
    }
    err
}
