//! Persistence collaborator used by the match service.
//!
//! The service never touches storage directly; it goes through [`MatchStore`].
//! [`GameRepository`](crate::GameRepository) backs it with SQLite and
//! [`InMemoryMatchStore`] keeps everything in process memory.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::DbError;
use crate::games::maze::{Match, MatchId, NewMatch, PlayerId};

/// Storage operations the match service depends on.
///
/// Implementations must be safe to call from blocking worker threads.
pub trait MatchStore: Send + Sync {
    /// Stores a new match, resolving or creating its player, and returns it
    /// with ids and timestamps assigned.
    fn create_match(&self, new_match: NewMatch) -> Result<Match, DbError>;

    /// Loads a match by id.
    fn get_match_by_id(&self, id: &MatchId) -> Result<Option<Match>, DbError>;

    /// Loads the most recent match of the player with this name.
    fn get_match_by_name(&self, player_name: &str) -> Result<Option<Match>, DbError>;

    /// Writes the mutable state of `updated` if the stored version still equals
    /// `updated.version()`. Returns the stored match with its version bumped, or
    /// `None` when the record is missing or was changed by someone else.
    fn update_match(&self, updated: &Match) -> Result<Option<Match>, DbError>;

    /// Lists every match, most recent first.
    fn list_all_matches(&self) -> Result<Vec<Match>, DbError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Player id keyed by name.
    players: HashMap<String, PlayerId>,
    /// Player name keyed by id.
    names: HashMap<PlayerId, String>,
    matches: HashMap<MatchId, Match>,
}

/// In-process [`MatchStore`]; contents are lost on shutdown.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMatchStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryMatchStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating in-memory match store");
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, DbError> {
        self.state
            .lock()
            .map_err(|_| DbError::new("In-memory store lock poisoned"))
    }

    /// Removes a match, as an expiry policy would. Returns true if it existed.
    #[instrument(skip(self))]
    pub fn remove_match(&self, id: &MatchId) -> Result<bool, DbError> {
        let removed = self.lock()?.matches.remove(id).is_some();
        debug!(removed, "Match removed");
        Ok(removed)
    }
}

impl MatchStore for InMemoryMatchStore {
    #[instrument(skip(self, new_match), fields(player = %new_match.player_name()))]
    fn create_match(&self, new_match: NewMatch) -> Result<Match, DbError> {
        let mut state = self.lock()?;
        let now = Utc::now();

        let known = new_match
            .player_id()
            .and_then(|id| state.names.get(&id).map(|name| (id, name.clone())));
        let (player_id, player_name) = match known {
            Some(found) => found,
            None => {
                let name = new_match.player_name().clone();
                let id = match state.players.get(&name) {
                    Some(id) => *id,
                    None => {
                        let id = Uuid::new_v4();
                        state.players.insert(name.clone(), id);
                        state.names.insert(id, name.clone());
                        debug!(player_id = %id, "Player created");
                        id
                    }
                };
                (id, name)
            }
        };

        let stored = new_match.into_match(Uuid::new_v4(), player_id, player_name, now);
        state.matches.insert(*stored.match_id(), stored.clone());
        info!(match_id = %stored.match_id(), player_id = %player_id, "Match created");
        Ok(stored)
    }

    #[instrument(skip(self))]
    fn get_match_by_id(&self, id: &MatchId) -> Result<Option<Match>, DbError> {
        let found = self.lock()?.matches.get(id).cloned();
        if found.is_none() {
            debug!("Match not found");
        }
        Ok(found)
    }

    #[instrument(skip(self))]
    fn get_match_by_name(&self, player_name: &str) -> Result<Option<Match>, DbError> {
        let state = self.lock()?;
        let Some(player_id) = state.players.get(player_name) else {
            return Ok(None);
        };
        Ok(state
            .matches
            .values()
            .filter(|m| m.player_id() == player_id)
            .max_by_key(|m| *m.created_at())
            .cloned())
    }

    #[instrument(skip(self, updated), fields(match_id = %updated.match_id(), version = updated.version()))]
    fn update_match(&self, updated: &Match) -> Result<Option<Match>, DbError> {
        let mut state = self.lock()?;
        let Some(slot) = state.matches.get_mut(updated.match_id()) else {
            warn!("Match vanished before update");
            return Ok(None);
        };
        if slot.version() != updated.version() {
            warn!(stored = slot.version(), "Stale match version");
            return Ok(None);
        }
        let mut next = updated.clone();
        next.touch(Utc::now());
        *slot = next.clone();
        debug!(version = next.version(), "Match updated");
        Ok(Some(next))
    }

    #[instrument(skip(self))]
    fn list_all_matches(&self) -> Result<Vec<Match>, DbError> {
        let mut all: Vec<Match> = self.lock()?.matches.values().cloned().collect();
        all.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        info!(count = all.len(), "Listed matches");
        Ok(all)
    }
}
