//! Shared test doubles.

#![allow(dead_code)]

use maze_walking::{DbError, InMemoryMatchStore, Match, MatchId, MatchStore, NewMatch};

/// Text a failing store puts in its error; must never reach a client.
pub const INTERNAL_DETAIL: &str = "disk I/O error in /var/lib/maze/secret.db";

/// How [`BrokenUpdateStore::update_match`] misbehaves.
#[derive(Debug, Clone, Copy)]
pub enum UpdateFault {
    /// Reports that the version no longer matches.
    Stale,
    /// Fails with a storage error.
    Error,
}

/// In-memory store whose writes after creation never succeed.
pub struct BrokenUpdateStore {
    inner: InMemoryMatchStore,
    fault: UpdateFault,
}

impl BrokenUpdateStore {
    pub fn new(fault: UpdateFault) -> Self {
        Self {
            inner: InMemoryMatchStore::new(),
            fault,
        }
    }
}

impl MatchStore for BrokenUpdateStore {
    fn create_match(&self, new_match: NewMatch) -> Result<Match, DbError> {
        self.inner.create_match(new_match)
    }

    fn get_match_by_id(&self, id: &MatchId) -> Result<Option<Match>, DbError> {
        self.inner.get_match_by_id(id)
    }

    fn get_match_by_name(&self, player_name: &str) -> Result<Option<Match>, DbError> {
        self.inner.get_match_by_name(player_name)
    }

    fn update_match(&self, _updated: &Match) -> Result<Option<Match>, DbError> {
        match self.fault {
            UpdateFault::Stale => Ok(None),
            UpdateFault::Error => Err(DbError::new(INTERNAL_DETAIL)),
        }
    }

    fn list_all_matches(&self) -> Result<Vec<Match>, DbError> {
        self.inner.list_all_matches()
    }
}
