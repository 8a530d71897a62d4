//! Per-match serialization for concurrent moves.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, instrument};

use crate::games::maze::MatchId;

/// Hands out one async lock per match id.
///
/// Holding the guard for the whole load-validate-persist sequence linearizes
/// moves against the same match. Moves on different matches never wait on
/// each other. Idle entries are pruned on the next acquire.
#[derive(Debug, Clone, Default)]
pub struct MatchLocks {
    locks: Arc<Mutex<HashMap<MatchId, Arc<AsyncMutex<()>>>>>,
}

impl MatchLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to a match.
    ///
    /// The returned guard is owned, so it can travel into a blocking task and
    /// outlive a cancelled request.
    #[instrument(skip(self))]
    pub async fn acquire(&self, id: MatchId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id).or_default())
        };
        let guard = lock.lock_owned().await;
        debug!("Match lock acquired");
        guard
    }

    /// Number of matches currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn same_match_waits() {
        let locks = MatchLocks::new();
        let id = Uuid::new_v4();
        let first = locks.acquire(id).await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(id)).await;
        assert!(second.is_err(), "second acquire should block while first is held");

        drop(first);
        let third = tokio::time::timeout(Duration::from_millis(500), locks.acquire(id)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_matches_do_not_wait() {
        let locks = MatchLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn idle_locks_are_pruned() {
        let locks = MatchLocks::new();
        for _ in 0..5 {
            let guard = locks.acquire(Uuid::new_v4()).await;
            drop(guard);
        }
        let _held = locks.acquire(Uuid::new_v4()).await;
        assert_eq!(locks.tracked(), 1);
    }
}
