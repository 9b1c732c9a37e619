//! Keyed decision lock guarding pricing-decision submission
//!
//! Advisory mutual exclusion: at most one unexpired lock per
//! (game, user) key. The TTL exists only to recover from an abandoned
//! submission - an expired lock is reaped opportunistically by the next
//! acquire, never by a background task.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default lock lifetime
pub const DEFAULT_LOCK_TTL_SECS: i64 = 60;

/// Identity of a decision lock: one company's submission path in one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockKey {
    pub game_id: u32,
    pub user_id: u32,
}

/// Result of an acquire attempt. Denied is an expected, user-facing
/// "try again" outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquireOutcome {
    Granted,
    Denied,
}

impl AcquireOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AcquireOutcome::Granted)
    }
}

/// In-process store of decision locks
#[derive(Debug, Clone)]
pub struct DecisionLockStore {
    locks: HashMap<LockKey, DateTime<Utc>>,
    ttl: Duration,
}

impl DecisionLockStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_LOCK_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            locks: HashMap::new(),
            ttl,
        }
    }

    /// Acquire the lock for `key` at the current wall clock.
    pub fn acquire(&mut self, key: LockKey) -> AcquireOutcome {
        self.acquire_at(key, Utc::now())
    }

    /// Acquire the lock for `key` as observed at `now`.
    ///
    /// An unexpired holder denies the attempt; an expired holder is removed
    /// and replaced in the same step.
    pub fn acquire_at(&mut self, key: LockKey, now: DateTime<Utc>) -> AcquireOutcome {
        if let Some(&created_at) = self.locks.get(&key) {
            if created_at + self.ttl > now {
                log::debug!("decision lock denied for game {} user {}", key.game_id, key.user_id);
                return AcquireOutcome::Denied;
            }
            self.locks.remove(&key);
        }
        self.locks.insert(key, now);
        AcquireOutcome::Granted
    }

    /// Release the lock for `key`. Idempotent: releasing an absent or
    /// expired lock is a no-op.
    pub fn release(&mut self, key: &LockKey) {
        self.locks.remove(key);
    }

    /// Whether `key` is held by an unexpired lock at `now`.
    pub fn is_locked_at(&self, key: &LockKey, now: DateTime<Utc>) -> bool {
        self.locks
            .get(key)
            .map(|&created_at| created_at + self.ttl > now)
            .unwrap_or(false)
    }
}

impl Default for DecisionLockStore {
    fn default() -> Self {
        Self::new()
    }
}
