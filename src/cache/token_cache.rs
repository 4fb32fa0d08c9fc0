use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::cache::token::Expiring;

/// A cached token is handed out only while more than this many seconds remain.
pub const CACHE_SAFETY_MARGIN_SECS: i64 = 1;

/// Single-token cache slot.
///
/// The value is replaced wholesale on refresh, never mutated in place, so a
/// reader sees either the previous token or the new one. Each slot carries
/// its own lock; refreshing one slot never blocks or invalidates another.
#[derive(Debug)]
pub struct TokenCache<T> {
    slot: RwLock<Option<T>>,
    /// Held for the whole refresh when single-flight is enabled.
    refresh: Option<Mutex<()>>,
}

impl<T: Expiring + Clone> Default for TokenCache<T> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<T: Expiring + Clone> TokenCache<T> {
    pub fn new(single_flight: bool) -> Self {
        Self {
            slot: RwLock::new(None),
            refresh: single_flight.then(|| Mutex::new(())),
        }
    }

    /// Get the token if it is still usable at `now`.
    pub async fn get(&self, now: DateTime<Utc>) -> Option<T> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|token| is_fresh(*token, now))
            .cloned()
    }

    /// Replace whatever the slot holds.
    pub async fn set(&self, token: T) {
        *self.slot.write().await = Some(token);
    }

    /// Current value regardless of freshness.
    pub async fn peek(&self) -> Option<T> {
        self.slot.read().await.clone()
    }

    /// Serialize refreshes of this slot. `None` when single-flight is off,
    /// in which case concurrent misses each run their own exchange.
    pub async fn refresh_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.refresh {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    pub fn is_single_flight(&self) -> bool {
        self.refresh.is_some()
    }
}

pub fn is_fresh<T: Expiring>(token: &T, now: DateTime<Utc>) -> bool {
    token.time_to_expiry(now) > TimeDelta::seconds(CACHE_SAFETY_MARGIN_SECS)
}
