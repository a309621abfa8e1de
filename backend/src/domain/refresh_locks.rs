//! Per-city single-flight locks for the refresh path.
//!
//! Concurrent lookups that all find a city stale would otherwise each call the
//! provider. The registry hands out one async mutex per city; holders of the
//! guard are the only task allowed to refresh that city. Entries live only
//! while some task holds or awaits them, so the map stays proportional to the
//! number of in-flight refreshes rather than to every city ever requested.
//!
//! A waiter cancelled between the holder's release and its own wake-up leaves
//! an entry nobody references. Such orphans are pruned on the next
//! [`RefreshLocks::acquire`] and never counted as live.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::CityName;

type LockMap = HashMap<CityName, Arc<AsyncMutex<()>>>;

/// Registry of per-city refresh locks.
#[derive(Debug, Default, Clone)]
pub struct RefreshLocks {
    entries: Arc<Mutex<LockMap>>,
}

impl RefreshLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other task is refreshing `city`, then claim it.
    pub async fn acquire(&self, city: &CityName) -> RefreshGuard {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.retain(|_, lock| is_referenced(lock));
            Arc::clone(entries.entry(city.clone()).or_default())
        };
        let guard = Arc::clone(&lock).lock_owned().await;
        RefreshGuard {
            entries: Arc::clone(&self.entries),
            city: city.clone(),
            lock,
            guard: Some(guard),
        }
    }

    /// Number of cities some task currently holds or awaits.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| is_referenced(lock))
            .count()
    }

    /// Whether no city currently has a lock entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// The map's own reference does not count as a user of the lock.
fn is_referenced(lock: &Arc<AsyncMutex<()>>) -> bool {
    Arc::strong_count(lock) > 1
}

/// Exclusive claim on refreshing one city.
///
/// Dropping the guard releases the claim and removes the registry entry when
/// no other task is waiting on it.
#[derive(Debug)]
pub struct RefreshGuard {
    entries: Arc<Mutex<LockMap>>,
    city: CityName,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&self.lock) == 2 {
            entries.remove(&self.city);
        }
    }
}
