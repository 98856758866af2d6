//! In-memory store with per-entry TTL.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{Store, StoreError};

/// Map size at which `set` first sweeps expired entries.
const SWEEP_THRESHOLD: usize = 1024;

/// Stored value with its deadline.
#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, Entry>,
    /// Size at which the next insert sweeps expired entries.
    sweep_at: usize,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: SWEEP_THRESHOLD,
        }
    }
}

impl Inner {
    /// Drop every expired entry and move the next sweep point to twice the
    /// surviving size, keeping inserts amortized constant time.
    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        self.sweep_at = SWEEP_THRESHOLD.max(self.entries.len() * 2);
        before - self.entries.len()
    }
}

/// Thread-safe in-process store.
///
/// Expired entries are dropped when touched, swept by `set` whenever the map
/// has grown past its sweep point, or purged in bulk by
/// [`MemoryStore::purge_expired`]. Keys that are issued and never redeemed
/// therefore don't accumulate. `take` runs under a single lock and is
/// atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize, StoreError> {
        let removed = self.lock()?.sweep(Instant::now());
        if removed > 0 {
            log::debug!("Purged {} expired entries", removed);
        }
        Ok(removed)
    }

    /// Number of entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let mut inner = self.lock()?;
        match inner.entries.get(key) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.value.clone())),
            Some(_) => {
                inner.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        let now = Instant::now();
        // Saturate absurd TTLs instead of overflowing the clock
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 3600));

        let mut inner = self.lock()?;
        if inner.entries.len() >= inner.sweep_at {
            let removed = inner.sweep(now);
            log::debug!("Swept {} expired entries on insert", removed);
        }
        inner
            .entries
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let removed = self.lock()?.entries.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    fn take(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let now = Instant::now();
        let removed = self.lock()?.entries.remove(key);
        Ok(removed
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn test_set_get() {
        let store = MemoryStore::new();
        store.set("k", b"value".to_vec(), MINUTE).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"value".to_vec()));
        // get doesn't consume
        assert_eq!(store.get("k").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn test_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(!store.delete("nope").unwrap());
        assert_eq!(store.take("nope").unwrap(), None);
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let store = MemoryStore::new();
        store.set("k", b"value".to_vec(), Duration::ZERO).unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_short_ttl_expires() {
        let store = MemoryStore::new();
        store.set("k", b"value".to_vec(), Duration::from_millis(20)).unwrap();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(store.take("k").unwrap(), None);
    }

    #[test]
    fn test_take_removes() {
        let store = MemoryStore::new();
        store.set("k", b"value".to_vec(), MINUTE).unwrap();
        assert_eq!(store.take("k").unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.take("k").unwrap(), None);
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_delete_reports_live_entries_only() {
        let store = MemoryStore::new();
        store.set("live", b"1".to_vec(), MINUTE).unwrap();
        store.set("dead", b"2".to_vec(), Duration::ZERO).unwrap();
        assert!(store.delete("live").unwrap());
        assert!(!store.delete("dead").unwrap());
    }

    #[test]
    fn test_set_replaces() {
        let store = MemoryStore::new();
        store.set("k", b"old".to_vec(), MINUTE).unwrap();
        store.set("k", b"new".to_vec(), MINUTE).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(b"new".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let store = MemoryStore::new();
        store.set("live", b"1".to_vec(), MINUTE).unwrap();
        store.set("dead1", b"2".to_vec(), Duration::ZERO).unwrap();
        store.set("dead2", b"3".to_vec(), Duration::ZERO).unwrap();

        assert_eq!(store.purge_expired().unwrap(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_huge_ttl_does_not_panic() {
        let store = MemoryStore::new();
        store.set("k", b"v".to_vec(), Duration::MAX).unwrap();
        assert!(store.get("k").unwrap().is_some());
    }

    #[test]
    fn test_unredeemed_expired_entries_are_swept_on_insert() {
        let store = MemoryStore::new();
        for i in 0..10_000 {
            store
                .set(&format!("k{}", i), b"v".to_vec(), Duration::ZERO)
                .unwrap();
        }
        assert!(store.len() <= SWEEP_THRESHOLD, "len = {}", store.len());
    }

    #[test]
    fn test_sweep_on_insert_keeps_live_entries() {
        let store = MemoryStore::new();
        for i in 0..SWEEP_THRESHOLD {
            store.set(&format!("live{}", i), b"1".to_vec(), MINUTE).unwrap();
        }
        for i in 0..3 * SWEEP_THRESHOLD {
            store.set(&format!("dead{}", i), b"2".to_vec(), Duration::ZERO).unwrap();
        }

        assert!(store.len() < 3 * SWEEP_THRESHOLD);
        for i in 0..SWEEP_THRESHOLD {
            assert!(store.get(&format!("live{}", i)).unwrap().is_some());
        }
    }
}
