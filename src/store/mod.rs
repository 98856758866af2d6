//! Ephemeral key-value stores backing cache tokens.

mod memory;

pub use memory::MemoryStore;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::error::ConfigError;

/// Errors raised by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is unreachable or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Internal state was poisoned by a panicking writer
    #[error("Store state poisoned")]
    Poisoned,
}

/// A TTL-based key-value store.
///
/// Operations are synchronous; atomicity of each call is up to the backend.
pub trait Store: Send + Sync {
    /// Fetch a live entry.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or replace an entry that expires after `ttl`. A zero TTL
    /// expires immediately.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;

    /// Remove an entry, returning whether a live entry was removed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Fetch and remove an entry so that at most one caller gets it.
    ///
    /// The default is a get followed by a compare-and-delete: the value is
    /// only returned if this call's `delete` removed the entry, so two
    /// racing callers can't both succeed as long as `delete` is atomic.
    /// Backends with a native get-and-delete (Redis `GETDEL`) should
    /// override this.
    fn take(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(value) = self.get(key)? else {
            return Ok(None);
        };
        if self.delete(key)? {
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }
}

/// Named stores, selected by the cache name setting.
#[derive(Clone)]
pub struct Caches {
    by_name: HashMap<String, Arc<dyn Store>>,
}

impl Default for Caches {
    /// A registry with an in-memory `"default"` store.
    fn default() -> Self {
        let mut caches = Self::empty();
        caches.register("default", Arc::new(MemoryStore::new()));
        caches
    }
}

impl Caches {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry without any store.
    pub fn empty() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Register or replace a store.
    pub fn register(&mut self, name: impl Into<String>, store: Arc<dyn Store>) {
        self.by_name.insert(name.into(), store);
    }

    /// Look up a store by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Store>, ConfigError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownCache(name.to_string()))
    }
}

impl fmt::Debug for Caches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        names.sort();
        f.debug_struct("Caches").field("names", &names).finish()
    }
}
