//! Cache Store Module
//!
//! Response cache: a HashMap of upstream payloads with a uniform TTL and lazy eviction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats};

// == Response Cache ==
/// Successful upstream responses keyed by normalized request.
///
/// There is no background sweep: a stale entry stays in the map until the
/// next lookup of its key removes it.
#[derive(Debug)]
pub struct ResponseCache {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Lookup statistics
    stats: CacheStats,
    /// Time-to-live in milliseconds
    ttl_ms: u64,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    // == Get ==
    /// Returns the payload stored under `key` if it is still live.
    ///
    /// A stale entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<Value>> {
        let fresh = match self.entries.get(key) {
            Some(entry) => entry.is_fresh(self.ttl_ms),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if fresh {
            self.stats.record_hit();
            self.entries.get(key).map(|entry| entry.data.clone())
        } else {
            self.entries.remove(key);
            self.stats.record_expiration();
            self.stats.record_miss();
            self.stats.set_total_entries(self.entries.len());
            None
        }
    }

    // == Insert ==
    /// Stores a payload under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: String, data: Arc<Value>) {
        self.entries.insert(key, CacheEntry::new(data));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Clear ==
    /// Removes every entry, live or stale. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    // == Length ==
    /// Number of stored entries, including stale ones not yet accessed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
