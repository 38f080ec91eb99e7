//! TTL cache for rephrased instruction text.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// In-memory cache with per-entry expiry.
///
/// Owned by whichever component needs it and passed along explicitly; there
/// is deliberately no global instance.
pub struct RephraseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

struct CacheEntry {
    stored_at: Instant,
    value: String,
}

impl RephraseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a live entry. Expired entries are evicted on the way out.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: &str, value: String) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(
            key.to_string(),
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}
