//! In-memory read cache.
//!
//! A bounded map from string key to a computed value, with write- and
//! access-based expiry and least-recently-used eviction. Every mutation of
//! the ledger clears the whole cache through [`TtlCache::invalidate_all`];
//! aggregate views are computed over the full record set, so one changed
//! record can stale every entry. Expiry is checked lazily on access — no
//! background task runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Eviction and expiry knobs. Defaults mirror the production configuration:
/// at most 1000 entries, entries dropped 30 minutes after write or 10
/// minutes after the last read, whichever comes first.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub max_entries: usize,
    pub expire_after_write: Duration,
    pub expire_after_access: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            expire_after_write: Duration::from_secs(30 * 60),
            expire_after_access: Duration::from_secs(10 * 60),
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_accessed: Instant,
}

impl<V> Entry<V> {
    fn expired(&self, now: Instant, policy: &CachePolicy) -> bool {
        now.duration_since(self.inserted_at) >= policy.expire_after_write
            || now.duration_since(self.last_accessed) >= policy.expire_after_access
    }
}

/// Bounded TTL/LRU cache. All state sits behind one mutex, so readers never
/// observe a half-applied invalidation; critical sections never await.
#[derive(Debug)]
pub struct TtlCache<V> {
    policy: CachePolicy,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value if present and unexpired, refreshing its
    /// access time. Expired entries are removed on the way out.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        let stale = match entries.get_mut(key) {
            Some(entry) if !entry.expired(now, &self.policy) => {
                entry.last_accessed = now;
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if stale {
            entries.remove(key);
        }
        None
    }

    /// Stores a value, evicting expired entries first and then the least
    /// recently accessed ones until the bound holds.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        entries.retain(|_, entry| !entry.expired(now, &self.policy));
        entries.insert(
            key.into(),
            Entry {
                value,
                inserted_at: now,
                last_accessed: now,
            },
        );

        while entries.len() > self.policy.max_entries {
            let lru = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());
            match lru {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }

    /// Clears every entry in one step. Concurrent readers see either the
    /// fully pre- or fully post-invalidation cache, never a mix.
    pub fn invalidate_all(&self) {
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .clear();
    }

    /// Number of resident entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
