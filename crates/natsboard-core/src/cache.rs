// ── TTL cache for per-account stream listings ──
//
// Keyed by (cluster, account) rather than node identity so entries
// survive node replacement. Expiry is lazy: entries are only inspected
// on access, and growth is bounded by the number of accounts an operator
// touches in a session.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Cached listings stay fresh for five minutes -- a balance between
/// staleness and hammering the introspection endpoint.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache key derived from resource identifiers, never node identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub cluster_id: String,
    pub account_id: String,
}

impl CacheKey {
    pub fn new(cluster_id: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            account_id: account_id.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    stream_names: Vec<String>,
    fetched_at: Instant,
}

/// TTL-bounded store of previously fetched stream-name listings.
///
/// Entries are replaced wholesale on `put` -- never partially updated.
#[derive(Debug)]
pub struct StreamListCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl Default for StreamListCache {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamListCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Override the TTL (tests use short windows).
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up an entry. The boolean is `true` iff the entry is still
    /// within the TTL; stale values are returned rather than dropped so
    /// callers can choose to show them while refetching.
    pub fn get(&self, key: &CacheKey) -> Option<(Vec<String>, bool)> {
        self.entries.get(key).map(|entry| {
            let fresh = entry.fetched_at.elapsed() < self.ttl;
            (entry.stream_names.clone(), fresh)
        })
    }

    /// Unconditional overwrite with the current timestamp.
    pub fn put(&self, key: CacheKey, stream_names: Vec<String>) {
        self.entries.insert(
            key,
            CacheEntry {
                stream_names,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Explicit eviction, used by manual refresh.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CacheKey {
        CacheKey::new("cl-1", "ac-1")
    }

    #[test]
    fn missing_key_is_absent() {
        let cache = StreamListCache::new();
        assert!(cache.get(&key()).is_none());
    }

    #[test]
    fn fresh_entry_reports_fresh() {
        let cache = StreamListCache::new();
        cache.put(key(), vec!["orders".into()]);

        let (names, fresh) = cache.get(&key()).expect("entry present");
        assert_eq!(names, vec!["orders"]);
        assert!(fresh);
    }

    #[test]
    fn entry_older_than_ttl_reports_stale() {
        let cache = StreamListCache::with_ttl(Duration::ZERO);
        cache.put(key(), vec!["orders".into()]);

        let (_, fresh) = cache.get(&key()).expect("entry present");
        assert!(!fresh);
    }

    #[test]
    fn put_replaces_wholesale() {
        let cache = StreamListCache::new();
        cache.put(key(), vec!["orders".into(), "events".into()]);
        cache.put(key(), vec!["events".into()]);

        let (names, _) = cache.get(&key()).expect("entry present");
        assert_eq!(names, vec!["events"]);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = StreamListCache::new();
        cache.put(key(), vec!["orders".into()]);
        cache.invalidate(&key());
        assert!(cache.get(&key()).is_none());
    }

    #[test]
    fn keys_distinguish_clusters() {
        let cache = StreamListCache::new();
        cache.put(CacheKey::new("cl-1", "ac-1"), vec!["a".into()]);
        assert!(cache.get(&CacheKey::new("cl-2", "ac-1")).is_none());
    }
}
